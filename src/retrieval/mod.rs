// Retrieval module
// Exact nearest-neighbor lookup of chunk texts for a question


use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::embeddings::Embedder;
use crate::vector_store::IndexStore;

/// A chunk returned for a query, nearest first
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    /// Position of the chunk in its document
    pub position: usize,
    /// Squared L2 distance to the query embedding
    pub distance: f32,
    pub text: String,
}

pub struct Retriever {
    store: Arc<IndexStore>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    #[inline]
    pub fn new(store: Arc<IndexStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Return up to `k` chunks closest to `question`.
    ///
    /// Fails with [`crate::RagError::NoDocumentsIndexed`] before anything is
    /// embedded when no index has been built.
    #[inline]
    pub fn retrieve(&self, question: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let loaded = self.store.load()?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed_one(question)?;
        let neighbors = loaded.index.search(&query, k)?;

        let results: Vec<RetrievedChunk> = neighbors
            .into_iter()
            .filter_map(|neighbor| {
                loaded.chunk(neighbor.position).map(|text| RetrievedChunk {
                    position: neighbor.position,
                    distance: neighbor.distance,
                    text: text.to_string(),
                })
            })
            .collect();

        debug!(
            "Retrieved {} of {} requested chunks from build {}",
            results.len(),
            k,
            loaded.metadata.build_id
        );
        Ok(results)
    }
}
