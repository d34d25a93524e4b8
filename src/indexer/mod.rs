// Indexer module
// Turns extracted document text into a freshly built, persisted index

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::{debug, info};

use crate::embeddings::Embedder;
use crate::embeddings::chunking::Chunker;
use crate::vector_store::{IndexStore, IndexSummary};
use crate::{RagError, Result};

/// Chunks, embeds and indexes a document, replacing whatever was indexed before
pub struct Indexer {
    store: Arc<IndexStore>,
    embedder: Arc<dyn Embedder>,
    chunker: Chunker,
}

impl Indexer {
    #[inline]
    pub fn new(store: Arc<IndexStore>, embedder: Arc<dyn Embedder>, chunker: Chunker) -> Self {
        Self {
            store,
            embedder,
            chunker,
        }
    }

    /// Index `text` as the only document in the store.
    ///
    /// Blank text is rejected before anything is embedded or written.
    #[inline]
    pub fn index_document(&self, filename: Option<&str>, text: &str) -> Result<IndexSummary> {
        if text.trim().is_empty() {
            return Err(RagError::EmptyDocument);
        }

        let chunks: Vec<String> = self.chunker.chunks(text).map(str::to_string).collect();
        debug!(
            "Split {} into {} chunks of up to {} characters",
            filename.unwrap_or("document"),
            chunks.len(),
            self.chunker.chunk_size()
        );

        self.index_chunks(filename, chunks)
    }

    /// Embed `chunks` in order and persist them as the new index
    #[inline]
    pub fn index_chunks(&self, filename: Option<&str>, chunks: Vec<String>) -> Result<IndexSummary> {
        let vectors = self.embedder.embed(&chunks)?;

        if vectors.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "Expected {} embeddings, received {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let summary = self.store.build(filename, chunks, vectors)?;
        info!(
            "Indexed {} as {} chunks (build {})",
            filename.unwrap_or("document"),
            summary.chunks,
            summary.build_id
        );
        Ok(summary)
    }
}
