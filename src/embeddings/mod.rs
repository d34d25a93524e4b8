// Embeddings module
// Fixed-size chunking and the Ollama embedding client

pub mod chunking;
pub mod ollama;

pub use chunking::{ChunkingConfig, Chunker, Chunks, ContentChunk, chunk_content};
pub use ollama::OllamaClient;

use crate::{RagError, Result};

/// Turns text into fixed-dimension vectors.
///
/// Indexing and querying must go through the same embedder so their vectors
/// are comparable.
pub trait Embedder: Send + Sync {
    /// Embed every input, returning one vector per text in input order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    #[inline]
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .pop()
            .ok_or_else(|| RagError::Embedding("Embedder returned no vector".to_string()))
    }
}
