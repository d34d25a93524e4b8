
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Characters per chunk unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Represents a chunk of document text ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    /// The chunk text, untrimmed
    pub content: String,
    /// Position of this chunk within the document
    pub chunk_index: usize,
    /// Length of the chunk in characters
    pub char_count: usize,
}

/// Configuration for content chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunk length in characters; the final chunk may be shorter
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Splits text into fixed-length, non-overlapping character windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
}

impl Chunker {
    /// Create a chunker producing windows of `chunk_size` characters.
    ///
    /// A zero size is clamped to one so the sequence always terminates.
    #[inline]
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    #[inline]
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size)
    }

    #[inline]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Lazily iterate over the chunks of `text`, left to right.
    ///
    /// Each call starts a fresh sequence. Chunks borrow from `text` and
    /// concatenate back to it exactly.
    #[inline]
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            rest: text,
            chunk_size: self.chunk_size,
        }
    }
}

impl Default for Chunker {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

/// Iterator returned by [`Chunker::chunks`]
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    chunk_size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let split_at = self
            .rest
            .char_indices()
            .nth(self.chunk_size)
            .map_or(self.rest.len(), |(offset, _)| offset);

        let (head, tail) = self.rest.split_at(split_at);
        self.rest = tail;
        Some(head)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.rest.is_empty() {
            return (0, Some(0));
        }
        // Every char is at most 4 bytes and at least 1
        let max_chars = self.rest.len();
        let min_chars = self.rest.len().div_ceil(4);
        (
            min_chars.div_ceil(self.chunk_size),
            Some(max_chars.div_ceil(self.chunk_size)),
        )
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}

/// Chunk document text into owned, indexed pieces
#[inline]
pub fn chunk_content(text: &str, config: &ChunkingConfig) -> Vec<ContentChunk> {
    let chunks: Vec<ContentChunk> = Chunker::from_config(config)
        .chunks(text)
        .enumerate()
        .map(|(chunk_index, content)| ContentChunk {
            content: content.to_string(),
            chunk_index,
            char_count: content.chars().count(),
        })
        .collect();

    debug!(
        "Chunked {} characters into {} chunks of up to {} characters",
        text.chars().count(),
        chunks.len(),
        config.chunk_size
    );

    chunks
}
