use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("PDF has no readable text (probably scanned image PDF)")]
    EmptyDocument,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No documents indexed yet. Please upload PDFs first.")]
    NoDocumentsIndexed,

    #[error("Index and metadata are out of sync: {0}")]
    IndexOutOfSync(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("Text extraction error: {0}")]
    Extraction(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl RagError {
    /// Whether the failure was caused by the caller's input rather than the service
    #[inline]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyDocument | Self::InvalidInput(_))
    }
}

pub mod answer;
pub mod commands;
pub mod config;
pub mod documents;
pub mod embeddings;
pub mod http;
pub mod indexer;
pub mod llm;
pub mod pipeline;
pub mod retrieval;
pub mod server;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod test_support;
