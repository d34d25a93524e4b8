// Pipeline module
// Wires extraction, storage, indexing and answering into the upload and ask flows


use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::answer::{Answer, AnswerOrchestrator};
use crate::config::Config;
use crate::documents::{DocumentStore, PdfTextExtractor, TextExtractor, sanitize_filename};
use crate::embeddings::chunking::Chunker;
use crate::embeddings::{Embedder, OllamaClient};
use crate::indexer::Indexer;
use crate::llm::{GeminiClient, LanguageModel};
use crate::retrieval::Retriever;
use crate::vector_store::IndexStore;
use crate::{RagError, Result};

/// External services the pipeline delegates to
pub struct Collaborators {
    pub extractor: Arc<dyn TextExtractor>,
    pub embedder: Arc<dyn Embedder>,
    pub model: Arc<dyn LanguageModel>,
}

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub filename: String,
    pub chunks: usize,
    pub build_id: String,
}

/// Description of the currently indexed document
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStatus {
    pub build_id: String,
    pub filename: Option<String>,
    pub chunks: usize,
    pub dimension: usize,
    pub created_at: DateTime<Utc>,
}

pub struct RagPipeline {
    extractor: Arc<dyn TextExtractor>,
    documents: DocumentStore,
    store: Arc<IndexStore>,
    indexer: Indexer,
    orchestrator: AnswerOrchestrator,
}

impl RagPipeline {
    #[inline]
    pub fn new(
        documents: DocumentStore,
        store: Arc<IndexStore>,
        chunker: Chunker,
        top_k: usize,
        collaborators: Collaborators,
    ) -> Self {
        let Collaborators {
            extractor,
            embedder,
            model,
        } = collaborators;

        let indexer = Indexer::new(Arc::clone(&store), Arc::clone(&embedder), chunker);
        let retriever = Retriever::new(Arc::clone(&store), embedder);
        let orchestrator = AnswerOrchestrator::new(retriever, model, top_k);

        Self {
            extractor,
            documents,
            store,
            indexer,
            orchestrator,
        }
    }

    /// Build the production pipeline: PDF extraction, Ollama embeddings and
    /// Gemini answers, with storage under the configured base directory.
    ///
    /// The Gemini API key is read from the environment here, once.
    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = OllamaClient::new(&config.ollama)?;
        let model = GeminiClient::from_env(&config.gemini)?;
        if !model.has_api_key() {
            warn!("Questions will fail until ${} is set", config.gemini.api_key_env);
        }

        let pipeline = Self::new(
            DocumentStore::new(config.pdf_dir_path()),
            Arc::new(IndexStore::new(config.vector_store_path())),
            Chunker::from_config(&config.chunking),
            config.retrieval.top_k,
            Collaborators {
                extractor: Arc::new(PdfTextExtractor),
                embedder: Arc::new(embedder),
                model: Arc::new(model),
            },
        );
        pipeline.init()?;
        Ok(pipeline)
    }

    /// Ensure the storage directories exist
    #[inline]
    pub fn init(&self) -> Result<()> {
        self.documents.init()?;
        self.store.init()
    }

    #[inline]
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    #[inline]
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Store an uploaded PDF and replace the index with its chunks.
    ///
    /// The previous index survives any failure, including a document with no
    /// extractable text.
    #[inline]
    pub fn upload(&self, filename: &str, bytes: &[u8]) -> Result<UploadOutcome> {
        let filename = sanitize_filename(filename)?.to_string();
        self.documents.save(&filename, bytes)?;

        let text = self.extractor.extract_text(bytes)?;
        if text.trim().is_empty() {
            warn!("{} has no extractable text", filename);
            return Err(RagError::EmptyDocument);
        }

        let summary = self.indexer.index_document(Some(&filename), &text)?;
        info!("Upload {} indexed into {} chunks", filename, summary.chunks);

        Ok(UploadOutcome {
            filename,
            chunks: summary.chunks,
            build_id: summary.build_id,
        })
    }

    /// Answer `question` from the indexed document
    #[inline]
    pub fn ask(&self, question: &str) -> Result<Answer> {
        self.orchestrator.answer(question)
    }

    #[inline]
    pub fn ask_with_top_k(&self, question: &str, top_k: usize) -> Result<Answer> {
        self.orchestrator.answer_with_top_k(question, top_k)
    }

    /// Describe the indexed document, or `None` before the first upload
    #[inline]
    pub fn status(&self) -> Result<Option<IndexStatus>> {
        match self.store.load() {
            Ok(loaded) => Ok(Some(IndexStatus {
                build_id: loaded.metadata.build_id,
                filename: loaded.metadata.filename,
                chunks: loaded.metadata.chunks.len(),
                dimension: loaded.metadata.dimension,
                created_at: loaded.metadata.created_at,
            })),
            Err(RagError::NoDocumentsIndexed) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
