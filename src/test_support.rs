//! Deterministic stand-ins for the external collaborators

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::documents::TextExtractor;
use crate::embeddings::Embedder;
use crate::llm::LanguageModel;
use crate::{RagError, Result};

pub const TEST_DIMENSION: usize = 64;

/// Bag-of-words embedder: each lowercase word increments one hashed bucket
#[derive(Debug, Default)]
pub struct HashEmbedder {
    pub calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; TEST_DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(2166136261u32, |hash, b| (hash ^ u32::from(b)).wrapping_mul(16777619));
            vector[bucket as usize % TEST_DIMENSION] += 1.0;
        }
        vector
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }
}

/// Embedder that always fails
#[derive(Debug, Default)]
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(RagError::Embedding("embedding service unavailable".to_string()))
    }
}

/// Model that answers with the prompt it received
#[derive(Debug, Default)]
pub struct EchoModel {
    pub prompts: Mutex<Vec<String>>,
}

impl EchoModel {
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().ok()?.last().cloned()
    }
}

impl LanguageModel for EchoModel {
    fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(prompt.to_string())
    }
}

/// Treats uploaded bytes as UTF-8 text; rejects invalid UTF-8
#[derive(Debug, Default)]
pub struct Utf8Extractor;

impl TextExtractor for Utf8Extractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| RagError::Extraction(format!("not text: {}", e)))
    }
}
