// Answer module
// Grounded prompt composition and the question-answering flow


use std::sync::Arc;

use tracing::{debug, info};

use crate::llm::LanguageModel;
use crate::retrieval::{RetrievedChunk, Retriever};
use crate::{RagError, Result};

const PROMPT_PREAMBLE: &str = "You are an AI Incident Intelligence assistant.

Use ONLY the following context to answer.
If the answer is not in the context, say you don't know.";

/// Build the grounded prompt sent to the language model
#[inline]
pub fn build_prompt<S: AsRef<str>>(context: &[S], question: &str) -> String {
    let context = context
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{PROMPT_PREAMBLE}\n\nContext:\n{context}\n\nQuestion:\n{question}\n")
}

/// A model answer with the context it was given
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub context: Vec<RetrievedChunk>,
}

pub struct AnswerOrchestrator {
    retriever: Retriever,
    model: Arc<dyn LanguageModel>,
    top_k: usize,
}

impl AnswerOrchestrator {
    #[inline]
    pub fn new(retriever: Retriever, model: Arc<dyn LanguageModel>, top_k: usize) -> Self {
        Self {
            retriever,
            model,
            top_k,
        }
    }

    #[inline]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer `question` from the indexed document with the configured `top_k`
    #[inline]
    pub fn answer(&self, question: &str) -> Result<Answer> {
        self.answer_with_top_k(question, self.top_k)
    }

    /// Answer `question` using the `top_k` nearest chunks as context.
    ///
    /// A blank question is rejected before the index is consulted.
    #[inline]
    pub fn answer_with_top_k(&self, question: &str, top_k: usize) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidInput("Missing question".to_string()));
        }

        let context = self.retriever.retrieve(question, top_k)?;
        let texts: Vec<&str> = context.iter().map(|chunk| chunk.text.as_str()).collect();
        let prompt = build_prompt(&texts, question);
        debug!(
            "Sending prompt with {} context chunks ({} chars)",
            context.len(),
            prompt.len()
        );

        let answer = self.model.generate(&prompt)?;
        info!("Answered question using {} chunks", context.len());

        Ok(Answer {
            question: question.to_string(),
            answer,
            context,
        })
    }
}
