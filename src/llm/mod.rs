// Language model module
// Completion backends that turn a composed prompt into an answer

pub mod gemini;

pub use gemini::GeminiClient;

use crate::Result;

/// A hosted text-completion model
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` and return the model's raw text response
    fn generate(&self, prompt: &str) -> Result<String>;
}
