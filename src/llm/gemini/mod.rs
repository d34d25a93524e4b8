
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::RagError;
use crate::config::GeminiConfig;
use crate::http::{RetryPolicy, build_agent, request_with_retry};
use crate::llm::LanguageModel;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` REST endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    endpoint: Url,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    agent: ureq::Agent,
    retry: RetryPolicy,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Create a client. A missing key is accepted here and reported when
    /// `generate` is called.
    #[inline]
    pub fn new(config: &GeminiConfig, api_key: Option<String>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid Gemini base URL: {}", config.base_url))?;
        let endpoint = base_url
            .join(&format!("/v1beta/models/{}:generateContent", config.model))
            .context("Failed to build Gemini endpoint URL")?;

        if api_key.is_none() {
            warn!(
                "${} is not set; language model requests will fail",
                config.api_key_env
            );
        }

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            agent: build_agent(Duration::from_secs(config.timeout_seconds)),
            retry: RetryPolicy::default(),
        })
    }

    /// Create a client reading the API key from the configured variable
    #[inline]
    pub fn from_env(config: &GeminiConfig) -> Result<Self> {
        Self::new(config, config.api_key_from_env())
    }

    #[inline]
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a completion for `prompt`
    #[inline]
    pub fn generate_content(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("API key not configured: set ${}", self.api_key_env))?;

        let request = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize Gemini request")?;

        debug!(
            "Sending prompt ({} characters) to Gemini model {}",
            prompt.chars().count(),
            self.model
        );

        let response_text = request_with_retry(self.retry, self.endpoint.as_str(), || {
            self.agent
                .post(self.endpoint.as_str())
                .header("Content-Type", "application/json")
                .header(API_KEY_HEADER, api_key)
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .context("Gemini request failed")?;

        let response: GenerateResponse =
            serde_json::from_str(&response_text).context("Failed to parse Gemini response")?;

        extract_text(response)
    }
}

fn extract_text(response: GenerateResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(anyhow!("Gemini returned no answer: {}", reason));
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "empty response".to_string());
        return Err(anyhow!("Gemini returned no text: {}", reason));
    }

    Ok(text)
}

impl LanguageModel for GeminiClient {
    #[inline]
    fn generate(&self, prompt: &str) -> crate::Result<String> {
        self.generate_content(prompt)
            .map_err(|e| RagError::LanguageModel(format!("{:#}", e)))
    }
}
