//! Generative text service abstraction.
//!
//! Every pipeline stage that talks to a language model goes through the
//! [`TextGenerator`] trait. [`GeminiClient`] is the production
//! implementation; tests substitute mocks.

use async_trait::async_trait;

pub mod gemini;

pub use gemini::GeminiClient;

/// A single text generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Full prompt text
    pub prompt: String,

    /// Sampling temperature, always set explicitly
    pub temperature: f32,

    /// Requested response MIME type (e.g. `text/plain`)
    pub response_mime_type: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            response_mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.response_mime_type = Some(mime.into());
        self
    }
}

/// Errors that can occur when calling the generative text service
#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    /// Missing credential or unusable client settings.
    #[error("service not configured: {0}")]
    NotConfigured(String),

    /// HTTP 401/403.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// HTTP 429.
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The prompt was refused by the service's safety filters.
    #[error("prompt blocked: {0}")]
    Blocked(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A service that turns a prompt into generated text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `request`. An empty string is a valid response.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;
}
