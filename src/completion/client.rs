/// Chat-completion HTTP client implementation.
///
/// This module provides `CompletionClient` for making synchronous requests to
/// an OpenAI-compatible `/chat/completions` endpoint, along with error types
/// and a builder for configuration.
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API root when `OPENAI_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model when `OPENAI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Token budget for a single completion.
pub const DEFAULT_MAX_TOKENS: u32 = 200;

/// Errors that can occur when calling the completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Service-specific errors, such as a response without any choices
    #[error("Completion API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl CompletionError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// Builder for constructing `CompletionClient` instances.
///
/// # Examples
///
/// ```
/// use carenav::completion::CompletionClientBuilder;
///
/// let client = CompletionClientBuilder::new()
///     .base_url("http://localhost:11434/v1")
///     .model("llama3.1:8b")
///     .build()
///     .expect("Failed to create client");
/// ```
#[derive(Debug, Default)]
pub struct CompletionClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
}

impl CompletionClientBuilder {
    /// Creates a new `CompletionClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root (e.g., "https://api.openai.com/v1").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the bearer token sent with each request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the default model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the per-completion token budget.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `CompletionClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// Values not set on the builder fall back to `OPENAI_BASE_URL`,
    /// `OPENAI_API_KEY` and `OPENAI_MODEL`, then to the crate defaults.
    /// Builder values always take precedence over the environment.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::InvalidUrl` if the base URL doesn't parse.
    pub fn build(self) -> Result<CompletionClient, CompletionError> {
        let base_url = self
            .base_url
            .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        let api_key = self
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty());

        let model = self
            .model
            .or_else(|| std::env::var("OPENAI_MODEL").ok())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        reqwest::Url::parse(&base_url)
            .map_err(|e| CompletionError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(60)))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(CompletionError::Network)?;

        Ok(CompletionClient {
            client,
            base_url,
            api_key,
            model,
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

/// Synchronous client for an OpenAI-compatible chat completion API.
///
/// Each call is stateless: one system message, one user message, no
/// conversation history. Construct it with `CompletionClientBuilder`.
pub struct CompletionClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

/// Trait for completion service operations.
///
/// This trait enables mocking in unit tests and keeps the translator
/// independent of the HTTP transport.
pub trait CompletionClientTrait: Send + Sync {
    /// Requests a single completion.
    ///
    /// # Arguments
    ///
    /// * `model` - The model to use (e.g., "gpt-4o-mini")
    /// * `system` - The fixed system instruction
    /// * `user` - The user's message
    fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the default model configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns true if an API key was configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn complete_internal(
        &self,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: 0.0,
        };

        retry_with_backoff(|| {
            let mut request = self.client.post(&url).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = request.send().map_err(CompletionError::from_reqwest)?;

            let status = response.status();
            if !status.is_success() {
                return Err(CompletionError::Http {
                    status: status.as_u16(),
                });
            }

            let text = response.text().map_err(CompletionError::from_reqwest)?;
            parse_chat_response(&text)
        })
    }
}

impl CompletionClientTrait for CompletionClient {
    fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, CompletionError> {
        self.complete_internal(model, system, user)
    }
}

/// Extracts the first choice's message content from a chat response body.
fn parse_chat_response(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(CompletionError::Serialization)?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| CompletionError::Api {
            message: "Missing message content in completion response".to_string(),
        })
}

const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// Retries an operation with exponential backoff (1s, 2s, 4s).
///
/// Only network failures and HTTP 5xx are retried. Timeouts, client errors
/// (HTTP 4xx) and malformed responses return immediately.
pub fn retry_with_backoff<F, T>(f: F) -> Result<T, CompletionError>
where
    F: FnMut() -> Result<T, CompletionError>,
{
    retry_with_delays(&RETRY_DELAYS, f)
}

fn retry_with_delays<F, T>(delays: &[Duration], mut f: F) -> Result<T, CompletionError>
where
    F: FnMut() -> Result<T, CompletionError>,
{
    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) if !should_retry(&e) => return Err(e),
        Err(e) => e,
    };

    for delay in delays {
        tracing::warn!(error = %last_error, ?delay, "Completion request failed, retrying");
        thread::sleep(*delay);

        match f() {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}

/// Determines if an error should be retried.
fn should_retry(error: &CompletionError) -> bool {
    match error {
        CompletionError::Network(_) => true,
        CompletionError::Timeout(_) => false,
        CompletionError::Http { status } => (500..600).contains(status),
        CompletionError::Serialization(_) => false,
        CompletionError::Api { .. } => false,
        CompletionError::InvalidUrl(_) => false,
    }
}
