/// Chat-completion HTTP client module.
///
/// This module provides a blocking client for OpenAI-compatible chat
/// completion endpoints, including error handling, retry logic, and timeout
/// configuration.
mod client;

pub use client::{
    CompletionClient, CompletionClientBuilder, CompletionClientTrait, CompletionError,
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, retry_with_backoff,
};
