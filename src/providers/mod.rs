// Multi-vendor LLM support
//
// This module provides an abstraction layer over the LLM vendors the
// application can dispatch to (Anthropic, OpenAI, Google, xAI), with a
// unified single-shot completion interface.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::constants::REQUEST_TIMEOUT_SECS;
use crate::errors::ProviderError;

pub mod types;

// Vendor client implementations
pub mod anthropic;
pub mod gemini;
pub mod openai;

// Model-id → vendor resolution
pub mod factory;

pub use factory::{resolve, Resolution, UserCredentials, Vendor};
pub use types::CompletionRequest;

/// Trait for LLM vendor clients
///
/// All vendor clients implement this trait, providing a unified interface
/// for single-shot prompt-in, text-out completion.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one completion request and return the response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Vendor client name (e.g., "anthropic", "openai", "gemini")
    fn name(&self) -> &str;

    /// Default model used when the request does not name one
    fn default_model(&self) -> &str;
}

/// Build the reqwest client shared by all vendor implementations.
///
/// The 60s timeout is the per-request wall-clock budget: generation runs
/// inside synchronous HTTP handlers and a stalled vendor call must fail,
/// not hang.
pub(crate) fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}
