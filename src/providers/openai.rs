// OpenAI chat-completions client
//
// This client covers both OpenAI (GPT models) and xAI's Grok, which uses a
// compatible API format.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::types::CompletionRequest;
use super::{build_client, LlmProvider};
use crate::config::constants::REQUEST_TIMEOUT_SECS;
use crate::errors::ProviderError;

#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    vendor: String,
}

impl OpenAiProvider {
    pub fn new_openai(api_key: String) -> Self {
        Self::new(
            api_key,
            "https://api.openai.com".to_string(),
            "gpt-4o".to_string(),
            "OpenAI".to_string(),
        )
    }

    /// Grok uses the OpenAI chat-completions format on xAI's endpoint.
    pub fn new_grok(api_key: String) -> Self {
        Self::new(
            api_key,
            "https://api.x.ai".to_string(),
            "grok-3".to_string(),
            "xAI".to_string(),
        )
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Point the client at a custom endpoint (tests use a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn new(api_key: String, base_url: String, default_model: String, vendor: String) -> Self {
        Self {
            client: build_client(),
            api_key,
            base_url,
            default_model,
            vendor,
        }
    }

    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAiRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(OpenAiMessage {
            role: "user".to_string(),
            content: request.user.clone(),
        });

        OpenAiRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = self.to_openai_request(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!(vendor = %self.vendor, model = %body.model, "Sending chat-completions request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&self.vendor, REQUEST_TIMEOUT_SECS, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(
                &self.vendor,
                status.as_u16(),
                error_body,
            ));
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(&self.vendor, REQUEST_TIMEOUT_SECS, e))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::EmptyResponse {
                vendor: self.vendor.clone(),
            })?;

        tracing::debug!(chars = text.len(), "Received chat-completions response");
        Ok(text)
    }

    fn name(&self) -> &str {
        if self.vendor == "xAI" {
            "grok"
        } else {
            "openai"
        }
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// OpenAI API types

#[derive(Debug, Clone, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}
