// Anthropic Messages API client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::types::CompletionRequest;
use super::{build_client, LlmProvider};
use crate::config::constants::REQUEST_TIMEOUT_SECS;
use crate::errors::ProviderError;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, ANTHROPIC_API_URL.to_string())
    }

    /// Create with a custom endpoint (tests point this at a mock server).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: build_client(),
            api_key,
            base_url,
            default_model: "claude-sonnet-4-20250514".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn to_anthropic_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        AnthropicRequest {
            model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.user.clone(),
            }],
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = self.to_anthropic_request(request);

        tracing::debug!(model = %body.model, "Sending request to Anthropic API");

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest("Anthropic", REQUEST_TIMEOUT_SECS, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(
                "Anthropic",
                status.as_u16(),
                error_body,
            ));
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest("Anthropic", REQUEST_TIMEOUT_SECS, e))?;

        let text: String = parsed
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse {
                vendor: "Anthropic".to_string(),
            });
        }

        tracing::debug!(chars = text.len(), "Received Anthropic response");
        Ok(text)
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// Anthropic API types

#[derive(Debug, Clone, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Clone, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    block_type: String,
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name_and_default_model() {
        let provider = AnthropicProvider::new("test-key".to_string());
        assert_eq!(provider.name(), "anthropic");
        assert!(provider.default_model().contains("claude"));
    }

    #[test]
    fn test_empty_request_model_uses_default() {
        let provider =
            AnthropicProvider::new("test-key".to_string()).with_model("claude-opus-4-20250514");
        let req = CompletionRequest::new("", None, "hi");
        let body = provider.to_anthropic_request(&req);
        assert_eq!(body.model, "claude-opus-4-20250514");
    }

    #[tokio::test]
    async fn test_auth_failure_maps_to_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(401)
            .with_body("invalid x-api-key")
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url("bad-key".to_string(), server.url());
        let err = provider
            .complete(&CompletionRequest::new("claude-test", None, "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Auth { .. }));
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content": [{"type": "text", "text": "- Led the team."}]}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url("key".to_string(), server.url());
        let text = provider
            .complete(&CompletionRequest::new("claude-test", None, "hi"))
            .await
            .unwrap();
        assert_eq!(text, "- Led the team.");
    }
}
