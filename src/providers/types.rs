// Request type shared by all vendor clients

use crate::config::constants::{DEFAULT_MAX_TOKENS, GENERATION_TEMPERATURE};

/// One single-shot completion request.
///
/// The pipeline works in prompt-in, text-out terms; conversation history,
/// tool calls, and streaming are vendor features this application does not
/// use.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Vendor model identifier; empty means the provider's default model.
    pub model: String,
    pub system: Option<String>,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, system: Option<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system,
            user: user.into(),
            temperature: GENERATION_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}
