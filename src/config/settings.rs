// Configuration structs

use serde::{Deserialize, Serialize};

use super::constants;

/// Process-wide fallback API keys, one per vendor.
///
/// These back the per-user keys from the credential store: a user without a
/// key for the matched vendor falls back to the key configured here (or the
/// corresponding environment variable).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xai: Option<String>,
}

impl VendorKeys {
    /// Overlay environment variables onto any keys missing from the file.
    pub fn with_env_fallbacks(mut self) -> Self {
        let from_env = |var: &str| {
            std::env::var(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        self.anthropic = self.anthropic.or_else(|| from_env("ANTHROPIC_API_KEY"));
        self.openai = self.openai.or_else(|| from_env("OPENAI_API_KEY"));
        self.google = self.google.or_else(|| from_env("GEMINI_API_KEY"));
        self.xai = self.xai.or_else(|| from_env("XAI_API_KEY"));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.anthropic.is_none()
            && self.openai.is_none()
            && self.google.is_none()
            && self.xai.is_none()
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8300")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    constants::DEFAULT_HTTP_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model identifier used when a request does not name one.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Process-wide fallback vendor keys.
    #[serde(default)]
    pub vendors: VendorKeys,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            vendors: VendorKeys::default(),
            server: ServerConfig::default(),
        }
    }
}
