// Model-id → vendor resolution
//
// Maps a model identifier to a configured vendor client. Pure selection:
// no network I/O happens until the returned client is invoked.

use super::anthropic::AnthropicProvider;
use super::gemini::GeminiProvider;
use super::openai::OpenAiProvider;
use super::LlmProvider;
use crate::config::VendorKeys;
use crate::errors::CredentialError;

/// The LLM vendors the application can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Anthropic,
    OpenAi,
    Google,
    Xai,
}

impl Vendor {
    pub fn display_name(self) -> &'static str {
        match self {
            Vendor::Anthropic => "Anthropic",
            Vendor::OpenAi => "OpenAI",
            Vendor::Google => "Google",
            Vendor::Xai => "xAI",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Vendor::Anthropic => "ANTHROPIC_API_KEY",
            Vendor::OpenAi => "OPENAI_API_KEY",
            Vendor::Google => "GEMINI_API_KEY",
            Vendor::Xai => "XAI_API_KEY",
        }
    }

    /// Model used when an unrecognized identifier is rerouted to this
    /// vendor: the cheap, fast tier.
    fn fallback_model(self) -> &'static str {
        match self {
            Vendor::Google => "gemini-2.0-flash",
            Vendor::Anthropic => "claude-3-5-haiku-20241022",
            Vendor::OpenAi => "gpt-4o-mini",
            Vendor::Xai => "grok-3-mini",
        }
    }

    fn build(self, api_key: String) -> Box<dyn LlmProvider> {
        match self {
            Vendor::Anthropic => Box::new(AnthropicProvider::new(api_key)),
            Vendor::OpenAi => Box::new(OpenAiProvider::new_openai(api_key)),
            Vendor::Google => Box::new(GeminiProvider::new(api_key)),
            Vendor::Xai => Box::new(OpenAiProvider::new_grok(api_key)),
        }
    }
}

/// Decrypted per-user API keys from the credential store; any may be absent.
#[derive(Debug, Clone, Default)]
pub struct UserCredentials {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
    pub google: Option<String>,
    pub xai: Option<String>,
}

impl UserCredentials {
    fn key_for(&self, vendor: Vendor) -> Option<&str> {
        match vendor {
            Vendor::Anthropic => self.anthropic.as_deref(),
            Vendor::OpenAi => self.openai.as_deref(),
            Vendor::Google => self.google.as_deref(),
            Vendor::Xai => self.xai.as_deref(),
        }
    }
}

fn fallback_key_for(keys: &VendorKeys, vendor: Vendor) -> Option<&str> {
    match vendor {
        Vendor::Anthropic => keys.anthropic.as_deref(),
        Vendor::OpenAi => keys.openai.as_deref(),
        Vendor::Google => keys.google.as_deref(),
        Vendor::Xai => keys.xai.as_deref(),
    }
}

/// One entry in the capability table: a model-id predicate plus the vendor
/// it routes to. Evaluated in order; the unrecognized-model fallback chain
/// is the explicit last step of `resolve`.
struct VendorRule {
    matches: fn(&str) -> bool,
    vendor: Vendor,
}

const VENDOR_TABLE: [VendorRule; 4] = [
    VendorRule {
        matches: |id| id.contains("claude"),
        vendor: Vendor::Anthropic,
    },
    VendorRule {
        matches: |id| id.contains("gemini"),
        vendor: Vendor::Google,
    },
    VendorRule {
        matches: |id| id.contains("grok"),
        vendor: Vendor::Xai,
    },
    VendorRule {
        matches: |id| id.contains("gpt") || id.starts_with("o1") || id.starts_with("o3"),
        vendor: Vendor::OpenAi,
    },
];

/// Priority order for rerouting unrecognized-but-plausible model ids:
/// cheapest flash/mini tier first.
const FALLBACK_ORDER: [Vendor; 4] = [
    Vendor::Google,
    Vendor::Anthropic,
    Vendor::OpenAi,
    Vendor::Xai,
];

/// A resolved client plus the model identifier to send it.
///
/// Normally the model is the requested identifier verbatim; when an
/// unrecognized id was rerouted through the fallback chain, it is the
/// chosen vendor's fallback-tier model instead.
pub struct Resolution {
    pub provider: Box<dyn LlmProvider>,
    pub model: String,
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Resolve a model identifier to a vendor client.
///
/// Credential precedence: the user's own key for the matched vendor, else
/// the process-wide fallback key. A recognized vendor with no usable key is
/// a `CredentialError` naming the vendor and where to configure a key,
/// never a silent switch to a different vendor.
pub fn resolve(
    model_id: &str,
    user: &UserCredentials,
    fallback: &VendorKeys,
) -> Result<Resolution, CredentialError> {
    let id = model_id.trim().to_ascii_lowercase();

    if let Some(rule) = VENDOR_TABLE.iter().find(|rule| (rule.matches)(&id)) {
        let vendor = rule.vendor;
        let key = user
            .key_for(vendor)
            .or_else(|| fallback_key_for(fallback, vendor))
            .ok_or_else(|| CredentialError::for_vendor(vendor.display_name(), vendor.env_var()))?;

        return Ok(Resolution {
            provider: vendor.build(key.to_string()),
            model: model_id.trim().to_string(),
        });
    }

    // Unrecognized-but-plausible identifier: degrade gracefully by trying
    // each vendor's key in priority order at that vendor's fallback tier.
    for vendor in FALLBACK_ORDER {
        if let Some(key) = user
            .key_for(vendor)
            .or_else(|| fallback_key_for(fallback, vendor))
        {
            tracing::warn!(
                model = model_id,
                vendor = vendor.display_name(),
                "Unrecognized model identifier, rerouting to fallback tier"
            );
            return Ok(Resolution {
                provider: vendor.build(key.to_string()),
                model: vendor.fallback_model().to_string(),
            });
        }
    }

    Err(CredentialError {
        vendor: "any vendor".to_string(),
        hint: format!(
            "Model \"{model_id}\" matches no known vendor and no fallback key is \
             configured. Add an API key in Settings or set one of \
             ANTHROPIC_API_KEY, OPENAI_API_KEY, GEMINI_API_KEY, XAI_API_KEY."
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(vendor: Vendor, key: &str) -> UserCredentials {
        let mut user = UserCredentials::default();
        match vendor {
            Vendor::Anthropic => user.anthropic = Some(key.to_string()),
            Vendor::OpenAi => user.openai = Some(key.to_string()),
            Vendor::Google => user.google = Some(key.to_string()),
            Vendor::Xai => user.xai = Some(key.to_string()),
        }
        user
    }

    #[test]
    fn test_claude_routes_to_anthropic() {
        let resolution = resolve(
            "claude-sonnet-4-20250514",
            &user_with(Vendor::Anthropic, "k"),
            &VendorKeys::default(),
        )
        .unwrap();
        assert_eq!(resolution.provider.name(), "anthropic");
        assert_eq!(resolution.model, "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_gemini_routes_to_google() {
        let resolution = resolve(
            "gemini-2.0-flash",
            &user_with(Vendor::Google, "k"),
            &VendorKeys::default(),
        )
        .unwrap();
        assert_eq!(resolution.provider.name(), "gemini");
    }

    #[test]
    fn test_grok_routes_to_xai() {
        let resolution = resolve(
            "grok-3",
            &user_with(Vendor::Xai, "k"),
            &VendorKeys::default(),
        )
        .unwrap();
        assert_eq!(resolution.provider.name(), "grok");
    }

    #[test]
    fn test_gpt_routes_to_openai() {
        let resolution = resolve(
            "gpt-4o",
            &user_with(Vendor::OpenAi, "k"),
            &VendorKeys::default(),
        )
        .unwrap();
        assert_eq!(resolution.provider.name(), "openai");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let resolution = resolve(
            "Claude-Sonnet-4",
            &user_with(Vendor::Anthropic, "k"),
            &VendorKeys::default(),
        );
        assert!(resolution.is_ok());
    }

    #[test]
    fn test_missing_key_names_vendor_and_remedy() {
        let err = resolve(
            "claude-sonnet-4",
            &UserCredentials::default(),
            &VendorKeys::default(),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Anthropic"));
        assert!(msg.contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_user_key_beats_fallback_key() {
        // Both keys exist; resolution must succeed either way, and a user
        // with only their own key must not depend on the fallback.
        let resolution = resolve(
            "claude-x",
            &user_with(Vendor::Anthropic, "user-key"),
            &VendorKeys::default(),
        );
        assert!(resolution.is_ok());
    }

    #[test]
    fn test_fallback_key_used_when_user_has_none() {
        let keys = VendorKeys {
            anthropic: Some("proc-key".to_string()),
            ..Default::default()
        };
        let resolution = resolve("claude-x", &UserCredentials::default(), &keys).unwrap();
        assert_eq!(resolution.provider.name(), "anthropic");
    }

    #[test]
    fn test_recognized_vendor_without_key_does_not_switch_vendor() {
        // A claude id with only an OpenAI key available must fail, not
        // silently reroute.
        let err = resolve(
            "claude-x",
            &user_with(Vendor::OpenAi, "k"),
            &VendorKeys::default(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_unrecognized_model_reroutes_by_priority() {
        let keys = VendorKeys {
            google: Some("g".to_string()),
            openai: Some("o".to_string()),
            ..Default::default()
        };
        let resolution = resolve("llama-3-70b", &UserCredentials::default(), &keys).unwrap();
        // Google's flash tier comes first in the priority order.
        assert_eq!(resolution.provider.name(), "gemini");
        assert_eq!(resolution.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_unrecognized_model_skips_keyless_vendors() {
        let keys = VendorKeys {
            xai: Some("x".to_string()),
            ..Default::default()
        };
        let resolution = resolve("llama-3-70b", &UserCredentials::default(), &keys).unwrap();
        assert_eq!(resolution.provider.name(), "grok");
        assert_eq!(resolution.model, "grok-3-mini");
    }

    #[test]
    fn test_unrecognized_model_without_any_key_fails() {
        let err = resolve(
            "llama-3-70b",
            &UserCredentials::default(),
            &VendorKeys::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("llama-3-70b"));
    }
}
