// Error taxonomy shared by the resolver, vendor clients, and HTTP layer

use thiserror::Error;

/// No usable credential for the requested vendor.
///
/// Carries the vendor name and a remediation hint so the UI can render
/// actionable guidance instead of a bare failure.
#[derive(Debug, Clone, Error)]
#[error("No API key configured for {vendor}. {hint}")]
pub struct CredentialError {
    pub vendor: String,
    pub hint: String,
}

impl CredentialError {
    pub fn for_vendor(vendor: &str, env_var: &str) -> Self {
        Self {
            vendor: vendor.to_string(),
            hint: format!(
                "Add a {vendor} key in Settings, or set {env_var} for a process-wide default."
            ),
        }
    }
}

/// Failure surfaced from an LLM vendor call.
///
/// Sub-kinds let callers distinguish a stalled request from a quota problem
/// without string matching. No retry happens at this layer; the caller
/// decides whether a failed call is worth repeating.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{vendor} request exceeded the {budget_secs}s time budget")]
    Timeout { vendor: String, budget_secs: u64 },

    #[error("{vendor} rate limit hit: {message}")]
    RateLimited { vendor: String, message: String },

    #[error("{vendor} rejected the API key: {message}")]
    Auth { vendor: String, message: String },

    #[error("{vendor} request failed with status {status}: {message}")]
    Http {
        vendor: String,
        status: u16,
        message: String,
    },

    #[error("Could not reach {vendor}: {source}")]
    Network {
        vendor: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{vendor} returned a response with no usable text")]
    EmptyResponse { vendor: String },
}

impl ProviderError {
    /// Classify a non-success HTTP status into the right sub-kind.
    pub fn from_status(vendor: &str, status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth {
                vendor: vendor.to_string(),
                message: body,
            },
            429 => Self::RateLimited {
                vendor: vendor.to_string(),
                message: body,
            },
            _ => Self::Http {
                vendor: vendor.to_string(),
                status,
                message: body,
            },
        }
    }

    pub fn from_reqwest(vendor: &str, budget_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                vendor: vendor.to_string(),
                budget_secs,
            }
        } else {
            Self::Network {
                vendor: vendor.to_string(),
                source: err,
            }
        }
    }
}

/// Failure of a whole pipeline call, where no meaningful partial result
/// exists (credential resolution, single-statement conversion, the LLM
/// tier of a surgical edit).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
