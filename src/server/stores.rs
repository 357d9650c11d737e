// Collaborator seams for per-user data
//
// Credentials and style configuration live in an external store owned by
// the surrounding application; the pipeline only ever reads them. These
// traits keep that boundary narrow and let tests substitute fixtures.

use async_trait::async_trait;

use crate::providers::UserCredentials;
use crate::style::StyleConfiguration;

/// Source of decrypted per-user vendor API keys.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Keys for a user; any or all may be absent, in which case the
    /// process-wide fallback keys apply.
    async fn credentials_for(&self, user_id: Option<&str>) -> UserCredentials;
}

/// Source of per-user statement style configuration.
#[async_trait]
pub trait StyleStore: Send + Sync {
    /// Style for a user; absent fields fall back to built-in defaults at
    /// prompt-assembly time.
    async fn style_for(&self, user_id: Option<&str>) -> StyleConfiguration;
}

/// Store used when no external user store is wired in: every user gets
/// empty credentials (process-wide fallback keys carry the load) and
/// default style.
#[derive(Debug, Clone, Default)]
pub struct DefaultStores;

#[async_trait]
impl CredentialStore for DefaultStores {
    async fn credentials_for(&self, _user_id: Option<&str>) -> UserCredentials {
        UserCredentials::default()
    }
}

#[async_trait]
impl StyleStore for DefaultStores {
    async fn style_for(&self, _user_id: Option<&str>) -> StyleConfiguration {
        StyleConfiguration::default()
    }
}
