use async_trait::async_trait;

use crate::error::AuthResult;

pub mod discord;

pub use discord::DiscordClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Discord,
}

/// Provider access token; only ever handed back to the same provider.
#[derive(Clone)]
pub struct AccessToken(pub String);

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Profile data obtained from the provider. Lives only for one login attempt.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub provider: Provider,
    pub id: String,
    pub email: Option<String>,
    /// Provider has confirmed the owner controls `email`.
    pub email_verified: bool,
    pub username: Option<String>,
}

/// Code-for-token exchange and profile fetch against one OAuth provider.
///
/// Implementations report failures as `AuthError::Exchange` and
/// `AuthError::ProfileFetch` respectively.
#[async_trait]
pub trait OAuthExchangeClient: Send + Sync {
    async fn exchange_code(&self, code: &str) -> AuthResult<AccessToken>;
    async fn fetch_profile(&self, token: &AccessToken) -> AuthResult<ExternalIdentity>;
}
