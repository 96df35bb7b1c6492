use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthType, AuthUrl, AuthorizationCode,
    ClientId, ClientSecret, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{AccessToken, ExternalIdentity, OAuthExchangeClient, Provider};
use crate::config::{DiscordConfig, DISCORD_AUTH_URL};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: Option<String>,
    global_name: Option<String>,
    email: Option<String>,
    verified: Option<bool>,
}

impl From<DiscordUser> for ExternalIdentity {
    fn from(u: DiscordUser) -> Self {
        Self {
            provider: Provider::Discord,
            id: u.id,
            email: u.email,
            email_verified: u.verified.unwrap_or(false),
            username: u.global_name.or(u.username),
        }
    }
}

/// Discord OAuth2: the code exchange goes through `oauth2`, the profile call
/// through a plain `reqwest` client.
#[derive(Clone)]
pub struct DiscordClient {
    oauth: BasicClient,
    http: reqwest::Client,
    profile_url: String,
    timeout: Duration,
}

impl DiscordClient {
    pub fn new(config: DiscordConfig) -> anyhow::Result<Self> {
        let mut oauth = BasicClient::new(
            ClientId::new(config.client_id),
            Some(ClientSecret::new(config.client_secret)),
            AuthUrl::new(DISCORD_AUTH_URL.to_string()).context("discord auth url")?,
            Some(TokenUrl::new(config.token_url).context("DISCORD_TOKEN_URL")?),
        )
        // Discord expects the client credentials in the form body
        .set_auth_type(AuthType::RequestBody);
        if !config.redirect_uri.is_empty() {
            oauth = oauth.set_redirect_uri(
                RedirectUrl::new(config.redirect_uri).context("DISCORD_REDIRECT_URI")?,
            );
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build discord http client")?;

        Ok(Self {
            oauth,
            http,
            profile_url: config.profile_url,
            timeout,
        })
    }
}

#[async_trait]
impl OAuthExchangeClient for DiscordClient {
    async fn exchange_code(&self, code: &str) -> AuthResult<AccessToken> {
        let exchange = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client);

        let token = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| AuthError::Exchange("token endpoint timed out".into()))?
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(body) => {
                    warn!(error = ?body.error(), "discord token endpoint refused code");
                    AuthError::Exchange(format!("token endpoint refused code: {}", body.error()))
                }
                other => AuthError::Exchange(other.to_string()),
            })?;

        debug!("discord code exchanged");
        Ok(AccessToken(token.access_token().secret().clone()))
    }

    async fn fetch_profile(&self, token: &AccessToken) -> AuthResult<ExternalIdentity> {
        let res = self
            .http
            .get(&self.profile_url)
            .bearer_auth(&token.0)
            .send()
            .await
            .map_err(|e| AuthError::ProfileFetch(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(AuthError::ProfileFetch(format!(
                "profile endpoint returned {status}"
            )));
        }

        let user: DiscordUser = res
            .json()
            .await
            .map_err(|e| AuthError::ProfileFetch(format!("decode profile response: {e}")))?;
        debug!(discord_id = %user.id, "discord profile fetched");
        Ok(user.into())
    }
}
