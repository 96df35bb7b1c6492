use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};

use crate::{
    auth::claims::Claims,
    config::JwtConfig,
    error::{AuthError, AuthResult},
    state::AppState,
};

/// Fixed validity window of an issued token: 10 days.
pub const TOKEN_TTL: Duration = Duration::hours(240);

/// A signed bearer token and the instant it stops being accepted.
#[derive(Debug, Clone, Serialize)]
pub struct SignedToken {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }

    pub fn issue(&self, account_id: &str) -> AuthResult<SignedToken> {
        self.issue_at(account_id, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, account_id: &str, now: OffsetDateTime) -> AuthResult<SignedToken> {
        let expires_at = now + TOKEN_TTL;
        let claims = Claims {
            sub: account_id.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: expires_at.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            error!(error = %e, "jwt encode failed");
            AuthError::Signing(e.to_string())
        })?;
        debug!(account_id = %account_id, "jwt signed");
        Ok(SignedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            AuthError::Unauthorized("Invalid or expired token".into())
        })?;
        debug!(account_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}
