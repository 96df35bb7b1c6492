use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::repo::RepoError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("missing or malformed authorization code")]
    InvalidCode,

    #[error("oauth code exchange failed: {0}")]
    Exchange(String),

    #[error("oauth profile fetch failed: {0}")]
    ProfileFetch(String),

    #[error("account lookup failed: {0}")]
    Lookup(#[source] RepoError),

    #[error("credentials do not match")]
    CredentialMismatch,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

impl From<RepoError> for AuthError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AuthError::NotFound("record not found".into()),
            RepoError::Conflict(what) => AuthError::Conflict(what),
            other => AuthError::Lookup(other),
        }
    }
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::InvalidCode => StatusCode::BAD_REQUEST,
            AuthError::CredentialMismatch | AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Exchange(_) | AuthError::ProfileFetch(_) => StatusCode::BAD_GATEWAY,
            AuthError::Lookup(_)
            | AuthError::Hashing(_)
            | AuthError::Signing(_)
            | AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to an external caller. Upstream and primitive
    /// failures are logged in full and collapsed to a generic string.
    fn public_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::InvalidCode => "Missing or malformed 'code' parameter".into(),
            AuthError::CredentialMismatch => "Invalid credentials".into(),
            AuthError::Conflict(msg) | AuthError::NotFound(msg) | AuthError::Unauthorized(msg) => {
                msg.clone()
            }
            AuthError::Exchange(_) | AuthError::ProfileFetch(_) => {
                "Discord login failed, try again".into()
            }
            AuthError::Lookup(_)
            | AuthError::Hashing(_)
            | AuthError::Signing(_)
            | AuthError::Storage(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, %status, "request rejected");
        }

        let body = Json(json!({
            "error": self.public_message(),
        }));

        (status, body).into_response()
    }
}
