use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::jwt::SignedToken;
use crate::auth::repo_types::{Account, AccountType};

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Query string Discord redirects back with.
#[derive(Debug, Deserialize)]
pub struct DiscordCallback {
    pub code: Option<String>,
}

/// Whether reconciliation logged into an existing account or created one.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileOutcome {
    Matched,
    Created,
}

/// Response returned after register, login or discord login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub token: SignedToken,
    pub user: PublicAccount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ReconcileOutcome>,
}

/// Account as seen by clients: the credential never leaves the server.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicAccount {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
    pub account_type: AccountType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Account> for PublicAccount {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            username: a.username,
            account_type: a.account_type,
            created_at: a.created_at,
        }
    }
}
