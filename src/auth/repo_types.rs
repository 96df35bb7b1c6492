use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// How an account first came into existence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Native,
    Discord,
}

/// Account record in the database. Never serialized; callers get `PublicAccount`.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: String,                   // 30-char opaque id, immutable
    pub email: String,                // unique, lowercased
    pub password_hash: String,        // argon2 PHC string
    pub username: Option<String>,     // display name
    pub account_type: AccountType,
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a new account; `id` and `created_at` are assigned on create.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub username: Option<String>,
    pub account_type: AccountType,
}
