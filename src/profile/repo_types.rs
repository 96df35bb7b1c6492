use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Optional contact and social details attached to an account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct ProfileDetails {
    pub account_id: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub twitter: Option<String>,
    pub discord: Option<String>,
    pub google: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Writable part of `ProfileDetails`; the owner comes from the token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileDetailsInput {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub discord: Option<String>,
    #[serde(default)]
    pub google: Option<String>,
}
