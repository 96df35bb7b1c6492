use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::repo::ProfileRepository;
use super::repo_types::{ProfileDetails, ProfileDetailsInput};
use crate::auth::repo::{AccountRepository, RepoError};
use crate::auth::services::validate_username;
use crate::error::{AuthError, AuthResult};
use crate::state::AppState;
use crate::storage::StorageClient;

pub const MAX_AVATAR_BYTES: usize = 1 << 20;
const AVATAR_URL_TTL_SECS: u64 = 30 * 60;

pub struct AvatarUpload {
    pub body: Bytes,
    pub content_type: String,
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

fn clean(field: Option<String>) -> Option<String> {
    field.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_phone(phone: &Option<String>) -> AuthResult<()> {
    if let Some(p) = phone {
        let digits = p.chars().filter(char::is_ascii_digit).count();
        let allowed = p
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
        if !allowed || !(5..=20).contains(&digits) {
            return Err(AuthError::Validation("Invalid phone number".into()));
        }
    }
    Ok(())
}

/// Saves profile details and mirrors a non-empty username onto the account.
#[instrument(skip(st, input))]
pub async fn set_details(
    st: &AppState,
    account_id: &str,
    input: ProfileDetailsInput,
) -> AuthResult<ProfileDetails> {
    let input = ProfileDetailsInput {
        username: validate_username(input.username)?,
        phone: clean(input.phone),
        twitter: clean(input.twitter),
        discord: clean(input.discord),
        google: clean(input.google),
    };
    validate_phone(&input.phone)?;

    let mut account = st.accounts.find_by_id(account_id).await?;
    let details = st.profiles.upsert_details(account_id, &input).await?;

    if input.username.is_some() && account.username != input.username {
        account.username = input.username.clone();
        st.accounts.update(&account).await?;
    }

    info!(account_id = %account_id, "profile details saved");
    Ok(details)
}

pub async fn get_details(st: &AppState, account_id: &str) -> AuthResult<ProfileDetails> {
    st.profiles
        .find_details(account_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => AuthError::NotFound("No profile details yet".into()),
            other => AuthError::Lookup(other),
        })
}

/// Stores the image in the file store and points the account's avatar at it.
/// Returns a short-lived URL for the new avatar.
#[instrument(skip(st, upload), fields(size = upload.body.len()))]
pub async fn upload_avatar(
    st: &AppState,
    account_id: &str,
    upload: AvatarUpload,
) -> AuthResult<String> {
    if upload.body.is_empty() {
        return Err(AuthError::Validation("Avatar file is empty".into()));
    }
    if upload.body.len() > MAX_AVATAR_BYTES {
        return Err(AuthError::Validation("Avatar exceeds 1 MiB".into()));
    }
    let ext = ext_from_mime(&upload.content_type)
        .ok_or_else(|| AuthError::Validation("Unsupported image type".into()))?;

    // ids may contain '#', '%', '&'; keep them out of object keys
    let key = format!("avatars/{}.{}", Uuid::new_v4(), ext);
    st.storage
        .put_object(&key, upload.body, &upload.content_type)
        .await
        .map_err(|e| AuthError::Storage(format!("put_object {key}: {e:#}")))?;

    let previous = match st.profiles.set_avatar(account_id, &key).await {
        Ok(prev) => prev,
        Err(e) => {
            if let Err(cleanup) = st.storage.delete_object(&key).await {
                warn!(error = %cleanup, key = %key, "orphaned avatar object");
            }
            return Err(e.into());
        }
    };

    if let Some(old) = previous.filter(|old| *old != key) {
        if let Err(e) = st.storage.delete_object(&old).await {
            warn!(error = %e, key = %old, "failed to delete replaced avatar");
        }
    }

    info!(account_id = %account_id, key = %key, "avatar uploaded");
    presign(st, &key).await
}

pub async fn avatar_url(st: &AppState, account_id: &str) -> AuthResult<String> {
    let key = st.profiles.find_avatar(account_id).await.map_err(|e| match e {
        RepoError::NotFound => AuthError::NotFound("No avatar uploaded".into()),
        other => AuthError::Lookup(other),
    })?;
    presign(st, &key).await
}

async fn presign(st: &AppState, key: &str) -> AuthResult<String> {
    st.storage
        .presign_get(key, AVATAR_URL_TTL_SECS)
        .await
        .map_err(|e| AuthError::Storage(format!("presign {key}: {e:#}")))
}
