use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::AvatarResponse;
use super::repo_types::{ProfileDetails, ProfileDetailsInput};
use super::services::{self, AvatarUpload, MAX_AVATAR_BYTES};
use crate::{
    auth::extractors::AuthUser,
    error::{AuthError, AuthResult},
    state::AppState,
};

pub fn details_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/details", get(get_details).put(set_details))
        .route("/profile/avatar", get(get_avatar))
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_avatar))
        // multipart framing on top of the 1 MiB file
        .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 64 * 1024))
}

#[instrument(skip(state, input))]
pub async fn set_details(
    State(state): State<AppState>,
    AuthUser(account_id): AuthUser,
    Json(input): Json<ProfileDetailsInput>,
) -> AuthResult<Json<ProfileDetails>> {
    services::set_details(&state, &account_id, input).await.map(Json)
}

#[instrument(skip(state))]
pub async fn get_details(
    State(state): State<AppState>,
    AuthUser(account_id): AuthUser,
) -> AuthResult<Json<ProfileDetails>> {
    services::get_details(&state, &account_id).await.map(Json)
}

/// POST /upload (multipart), field `avatar`
#[instrument(skip(state, mp))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(account_id): AuthUser,
    mut mp: Multipart,
) -> AuthResult<(StatusCode, Json<AvatarResponse>)> {
    let bad_form = |_| AuthError::Validation("Unable to parse form".into());

    let mut upload = None;
    while let Some(field) = mp.next_field().await.map_err(bad_form)? {
        if field.name() != Some("avatar") {
            continue;
        }
        let filename = field.file_name().unwrap_or("avatar").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field.bytes().await.map_err(bad_form)?;
        upload = Some((filename, AvatarUpload { body, content_type }));
        break;
    }
    let (filename, upload) =
        upload.ok_or_else(|| AuthError::Validation("Error retrieving the file".into()))?;

    let avatar_url = services::upload_avatar(&state, &account_id, upload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AvatarResponse {
            message: format!("File {filename} uploaded successfully"),
            avatar_url,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_avatar(
    State(state): State<AppState>,
    AuthUser(account_id): AuthUser,
) -> AuthResult<Redirect> {
    let url = services::avatar_url(&state, &account_id).await?;
    Ok(Redirect::temporary(&url))
}
