use axum::{
    extract::{FromRef, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, DiscordCallback, LoginRequest, PublicAccount, RegisterRequest},
        extractors::{auth_cookie, AuthUser},
        reconcile::IdentityReconciler,
        repo::AccountRepository,
        services::AuthService,
    },
    error::{AuthError, AuthResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/discord/redirect", get(discord_redirect))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn with_cookie(status: StatusCode, resp: AuthResponse) -> impl IntoResponse {
    let cookie = auth_cookie(&resp.token.token);
    (status, [(header::SET_COOKIE, cookie)], Json(resp))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse> {
    let (user, token) = AuthService::from_ref(&state).register(payload).await?;
    Ok(with_cookie(
        StatusCode::CREATED,
        AuthResponse {
            token,
            user,
            outcome: None,
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse> {
    let (user, token) = AuthService::from_ref(&state).login(payload).await?;
    Ok(with_cookie(
        StatusCode::ACCEPTED,
        AuthResponse {
            token,
            user,
            outcome: None,
        },
    ))
}

#[instrument(skip(state, params))]
pub async fn discord_redirect(
    State(state): State<AppState>,
    Query(params): Query<DiscordCallback>,
) -> AuthResult<impl IntoResponse> {
    let code = params.code.ok_or(AuthError::InvalidCode)?;
    let done = IdentityReconciler::from_ref(&state).reconcile(&code).await?;
    Ok(with_cookie(
        StatusCode::ACCEPTED,
        AuthResponse {
            token: done.token,
            user: done.account,
            outcome: Some(done.outcome),
        },
    ))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(account_id): AuthUser,
) -> AuthResult<Json<PublicAccount>> {
    let account = state.accounts.find_by_id(&account_id).await.map_err(|e| {
        tracing::error!(error = %e, account_id = %account_id, "account not found");
        AuthError::Unauthorized("Account not found".into())
    })?;
    Ok(Json(account.into()))
}
