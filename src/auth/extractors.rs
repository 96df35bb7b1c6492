use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use super::jwt::JwtKeys;
use crate::error::AuthError;

pub const AUTH_COOKIE: &str = "Authorization";

/// Extracts and validates the JWT, returning the account ID.
///
/// Accepts `Authorization: Bearer <token>` or the `Authorization` cookie set on login.
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| AuthError::Unauthorized("missing Authorization header".into()))?;

        let claims = JwtKeys::from_ref(state).verify(&token)?;
        Ok(AuthUser(claims.sub))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let auth = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::to_string)
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn auth_cookie(token: &str) -> String {
    format!(
        "{AUTH_COOKIE}={token}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        super::jwt::TOKEN_TTL.whole_seconds()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(name: header::HeaderName, value: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(name, value)
            .body(())
            .expect("request")
            .into_parts();
        parts
    }

    #[test]
    fn reads_bearer_header() {
        let parts = parts_with(header::AUTHORIZATION, "Bearer abc.def.ghi");
        assert_eq!(bearer_token(&parts).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_other_schemes() {
        let parts = parts_with(header::AUTHORIZATION, "Basic dXNlcjpwYXNz");
        assert!(bearer_token(&parts).is_none());
    }

    #[test]
    fn reads_auth_cookie_among_others() {
        let parts = parts_with(header::COOKIE, "theme=dark; Authorization=tok.en.x; lang=en");
        assert_eq!(cookie_token(&parts).as_deref(), Some("tok.en.x"));
    }

    #[test]
    fn cookie_lives_ten_days() {
        let cookie = auth_cookie("t");
        assert!(cookie.starts_with("Authorization=t;"));
        assert!(cookie.contains("Max-Age=864000"));
        assert!(cookie.contains("HttpOnly"));
    }
}
