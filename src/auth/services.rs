use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicAccount, RegisterRequest},
        jwt::{JwtKeys, SignedToken},
        password::{hash_password, verify_password},
        repo::{AccountRepository, RepoError},
        repo_types::{AccountType, NewAccount},
    },
    error::{AuthError, AuthResult},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 5;
pub const MAX_USERNAME_LEN: usize = 30;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AuthError::Validation("Invalid email".into()));
    }
    Ok(email)
}

pub(crate) fn validate_username(username: Option<String>) -> AuthResult<Option<String>> {
    let username = username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    if let Some(u) = &username {
        if u.chars().count() > MAX_USERNAME_LEN {
            return Err(AuthError::Validation("Username too long".into()));
        }
    }
    Ok(username)
}

/// Native email/password signup and login.
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.accounts.clone(), JwtKeys::from_ref(state))
    }
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountRepository>, keys: JwtKeys) -> Self {
        Self { accounts, keys }
    }

    #[instrument(skip_all)]
    pub async fn register(&self, req: RegisterRequest) -> AuthResult<(PublicAccount, SignedToken)> {
        let email = normalize_email(&req.email)?;
        if req.password.len() < MIN_PASSWORD_LEN {
            warn!("password too short");
            return Err(AuthError::Validation("Password too short".into()));
        }
        let username = validate_username(req.username)?;

        let password_hash = hash_password(&req.password)?;
        let account = self
            .accounts
            .create(NewAccount {
                email,
                password_hash,
                username,
                account_type: AccountType::Native,
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict(_) => AuthError::Conflict("Email already registered".into()),
                other => AuthError::Lookup(other),
            })?;

        let token = self.keys.issue(&account.id)?;
        info!(account_id = %account.id, email = %account.email, "account registered");
        Ok((account.into(), token))
    }

    #[instrument(skip_all)]
    pub async fn login(&self, req: LoginRequest) -> AuthResult<(PublicAccount, SignedToken)> {
        let email = normalize_email(&req.email)?;

        let account = match self.accounts.find_by_email(&email).await {
            Ok(a) => a,
            Err(RepoError::NotFound) => {
                warn!(email = %email, "login unknown email");
                return Err(AuthError::CredentialMismatch);
            }
            Err(e) => return Err(AuthError::Lookup(e)),
        };

        if let Err(e) = verify_password(&req.password, &account.password_hash) {
            warn!(account_id = %account.id, "login invalid password");
            return Err(e);
        }

        let token = self.keys.issue(&account.id)?;
        info!(account_id = %account.id, "account logged in");
        Ok((account.into(), token))
    }
}
