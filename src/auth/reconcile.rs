use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        dto::{PublicAccount, ReconcileOutcome},
        jwt::{JwtKeys, SignedToken},
        password::{hash_password, verify_password},
        repo::{AccountRepository, RepoError},
        repo_types::{Account, AccountType, NewAccount},
    },
    error::{AuthError, AuthResult},
    oauth::{ExternalIdentity, OAuthExchangeClient},
    state::AppState,
};

const MAX_CODE_LEN: usize = 512;

pub(crate) fn is_well_formed_code(code: &str) -> bool {
    lazy_static! {
        static ref CODE_RE: Regex = Regex::new(r"^[A-Za-z0-9._~-]+$").unwrap();
    }
    code.len() <= MAX_CODE_LEN && CODE_RE.is_match(code)
}

/// Result of a successful Discord login.
#[derive(Debug)]
pub struct Reconciled {
    pub account: PublicAccount,
    pub token: SignedToken,
    pub outcome: ReconcileOutcome,
}

/// Links a Discord identity to a local account, creating one on first login.
///
/// The Discord user id is the password-equivalent of a Discord-created account:
/// it is hashed on creation and verified on every later login, so native and
/// Discord accounts share the same credential check. An account created by
/// native signup never matches and its owner gets `CredentialMismatch`.
pub struct IdentityReconciler {
    accounts: Arc<dyn AccountRepository>,
    oauth: Arc<dyn OAuthExchangeClient>,
    keys: JwtKeys,
}

impl FromRef<AppState> for IdentityReconciler {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.accounts.clone(),
            state.oauth.clone(),
            JwtKeys::from_ref(state),
        )
    }
}

impl IdentityReconciler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        oauth: Arc<dyn OAuthExchangeClient>,
        keys: JwtKeys,
    ) -> Self {
        Self {
            accounts,
            oauth,
            keys,
        }
    }

    #[instrument(skip_all)]
    pub async fn reconcile(&self, code: &str) -> AuthResult<Reconciled> {
        if !is_well_formed_code(code) {
            return Err(AuthError::InvalidCode);
        }

        let access = self.oauth.exchange_code(code).await?;
        let identity = self.oauth.fetch_profile(&access).await?;
        debug!(provider = ?identity.provider, discord_id = %identity.id, "identity fetched");

        let (account, outcome) = self.find_or_create(identity).await?;
        let token = self.keys.issue(&account.id)?;

        info!(account_id = %account.id, outcome = ?outcome, "discord login");
        Ok(Reconciled {
            account: account.into(),
            token,
            outcome,
        })
    }

    async fn find_or_create(
        &self,
        identity: ExternalIdentity,
    ) -> AuthResult<(Account, ReconcileOutcome)> {
        let email = identity
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AuthError::ProfileFetch("discord profile carries no email".into()))?;

        if !identity.email_verified {
            return Err(AuthError::ProfileFetch(
                "discord email is not verified".into(),
            ));
        }

        match self.accounts.find_by_email(&email).await {
            Ok(account) => self.matched(&identity, account),
            Err(RepoError::NotFound) => {
                let password_hash = hash_password(&identity.id)?;
                let created = self
                    .accounts
                    .create(NewAccount {
                        email: email.clone(),
                        password_hash,
                        username: identity.username.clone(),
                        account_type: AccountType::Discord,
                    })
                    .await;
                match created {
                    Ok(account) => Ok((account, ReconcileOutcome::Created)),
                    // a concurrent first login for the same email won the insert
                    Err(RepoError::Conflict(_)) => {
                        debug!("account created concurrently, matching instead");
                        let account = self
                            .accounts
                            .find_by_email(&email)
                            .await
                            .map_err(AuthError::Lookup)?;
                        self.matched(&identity, account)
                    }
                    Err(e) => Err(AuthError::Lookup(e)),
                }
            }
            Err(e) => Err(AuthError::Lookup(e)),
        }
    }

    fn matched(
        &self,
        identity: &ExternalIdentity,
        account: Account,
    ) -> AuthResult<(Account, ReconcileOutcome)> {
        if let Err(e) = verify_password(&identity.id, &account.password_hash) {
            warn!(
                account_id = %account.id,
                account_type = ?account.account_type,
                "discord identity does not match existing account"
            );
            return Err(e);
        }
        Ok((account, ReconcileOutcome::Matched))
    }
}
