use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::account_id::generate_id;
use crate::auth::repo_types::{Account, NewAccount};

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    /// Maps unique-constraint violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepoError::Conflict(what.to_string())
            }
            other => RepoError::Database(other),
        }
    }
}

/// Persistence boundary for accounts. Email uniqueness is enforced here.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Account, RepoError>;
    async fn find_by_id(&self, id: &str) -> Result<Account, RepoError>;
    /// Inserts the account under a freshly generated id.
    async fn create(&self, account: NewAccount) -> Result<Account, RepoError>;
    /// Writes the mutable fields (display name) of an existing account.
    async fn update(&self, account: &Account) -> Result<Account, RepoError>;
}

#[derive(Clone)]
pub struct PgAccountRepository {
    db: PgPool,
}

impl PgAccountRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Account, RepoError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, username, account_type, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn find_by_id(&self, id: &str) -> Result<Account, RepoError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, username, account_type, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn create(&self, account: NewAccount) -> Result<Account, RepoError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, password_hash, username, account_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, username, account_type, created_at
            "#,
        )
        .bind(generate_id())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.username)
        .bind(account.account_type)
        .fetch_one(&self.db)
        .await
        .map_err(|e| RepoError::from_write(e, "account"))
    }

    async fn update(&self, account: &Account) -> Result<Account, RepoError> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
               SET username = $2
             WHERE id = $1
            RETURNING id, email, password_hash, username, account_type, created_at
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound)
    }
}
