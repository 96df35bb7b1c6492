use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{ProfileDetails, ProfileDetailsInput};
use crate::auth::repo::RepoError;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn upsert_details(
        &self,
        account_id: &str,
        input: &ProfileDetailsInput,
    ) -> Result<ProfileDetails, RepoError>;
    async fn find_details(&self, account_id: &str) -> Result<ProfileDetails, RepoError>;
    /// Points the account's avatar at `object_key`; returns the key it replaced.
    async fn set_avatar(
        &self,
        account_id: &str,
        object_key: &str,
    ) -> Result<Option<String>, RepoError>;
    async fn find_avatar(&self, account_id: &str) -> Result<String, RepoError>;
}

#[derive(Clone)]
pub struct PgProfileRepository {
    db: PgPool,
}

impl PgProfileRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn upsert_details(
        &self,
        account_id: &str,
        input: &ProfileDetailsInput,
    ) -> Result<ProfileDetails, RepoError> {
        sqlx::query_as::<_, ProfileDetails>(
            r#"
            INSERT INTO profile_details (account_id, username, phone, twitter, discord, google)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (account_id) DO UPDATE
               SET username   = EXCLUDED.username,
                   phone      = EXCLUDED.phone,
                   twitter    = EXCLUDED.twitter,
                   discord    = EXCLUDED.discord,
                   google     = EXCLUDED.google,
                   updated_at = now()
            RETURNING account_id, username, phone, twitter, discord, google, updated_at
            "#,
        )
        .bind(account_id)
        .bind(&input.username)
        .bind(&input.phone)
        .bind(&input.twitter)
        .bind(&input.discord)
        .bind(&input.google)
        .fetch_one(&self.db)
        .await
        .map_err(|e| RepoError::from_write(e, "profile details"))
    }

    async fn find_details(&self, account_id: &str) -> Result<ProfileDetails, RepoError> {
        sqlx::query_as::<_, ProfileDetails>(
            r#"
            SELECT account_id, username, phone, twitter, discord, google, updated_at
            FROM profile_details
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn set_avatar(
        &self,
        account_id: &str,
        object_key: &str,
    ) -> Result<Option<String>, RepoError> {
        let mut tx = self.db.begin().await?;

        let previous = sqlx::query_scalar::<_, String>(
            r#"SELECT object_key FROM avatars WHERE account_id = $1 FOR UPDATE"#,
        )
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO avatars (account_id, object_key)
            VALUES ($1, $2)
            ON CONFLICT (account_id) DO UPDATE
               SET object_key = EXCLUDED.object_key,
                   updated_at = now()
            "#,
        )
        .bind(account_id)
        .bind(object_key)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(previous)
    }

    async fn find_avatar(&self, account_id: &str) -> Result<String, RepoError> {
        sqlx::query_scalar::<_, String>(r#"SELECT object_key FROM avatars WHERE account_id = $1"#)
            .bind(account_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(RepoError::NotFound)
    }
}
