use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::repo::{AccountRepository, PgAccountRepository};
use crate::config::AppConfig;
use crate::oauth::{DiscordClient, OAuthExchangeClient};
use crate::profile::repo::{PgProfileRepository, ProfileRepository};
use crate::storage::{self, StorageClient};

/// Everything a request handler may reach, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: Arc<dyn AccountRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub oauth: Arc<dyn OAuthExchangeClient>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let storage = storage::from_config(&config.storage).await?;
        let oauth = Arc::new(DiscordClient::new(config.discord.clone())?);

        Ok(Self {
            accounts: Arc::new(PgAccountRepository::new(db.clone())),
            profiles: Arc::new(PgProfileRepository::new(db)),
            oauth,
            storage,
            config: Arc::new(config),
        })
    }
}
