use anyhow::Context;
use serde::Deserialize;

pub const DISCORD_AUTH_URL: &str = "https://discord.com/oauth2/authorize";
pub const DISCORD_TOKEN_URL: &str = "https://discord.com/api/v10/oauth2/token";
pub const DISCORD_PROFILE_URL: &str = "https://discord.com/api/v10/users/@me";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: String,
    pub profile_url: String,
    pub timeout_secs: u64,
}

/// Where uploaded avatars go.
#[derive(Debug, Clone, Deserialize)]
pub enum StorageConfig {
    S3 {
        endpoint: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        region: String,
    },
    Local {
        root: String,
        public_base_url: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub discord: DiscordConfig,
    pub storage: StorageConfig,
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: var_or("JWT_ISSUER", "authkit"),
            audience: var_or("JWT_AUDIENCE", "authkit-users"),
        };
        anyhow::ensure!(!jwt.secret.is_empty(), "JWT_SECRET must not be empty");

        let discord = DiscordConfig {
            client_id: var_or("DISCORD_CLIENT_ID", ""),
            client_secret: var_or("DISCORD_CLIENT_SECRET", ""),
            redirect_uri: var_or("DISCORD_REDIRECT_URI", ""),
            token_url: var_or("DISCORD_TOKEN_URL", DISCORD_TOKEN_URL),
            profile_url: var_or("DISCORD_PROFILE_URL", DISCORD_PROFILE_URL),
            timeout_secs: std::env::var("DISCORD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        if discord.client_id.is_empty() || discord.client_secret.is_empty() {
            tracing::warn!("DISCORD_CLIENT_ID/DISCORD_CLIENT_SECRET not set; discord login will fail");
        }

        let storage = match std::env::var("MINIO_ENDPOINT") {
            Ok(endpoint) => StorageConfig::S3 {
                endpoint,
                bucket: std::env::var("MINIO_BUCKET").context("MINIO_BUCKET must be set")?,
                access_key: std::env::var("MINIO_ACCESS_KEY")
                    .context("MINIO_ACCESS_KEY must be set")?,
                secret_key: std::env::var("MINIO_SECRET_KEY")
                    .context("MINIO_SECRET_KEY must be set")?,
                region: var_or("MINIO_REGION", "us-east-1"),
            },
            Err(_) => StorageConfig::Local {
                root: var_or("AVATAR_DIR", "avatars"),
                public_base_url: var_or("AVATAR_PUBLIC_URL", "/avatars"),
            },
        };

        Ok(Self {
            database_url,
            jwt,
            discord,
            storage,
        })
    }
}
