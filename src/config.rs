use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::token_sync::explorer::DEFAULT_EXPLORER_URL;
use crate::token_sync::SyncConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub explorer_base_url: String,
    pub network: String,
    pub environment: String,
    pub sync: SyncConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);
        let explorer_base_url =
            env::var("EXPLORER_BASE_URL").unwrap_or_else(|_| DEFAULT_EXPLORER_URL.to_string());
        let network = env::var("NETWORK").unwrap_or_else(|_| "mantle".to_string());
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let mut sync = SyncConfig::default();
        if let Some(minutes) = env::var("REFRESH_INTERVAL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            sync.refresh_interval = Duration::from_secs(minutes * 60);
        }

        Ok(Self {
            database_url,
            port,
            explorer_base_url,
            network,
            environment,
            sync,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment != "production"
    }
}
