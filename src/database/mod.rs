pub mod migrations;
pub mod models;
pub mod repository;

pub use migrations::MigrationRunner;
pub use models::{ConversionError, NewToken, Token};
pub use repository::TokenRepository;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("Failed to connect to Postgres")
}
