pub mod models;
pub mod query;
pub mod repository;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the data-access layer. Absence is a distinct variant so
/// callers can tell "no such row" from "the query failed".
#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found")]
    NotFound,

    #[error("column not allow-listed: {0}")]
    UnknownColumn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Build the process-wide connection pool. Constructed once at startup and
/// injected into application state; never reached through a global.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<MySqlPool> {
    let url = config.connection_url()?;
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&url)
        .await?;
    info!("connected to database {} on {}", config.name, config.host);
    Ok(pool)
}

/// Pings the pool to confirm connectivity.
pub async fn health_check(pool: &MySqlPool) -> Result<(), DbError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
