use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Build the single process-wide connection pool from DATABASE_URL.
///
/// Constructed once at startup and handed to the coordinator's collaborators
/// through `AppState`; request handlers never build their own clients.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, PoolError> {
    let url = std::env::var("DATABASE_URL").map_err(|_| PoolError::ConfigMissing("DATABASE_URL"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connect(&url)
        .await?;

    info!(max_connections = config.max_connections, "database pool ready");
    Ok(pool)
}

/// Pings the pool to ensure connectivity.
pub async fn health_check(pool: &PgPool) -> Result<(), PoolError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
