//! PostgreSQL pool, embedded schema migrations and liveness probing

use std::time::Duration;

use serde::Serialize;
use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Database setup failures
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("cannot connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("schema migration failed: {0}")]
    Migrate(#[from] MigrateError),
}

/// Pool sizing and timeouts taken from [`Config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl PoolSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_connections: config.db_max_connections.max(1),
            acquire_timeout: Duration::from_secs(config.db_acquire_timeout_secs),
            idle_timeout: Duration::from_secs(config.db_idle_timeout_secs),
        }
    }

    pub fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
    }
}

/// Open the loan book pool
pub async fn create_pool(config: &Config) -> Result<PgPool, DbError> {
    let settings = PoolSettings::from_config(config);
    let url = config.database_url_masked();

    tracing::info!(
        database = %url,
        max_connections = settings.max_connections,
        acquire_timeout_s = settings.acquire_timeout.as_secs(),
        "Connecting to database"
    );

    settings
        .options()
        .connect(&config.database_url)
        .await
        .map_err(|source| DbError::Connect { url, source })
}

/// Apply the embedded loan book schema; returns how many migrations are known
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DbError> {
    let migrator = sqlx::migrate!("./migrations");
    let known = migrator.iter().count();

    migrator.run(pool).await?;

    tracing::info!(migrations = known, "Loan book schema is up to date");
    Ok(known)
}

/// Database reachability as reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

/// Ping the database; failures are logged and reported as disconnected
pub async fn database_status(pool: &PgPool) -> DatabaseStatus {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => DatabaseStatus::Connected,
        Err(err) => {
            tracing::warn!(error = %err, "Database ping failed");
            DatabaseStatus::Disconnected
        }
    }
}
