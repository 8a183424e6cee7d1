use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tokio::sync::OnceCell;
use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "orbit.db".to_string() }
    }
}

/// Shared handle over the SQLite pool.
///
/// The pool is created lazily: the first `pool()` caller opens the file and
/// runs migrations while every concurrent caller awaits the same in-flight
/// initialization, so the schema-creation step can never race against
/// itself. Repeated calls after that are cheap reads of the ready pool.
pub struct Database {
    config: DatabaseConfig,
    pool: OnceCell<Pool<Sqlite>>,
}

impl Database {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config, pool: OnceCell::new() }
    }

    pub async fn pool(&self) -> Result<&Pool<Sqlite>> {
        self.pool.get_or_try_init(|| Self::initialize(&self.config)).await
    }

    async fn initialize(config: &DatabaseConfig) -> Result<Pool<Sqlite>> {
        let path = Path::new(&config.path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!("Created database directory: {}", parent.display());
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;

        crate::migrations::run(&pool).await?;

        info!("Database ready: {}", config.path);

        Ok(pool)
    }

    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            info!("Database connection pool closed");
        }
    }
}
