use sqlx::migrate::Migrator;
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::error::Result;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run(pool: &Pool<Sqlite>) -> Result<()> {
    info!("Running database migrations");
    MIGRATOR.run(pool).await?;
    info!("Database migrations completed");

    Ok(())
}
