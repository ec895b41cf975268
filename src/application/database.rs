//! Database connection and schema setup

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::config::{database::DatabaseConfig, CONFIG};
use crate::error::{AppError, Result};
use crate::migrations::Migrator;

/// Connect with the configured settings and bring the schema up to date
pub async fn connect() -> Result<DatabaseConnection> {
    open(&CONFIG.database).await
}

pub async fn open(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(config.database_url.as_str());
    opts.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .map_err(|e| AppError::Internal(format!("Database connection failed: {}", e)))?;

    let pending = Migrator::get_pending_migrations(&db)
        .await
        .map_err(|e| AppError::Internal(format!("Could not read migration state: {}", e)))?
        .len();
    if pending > 0 {
        tracing::info!(pending, "Applying database migrations");
        Migrator::up(&db, None)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
    }

    Ok(db)
}
