#![cfg(test)]
use configs::DatabaseConfig;
use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;

use crate::db::DbStorage;

/// Fresh private SQLite database; each call gets its own.
pub async fn memory_connection() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() };
    Ok(connect_with_config(&cfg).await?)
}

/// Migrated in-memory database behind the relational backend.
pub async fn memory_storage() -> Result<DbStorage, anyhow::Error> {
    let db = memory_connection().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(DbStorage::with_connection(db, false))
}
