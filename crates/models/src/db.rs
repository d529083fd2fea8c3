use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

/// Open a pooled connection from storage configuration.
///
/// In-memory SQLite is pinned to one connection: every pooled connection
/// would otherwise see its own empty database.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let url = cfg.connection_url();
    let in_memory = is_in_memory(&url);
    let (min, max) = if in_memory { (1, 1) } else { (cfg.min_connections, cfg.max_connections) };

    let mut opts = ConnectOptions::new(url.clone());
    opts.max_connections(max)
        .min_connections(min)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    if in_memory {
        opts.idle_timeout(Duration::from_secs(u32::MAX as u64))
            .max_lifetime(Duration::from_secs(u32::MAX as u64));
    }

    let db = Database::connect(opts).await?;
    info!(event = "db_connected", backend = ?db.get_database_backend(), max_connections = max, "database connection established");
    Ok(db)
}

fn is_in_memory(url: &str) -> bool {
    url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::MigratorTrait;
    use sea_orm::{ActiveModelTrait, EntityTrait};

    use crate::schema::{cities, states};
    use crate::{City, State};

    async fn memory_db() -> anyhow::Result<DatabaseConnection> {
        let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() };
        let db = connect_with_config(&cfg).await?;
        migration::Migrator::up(&db, None).await?;
        Ok(db)
    }

    #[test]
    fn detects_in_memory_sqlite() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:hbnb?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://hbnb.db"));
        assert!(!is_in_memory("mysql://u:p@localhost/hbnb"));
    }

    #[tokio::test]
    async fn migrations_create_every_table() -> anyhow::Result<()> {
        let db = memory_db().await?;
        // a second run is a no-op
        migration::Migrator::up(&db, None).await?;

        assert!(crate::schema::states::Entity::find().all(&db).await?.is_empty());
        assert!(crate::schema::place_amenity::Entity::find().all(&db).await?.is_empty());
        assert_eq!(db.get_database_backend(), sea_orm::DatabaseBackend::Sqlite);
        Ok(())
    }

    #[tokio::test]
    async fn rows_map_back_to_domain_values() -> anyhow::Result<()> {
        let db = memory_db().await?;
        let state = State::new("California")?;
        let city = City::new(&state.base.id, "San Francisco")?;
        states::ActiveModel::from(&state).insert(&db).await?;
        cities::ActiveModel::from(&city).insert(&db).await?;

        let row = cities::Entity::find_by_id(city.base.id.clone()).one(&db).await?;
        assert_eq!(row.map(City::from), Some(city.clone()));

        // dangling foreign key is refused
        let orphan = City::new("no-such-state", "Nowhere")?;
        assert!(cities::ActiveModel::from(&orphan).insert(&db).await.is_err());
        Ok(())
    }
}
