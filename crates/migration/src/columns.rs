//! Column builders shared by the table migrations.
use sea_orm_migration::{prelude::*, schema::timestamp_with_time_zone, sea_orm::DatabaseBackend};

/// Audit timestamp column keeping microseconds on every backend.
///
/// MySQL renders a plain timestamp with whole seconds, so it gets `DATETIME(6)`.
pub fn audit_timestamp<T: IntoIden>(backend: DatabaseBackend, col: T) -> ColumnDef {
    match backend {
        DatabaseBackend::MySql => ColumnDef::new(col).custom(Alias::new("DATETIME(6)")).not_null().take(),
        _ => timestamp_with_time_zone(col),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(backend: DatabaseBackend) -> String {
        let mut table = Table::create();
        table
            .table(Alias::new("states"))
            .col(audit_timestamp(backend, Alias::new("created_at")));
        match backend {
            DatabaseBackend::MySql => table.to_string(MysqlQueryBuilder),
            DatabaseBackend::Postgres => table.to_string(PostgresQueryBuilder),
            _ => table.to_string(SqliteQueryBuilder),
        }
    }

    #[test]
    fn mysql_keeps_fractional_seconds() {
        let sql = render(DatabaseBackend::MySql);
        assert!(sql.contains("`created_at` DATETIME(6) NOT NULL"), "{sql}");
    }

    #[test]
    fn other_backends_use_zoned_timestamps() {
        assert!(render(DatabaseBackend::Postgres).contains("timestamp with time zone"));
        assert!(!render(DatabaseBackend::Sqlite).contains("DATETIME(6)"));
    }
}
