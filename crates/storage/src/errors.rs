use models::{errors::ModelError, Kind};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),
    /// The backing medium refused a write or commit. Nothing partial is visible.
    #[error("durability failure: {0}")]
    Durability(String),
    /// A relational write referenced a row that does not exist, or removed one still referenced.
    #[error("referential gap: {0}")]
    ReferentialGap(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl StorageError {
    pub fn not_found(kind: Kind, id: &str) -> Self { Self::NotFound(kind.key(id)) }
}

/// SQLite reports a blocked parent delete as extended code 1811, which
/// `sql_err` leaves unclassified, so the driver text is checked as well.
fn is_foreign_key_violation(e: &DbErr) -> bool {
    if matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) {
        return true;
    }
    let text = e.to_string();
    text.contains("FOREIGN KEY constraint failed")
        || text.contains("foreign key constraint fails")
        || ["1451", "1452"].iter().any(|code| text.contains(&format!("{code} (23000)")))
}

impl From<DbErr> for StorageError {
    fn from(e: DbErr) -> Self {
        if is_foreign_key_violation(&e) {
            Self::ReferentialGap(e.to_string())
        } else {
            Self::Durability(e.to_string())
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self { Self::Durability(e.to_string()) }
}
