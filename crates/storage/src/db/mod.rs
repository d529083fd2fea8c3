//! Relational backend over sea-orm.
pub mod db_storage;

pub use db_storage::DbStorage;
