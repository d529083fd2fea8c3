//! Persistence for the HBnB entity model.
//! - `Storage` is the facade every caller uses; it owns one `StorageBackend`.
//! - `file`: whole-document JSON store with atomic overwrite.
//! - `db`: transactional relational store over sea-orm.

pub mod errors;
pub mod backend;
pub mod file;
pub mod db;
pub mod facade;
#[cfg(test)]
pub mod test_support;

pub use backend::StorageBackend;
pub use db::DbStorage;
pub use errors::StorageError;
pub use facade::Storage;
pub use file::{new_index, FileStorage, ObjectIndex};
