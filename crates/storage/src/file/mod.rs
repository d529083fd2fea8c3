//! JSON document backend.
pub mod index;
pub mod file_storage;

pub use file_storage::FileStorage;
pub use index::{new_index, ObjectIndex};
