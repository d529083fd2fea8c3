use std::collections::HashMap;

use async_trait::async_trait;
use models::{Amenity, ForeignKey, Kind, Object};

use crate::errors::StorageError;

/// One persistence strategy behind the storage facade.
///
/// Implementations own the canonical copy of every entity. Values handed out
/// are detached copies; callers write changes back through `new` + `save`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short backend label for logs.
    fn name(&self) -> &'static str;

    /// Every live entity, or only those of `kind`, keyed by `"Kind.id"`.
    async fn all(&self, kind: Option<Kind>) -> Result<HashMap<String, Object>, StorageError>;

    /// The entity of `kind` with `id`, or `None`.
    async fn get(&self, kind: Kind, id: &str) -> Result<Option<Object>, StorageError>;

    async fn count(&self, kind: Option<Kind>) -> Result<usize, StorageError> {
        Ok(self.all(kind).await?.len())
    }

    /// Register an entity; replaces any stored entity with the same key.
    async fn new(&self, obj: Object) -> Result<(), StorageError>;

    /// Make every pending change durable. No-op when nothing is pending.
    async fn save(&self) -> Result<(), StorageError>;

    /// Remove an entity and its many-to-many edges. Dependents are left alone.
    async fn delete(&self, obj: &Object) -> Result<(), StorageError>;

    /// Rebuild live state from the durable store.
    async fn reload(&self) -> Result<(), StorageError>;

    /// End the current unit of work, discarding anything not saved.
    async fn close(&self) -> Result<(), StorageError>;

    /// Entities of `kind` whose `fk` attribute equals `owner_id`.
    async fn find_children(&self, kind: Kind, fk: ForeignKey, owner_id: &str) -> Result<Vec<Object>, StorageError>;

    /// Amenities linked to a place. Edges to missing amenities are skipped.
    async fn place_amenities(&self, place_id: &str) -> Result<Vec<Amenity>, StorageError>;

    /// Add a Place <-> Amenity edge; `false` when it already existed.
    async fn link_amenity(&self, place_id: &str, amenity_id: &str) -> Result<bool, StorageError>;

    /// Remove a Place <-> Amenity edge; `false` when there was none.
    async fn unlink_amenity(&self, place_id: &str, amenity_id: &str) -> Result<bool, StorageError>;
}
