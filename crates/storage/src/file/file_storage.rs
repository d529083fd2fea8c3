use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use models::{errors::ModelError, Amenity, ForeignKey, Kind, Object};
use serde_json::{Map, Value};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
    sync::Mutex,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{backend::StorageBackend, errors::StorageError, file::index::ObjectIndex};

/// JSON document backend.
///
/// All live entities sit in an [`ObjectIndex`]; `save` writes the whole index
/// to one document and `reload` swaps it back in. Mutations are visible to
/// readers immediately, durable only after `save`.
pub struct FileStorage {
    index: ObjectIndex,
    file_path: PathBuf,
    write_lock: Mutex<()>,
}

/// Outcome of reading the backing document.
enum Loaded {
    Missing,
    Objects { objects: HashMap<String, Object>, skipped: usize },
}

impl FileStorage {
    /// Bind an index to a document path. Nothing is read until `reload`.
    pub fn open<P: Into<PathBuf>>(path: P, index: ObjectIndex) -> Self {
        Self { index, file_path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn load(&self) -> Result<Loaded, StorageError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Loaded::Missing),
            Err(e) => return Err(StorageError::Durability(format!("read {}: {e}", self.file_path.display()))),
        };
        let document: Map<String, Value> = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Serialization(format!("{}: {e}", self.file_path.display())))?;

        let mut objects = HashMap::with_capacity(document.len());
        let mut skipped = 0usize;
        for (key, record) in document {
            let Value::Object(record) = record else {
                warn!(%key, "skipping record that is not an object");
                skipped += 1;
                continue;
            };
            match Object::from_dict(&record) {
                Ok(obj) => {
                    objects.insert(obj.key(), obj);
                }
                Err(ModelError::UnknownKind(kind)) => {
                    warn!(%key, %kind, "skipping record of unknown kind");
                    skipped += 1;
                }
                Err(e) => {
                    warn!(%key, error = %e, "skipping unreadable record");
                    skipped += 1;
                }
            }
        }
        Ok(Loaded::Objects { objects, skipped })
    }

    /// Write to a sibling temp file, then rename over the document.
    /// The temp file is synced first so the rename never publishes an empty document.
    async fn write_atomically(&self, data: Vec<u8>) -> Result<(), StorageError> {
        let parent = match self.file_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).await?;
        let file_name = self
            .file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::Config(format!("not a file path: {}", self.file_path.display())))?;
        let tmp = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

        let written = match write_synced(&tmp, &data).await {
            Ok(()) => fs::rename(&tmp, &self.file_path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(StorageError::Durability(format!("write {}: {e}", self.file_path.display())));
        }
        Ok(())
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

#[async_trait]
impl StorageBackend for FileStorage {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn all(&self, kind: Option<Kind>) -> Result<HashMap<String, Object>, StorageError> {
        let map = self.index.read().await;
        Ok(map
            .iter()
            .filter(|(_, obj)| kind.map_or(true, |k| obj.kind() == k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn get(&self, kind: Kind, id: &str) -> Result<Option<Object>, StorageError> {
        let map = self.index.read().await;
        Ok(map.get(&kind.key(id)).cloned())
    }

    async fn count(&self, kind: Option<Kind>) -> Result<usize, StorageError> {
        let map = self.index.read().await;
        Ok(match kind {
            Some(k) => map.values().filter(|o| o.kind() == k).count(),
            None => map.len(),
        })
    }

    async fn new(&self, obj: Object) -> Result<(), StorageError> {
        let key = obj.key();
        debug!(%key, "file: register");
        let mut map = self.index.write().await;
        map.insert(key, obj);
        Ok(())
    }

    async fn save(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let document = {
            let map = self.index.read().await;
            let mut document = Map::with_capacity(map.len());
            for (key, obj) in map.iter() {
                document.insert(key.clone(), Value::Object(obj.to_dict()?));
            }
            document
        };
        let count = document.len();
        let data = serde_json::to_vec(&document).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write_atomically(data).await?;
        info!(path = %self.file_path.display(), objects = count, "file: saved");
        Ok(())
    }

    async fn delete(&self, obj: &Object) -> Result<(), StorageError> {
        let key = obj.key();
        let mut map = self.index.write().await;
        if map.remove(&key).is_none() {
            debug!(%key, "file: delete of absent object ignored");
            return Ok(());
        }
        if obj.kind() == Kind::Amenity {
            for place in map.values_mut().filter_map(Object::as_place_mut) {
                place.remove_amenity(obj.id());
            }
        }
        debug!(%key, "file: deleted");
        Ok(())
    }

    async fn reload(&self) -> Result<(), StorageError> {
        match self.load().await? {
            Loaded::Missing => {
                debug!(path = %self.file_path.display(), "file: no document, starting fresh");
            }
            Loaded::Objects { objects, skipped } => {
                let count = objects.len();
                *self.index.write().await = objects;
                info!(path = %self.file_path.display(), objects = count, skipped, "file: reloaded");
            }
        }
        Ok(())
    }

    /// The index outlives the request scope; nothing to release.
    async fn close(&self) -> Result<(), StorageError> {
        debug!(path = %self.file_path.display(), "file: session closed");
        Ok(())
    }

    async fn find_children(&self, kind: Kind, fk: ForeignKey, owner_id: &str) -> Result<Vec<Object>, StorageError> {
        if !fk.applies_to(kind) {
            return Ok(Vec::new());
        }
        let map = self.index.read().await;
        Ok(map
            .values()
            .filter(|o| o.kind() == kind && o.foreign_key(fk) == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn place_amenities(&self, place_id: &str) -> Result<Vec<Amenity>, StorageError> {
        let map = self.index.read().await;
        let Some(place) = map.get(&Kind::Place.key(place_id)).and_then(Object::as_place) else {
            return Ok(Vec::new());
        };
        Ok(place
            .amenity_ids
            .iter()
            .filter_map(|id| match map.get(&Kind::Amenity.key(id)) {
                Some(Object::Amenity(a)) => Some(a.clone()),
                _ => None,
            })
            .collect())
    }

    async fn link_amenity(&self, place_id: &str, amenity_id: &str) -> Result<bool, StorageError> {
        let mut map = self.index.write().await;
        if !map.contains_key(&Kind::Amenity.key(amenity_id)) {
            return Err(StorageError::not_found(Kind::Amenity, amenity_id));
        }
        let place = map
            .get_mut(&Kind::Place.key(place_id))
            .and_then(Object::as_place_mut)
            .ok_or_else(|| StorageError::not_found(Kind::Place, place_id))?;
        Ok(place.add_amenity(amenity_id))
    }

    async fn unlink_amenity(&self, place_id: &str, amenity_id: &str) -> Result<bool, StorageError> {
        let mut map = self.index.write().await;
        let place = map
            .get_mut(&Kind::Place.key(place_id))
            .and_then(Object::as_place_mut)
            .ok_or_else(|| StorageError::not_found(Kind::Place, place_id))?;
        Ok(place.remove_amenity(amenity_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::index::new_index;
    use models::{City, Place, State, User};
    use serde_json::json;

    fn storage_in(dir: &tempfile::TempDir) -> FileStorage {
        FileStorage::open(dir.path().join("file.json"), new_index())
    }

    #[tokio::test]
    async fn new_is_visible_before_save() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = storage_in(&dir);
        let state: Object = State::new("Oregon")?.into();
        store.new(state.clone()).await?;

        assert_eq!(store.get(Kind::State, state.id()).await?, Some(state.clone()));
        assert_eq!(store.count(Some(Kind::State)).await?, 1);
        assert!(!store.path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn save_then_reload_restores_exact_objects() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = storage_in(&dir);
        let mut user = User::new("betty@hbnb.io", "pwd")?;
        user.first_name = Some("Betty".into());
        store.new(user.clone().into()).await?;
        store.save().await?;

        let fresh = FileStorage::open(store.path(), new_index());
        fresh.reload().await?;
        let loaded = fresh.get(Kind::User, &user.base.id).await?;
        assert_eq!(loaded.and_then(|o| User::try_from(o).ok()), Some(user));
        Ok(())
    }

    #[tokio::test]
    async fn document_is_keyed_by_kind_and_id() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = storage_in(&dir);
        let state = State::new("Utah")?;
        store.new(state.clone().into()).await?;
        store.save().await?;

        let raw: Value = serde_json::from_slice(&std::fs::read(store.path())?)?;
        let record = &raw[format!("State.{}", state.base.id)];
        assert_eq!(record["__class__"], json!("State"));
        assert_eq!(record["name"], json!("Utah"));
        Ok(())
    }

    #[tokio::test]
    async fn reload_without_document_is_noop() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = storage_in(&dir);
        store.new(State::new("Idaho")?.into()).await?;
        store.reload().await?;
        assert_eq!(store.count(None).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn reload_skips_unknown_kinds() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("file.json");
        let a: Object = State::new("Ohio")?.into();
        let b: Object = State::new("Iowa")?.into();
        let mut doc = Map::new();
        doc.insert(a.key(), Value::Object(a.to_dict()?));
        doc.insert(b.key(), Value::Object(b.to_dict()?));
        doc.insert("Spaceship.1".into(), json!({"__class__": "Spaceship", "id": "1"}));
        doc.insert("junk".into(), json!(42));
        std::fs::write(&path, serde_json::to_vec(&doc)?)?;

        let store = FileStorage::open(&path, new_index());
        store.reload().await?;
        assert_eq!(store.count(None).await?, 2);
        assert!(store.get(Kind::State, a.id()).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_document_keeps_current_index() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = storage_in(&dir);
        store.new(State::new("Maine")?.into()).await?;
        std::fs::write(store.path(), b"[1, 2, 3]")?;

        assert!(matches!(store.reload().await, Err(StorageError::Serialization(_))));
        assert_eq!(store.count(None).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_leaves_no_partial_file() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("file.json");
        std::fs::create_dir(&path)?;
        let store = FileStorage::open(&path, new_index());
        store.new(State::new("Texas")?.into()).await?;

        assert!(matches!(store.save().await, Err(StorageError::Durability(_))));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())?
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
        assert!(path.is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn overwrite_publishes_complete_document() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = storage_in(&dir);
        store.write_atomically(b"{\"first\": {}}".to_vec()).await?;
        store.write_atomically(b"{}".to_vec()).await?;
        assert_eq!(std::fs::read(store.path())?, b"{}".to_vec());

        let names: Vec<String> = std::fs::read_dir(dir.path())?
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["file.json".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn deleting_amenity_strips_place_edges() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = storage_in(&dir);
        let wifi: Object = models::Amenity::new("Wifi")?.into();
        let place = Place::new("c1", "u1", "Loft")?;
        store.new(wifi.clone()).await?;
        store.new(place.clone().into()).await?;
        assert!(store.link_amenity(&place.base.id, wifi.id()).await?);
        assert!(!store.link_amenity(&place.base.id, wifi.id()).await?);

        store.delete(&wifi).await?;
        let stored = store.get(Kind::Place, &place.base.id).await?;
        assert_eq!(stored.as_ref().and_then(Object::as_place).map(|p| p.amenity_ids.len()), Some(0));
        assert!(store.place_amenities(&place.base.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn link_requires_both_ends() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = storage_in(&dir);
        let place = Place::new("c1", "u1", "Loft")?;
        store.new(place.clone().into()).await?;
        assert!(matches!(store.link_amenity(&place.base.id, "nope").await, Err(StorageError::NotFound(_))));
        assert!(matches!(store.unlink_amenity("nope", "nope").await, Err(StorageError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn children_follow_foreign_keys() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = storage_in(&dir);
        let state = State::new("Nevada")?;
        let reno = City::new(&state.base.id, "Reno")?;
        let elsewhere = City::new("other-state", "Boise")?;
        for obj in [Object::from(state.clone()), reno.clone().into(), elsewhere.into()] {
            store.new(obj).await?;
        }
        let cities = store.find_children(Kind::City, ForeignKey::StateId, &state.base.id).await?;
        assert_eq!(cities, vec![Object::from(reno)]);
        assert!(store.find_children(Kind::Amenity, ForeignKey::StateId, &state.base.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn close_keeps_live_index() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = storage_in(&dir);
        let draft: Object = State::new("Draft")?.into();
        store.new(draft.clone()).await?;

        store.close().await?;
        assert!(store.get(Kind::State, draft.id()).await?.is_some());
        Ok(())
    }
}
