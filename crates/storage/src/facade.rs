use std::{collections::HashMap, future::Future, sync::Arc};

use configs::{StorageConfig, StorageKind};
use models::{Amenity, City, ForeignKey, Kind, Object, Place, Review, State, User};
use tracing::{debug, info, instrument};

use crate::{
    backend::StorageBackend,
    db::DbStorage,
    errors::StorageError,
    file::{new_index, FileStorage},
};

/// Process-wide entry point to persistence.
///
/// The backend is picked once, at construction; callers never branch on it.
/// Cloning is cheap and every clone talks to the same backend.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
}

impl Storage {
    pub fn from_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Build the backend named by configuration. Nothing is loaded until `reload`.
    pub async fn from_config(cfg: &StorageConfig) -> Result<Self, StorageError> {
        cfg.validate().map_err(|e| StorageError::Config(e.to_string()))?;
        let backend: Arc<dyn StorageBackend> = match cfg.kind {
            StorageKind::File => Arc::new(FileStorage::open(&cfg.file.path, new_index())),
            StorageKind::Db => Arc::new(DbStorage::connect(&cfg.database, cfg.is_test_env()).await?),
        };
        info!(backend = backend.name(), env = %cfg.env, "storage_ready");
        Ok(Self::from_backend(backend))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn all(&self, kind: Option<Kind>) -> Result<HashMap<String, Object>, StorageError> {
        self.backend.all(kind).await
    }

    pub async fn get(&self, kind: Kind, id: &str) -> Result<Option<Object>, StorageError> {
        self.backend.get(kind, id).await
    }

    pub async fn count(&self, kind: Option<Kind>) -> Result<usize, StorageError> {
        self.backend.count(kind).await
    }

    /// Register an entity; an entity with the same kind and id is replaced.
    #[instrument(skip(self, obj), fields(key = %obj.key()))]
    pub async fn new(&self, obj: Object) -> Result<(), StorageError> {
        obj.validate()?;
        self.backend.new(obj).await
    }

    pub async fn save(&self) -> Result<(), StorageError> {
        self.backend.save().await
    }

    /// Remove an entity and its amenity edges. Dependents stay where they are.
    #[instrument(skip(self, obj), fields(key = %obj.key()))]
    pub async fn delete(&self, obj: &Object) -> Result<(), StorageError> {
        self.backend.delete(obj).await
    }

    pub async fn reload(&self) -> Result<(), StorageError> {
        self.backend.reload().await
    }

    pub async fn close(&self) -> Result<(), StorageError> {
        self.backend.close().await
    }

    /// Entity-level save: bump `updated_at`, register, commit.
    #[instrument(skip(self, obj), fields(key = %obj.key()))]
    pub async fn persist(&self, obj: &mut Object) -> Result<(), StorageError> {
        obj.touch();
        self.new(obj.clone()).await?;
        self.save().await?;
        debug!(updated_at = %obj.base().updated_at, "persisted");
        Ok(())
    }

    /// Run `f` as one request scope; `close` runs afterwards on every path.
    /// The error from `f` wins over a failing `close`.
    pub async fn scoped<F, Fut, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(Storage) -> Fut,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        let result = f(self.clone()).await;
        let closed = self.close().await;
        match (result, closed) {
            (Ok(v), Ok(())) => Ok(v),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), _) => Err(e),
        }
    }

    pub async fn cities(&self, state: &State) -> Result<Vec<City>, StorageError> {
        self.children(Kind::City, ForeignKey::StateId, &state.base.id).await
    }

    pub async fn places(&self, city: &City) -> Result<Vec<Place>, StorageError> {
        self.children(Kind::Place, ForeignKey::CityId, &city.base.id).await
    }

    pub async fn reviews(&self, place: &Place) -> Result<Vec<Review>, StorageError> {
        self.children(Kind::Review, ForeignKey::PlaceId, &place.base.id).await
    }

    pub async fn user_places(&self, user: &User) -> Result<Vec<Place>, StorageError> {
        self.children(Kind::Place, ForeignKey::UserId, &user.base.id).await
    }

    pub async fn user_reviews(&self, user: &User) -> Result<Vec<Review>, StorageError> {
        self.children(Kind::Review, ForeignKey::UserId, &user.base.id).await
    }

    /// Amenities linked to `place`, oldest first.
    pub async fn amenities(&self, place: &Place) -> Result<Vec<Amenity>, StorageError> {
        let mut amenities = self.backend.place_amenities(&place.base.id).await?;
        amenities.sort_by(|a, b| (a.base.created_at, &a.base.id).cmp(&(b.base.created_at, &b.base.id)));
        Ok(amenities)
    }

    /// `false` when the edge already existed.
    #[instrument(skip_all, fields(place = %place.base.id, amenity = %amenity.base.id))]
    pub async fn link_amenity(&self, place: &Place, amenity: &Amenity) -> Result<bool, StorageError> {
        self.backend.link_amenity(&place.base.id, &amenity.base.id).await
    }

    /// `false` when there was no edge.
    #[instrument(skip_all, fields(place = %place.base.id, amenity = %amenity.base.id))]
    pub async fn unlink_amenity(&self, place: &Place, amenity: &Amenity) -> Result<bool, StorageError> {
        self.backend.unlink_amenity(&place.base.id, &amenity.base.id).await
    }

    async fn children<T>(&self, kind: Kind, fk: ForeignKey, owner_id: &str) -> Result<Vec<T>, StorageError>
    where
        T: TryFrom<Object, Error = Object>,
    {
        let mut found = self.backend.find_children(kind, fk, owner_id).await?;
        found.sort_by(|a, b| (a.base().created_at, a.id()).cmp(&(b.base().created_at, b.id())));
        Ok(found.into_iter().filter_map(|o| T::try_from(o).ok()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_storage;
    use models::BaseModel;

    fn file_storage(dir: &tempfile::TempDir) -> Storage {
        Storage::from_backend(Arc::new(FileStorage::open(dir.path().join("file.json"), new_index())))
    }

    #[tokio::test]
    async fn persist_moves_updated_at_forward() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = file_storage(&dir);
        let mut obj: Object = State::new("Oregon")?.into();
        let created = obj.base().created_at;

        storage.persist(&mut obj).await?;
        let first = obj.base().updated_at;
        storage.persist(&mut obj).await?;
        assert!(first >= created);
        assert!(obj.base().updated_at >= first);
        assert_eq!(obj.base().created_at, created);

        let stored = storage.get(Kind::State, obj.id()).await?;
        assert_eq!(stored.map(|o| o.base().updated_at), Some(obj.base().updated_at));
        Ok(())
    }

    #[tokio::test]
    async fn new_rejects_invalid_entities() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = file_storage(&dir);
        let mut state = State::new("Ohio")?;
        state.name = String::new();
        let err = storage.new(state.into()).await;
        assert!(matches!(err, Err(StorageError::Model(_))));
        assert_eq!(storage.count(None).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn scoped_closes_on_error() -> anyhow::Result<()> {
        let storage = Storage::from_backend(Arc::new(memory_storage().await?));
        let state = State::new("Draft")?;
        let id = state.base.id.clone();

        let result: Result<(), StorageError> = storage
            .scoped(|s| async move {
                s.new(state.into()).await?;
                Err(StorageError::NotFound("stop".into()))
            })
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        // the staged row was rolled back by close
        assert!(storage.get(Kind::State, &id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn accessors_return_typed_children_in_creation_order() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = file_storage(&dir);
        let state = State::new("California")?;
        let sf = City::new(&state.base.id, "San Francisco")?;
        let mut la = City::new(&state.base.id, "Los Angeles")?;
        let later = sf.base.created_at + chrono::Duration::seconds(1);
        la.base = BaseModel::restore(la.base.id.clone(), later, later);
        let user = User::new("a@b.c", "pwd")?;
        let place = Place::new(&sf.base.id, &user.base.id, "Loft")?;
        let review = Review::new(&place.base.id, &user.base.id, "Great")?;
        for obj in [
            Object::from(la.clone()),
            state.clone().into(),
            sf.clone().into(),
            user.clone().into(),
            place.clone().into(),
            review.clone().into(),
        ] {
            storage.new(obj).await?;
        }

        let names: Vec<String> = storage.cities(&state).await?.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["San Francisco".to_string(), "Los Angeles".to_string()]);
        assert_eq!(storage.places(&sf).await?, vec![place.clone()]);
        assert!(storage.places(&la).await?.is_empty());
        assert_eq!(storage.user_places(&user).await?, vec![place.clone()]);
        assert_eq!(storage.reviews(&place).await?, vec![review.clone()]);
        assert_eq!(storage.user_reviews(&user).await?, vec![review]);
        Ok(())
    }
}
