use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use configs::DatabaseConfig;
use migration::MigratorTrait;
use models::{
    db::connect_with_config,
    schema::{amenities, cities, place_amenity, places, reviews, states, users},
    Amenity, City, ForeignKey, Kind, Object, Review, State, User,
};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, JoinType, IntoActiveModel, PaginatorTrait, PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    TransactionTrait,
};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{backend::StorageBackend, errors::StorageError};

/// Relational backend.
///
/// Every operation runs inside one lazily opened transaction. `save` commits
/// it, `close` rolls it back, and a failed write rolls it back on the spot so
/// a session never holds half of a change.
pub struct DbStorage {
    db: DatabaseConnection,
    session: Mutex<Option<DatabaseTransaction>>,
    reset_schema: AtomicBool,
}

impl DbStorage {
    /// Wrap an open connection. With `reset_schema`, the first `reload`
    /// drops and recreates every table.
    pub fn with_connection(db: DatabaseConnection, reset_schema: bool) -> Self {
        Self { db, session: Mutex::new(None), reset_schema: AtomicBool::new(reset_schema) }
    }

    pub async fn connect(cfg: &DatabaseConfig, reset_schema: bool) -> Result<Self, StorageError> {
        let db = connect_with_config(cfg).await?;
        Ok(Self::with_connection(db, reset_schema))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn session(&self) -> Result<MappedMutexGuard<'_, DatabaseTransaction>, StorageError> {
        let mut guard = self.session.lock().await;
        if guard.is_none() {
            *guard = Some(self.db.begin().await?);
            debug!("db: session opened");
        }
        MutexGuard::try_map(guard, Option::as_mut)
            .map_err(|_| StorageError::Durability("no open session".to_string()))
    }

    /// Roll back after a failed write; the caller reports the original error.
    async fn abort(&self) {
        if let Some(txn) = self.session.lock().await.take() {
            match txn.rollback().await {
                Ok(()) => warn!("db: session rolled back after failed write"),
                Err(e) => warn!(error = %e, "db: rollback after failed write also failed"),
            }
        }
    }

    async fn guarded<T>(&self, result: Result<T, StorageError>) -> Result<T, StorageError> {
        if result.is_err() {
            self.abort().await;
        }
        result
    }
}

/// Insert the row, or overwrite every column when the id is already stored.
async fn upsert<A, C>(conn: &C, id: &str, am: A) -> Result<(), StorageError>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    <<A::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType: From<String>,
{
    let exists = A::Entity::find_by_id(id.to_string()).one(conn).await?.is_some();
    if exists {
        match am.update(conn).await {
            // unchanged rows report zero affected on some drivers
            Ok(_) | Err(DbErr::RecordNotUpdated) => {}
            Err(e) => return Err(e.into()),
        }
    } else {
        A::Entity::insert(am).exec_without_returning(conn).await?;
    }
    Ok(())
}

async fn write_object<C: ConnectionTrait>(conn: &C, obj: &Object) -> Result<(), StorageError> {
    let id = obj.id();
    match obj {
        Object::State(v) => upsert(conn, id, states::ActiveModel::from(v)).await,
        Object::City(v) => upsert(conn, id, cities::ActiveModel::from(v)).await,
        Object::User(v) => upsert(conn, id, users::ActiveModel::from(v)).await,
        Object::Place(v) => {
            upsert(conn, id, places::ActiveModel::from(v)).await?;
            sync_edges(conn, id, &v.amenity_ids).await
        }
        Object::Review(v) => upsert(conn, id, reviews::ActiveModel::from(v)).await,
        Object::Amenity(v) => upsert(conn, id, amenities::ActiveModel::from(v)).await,
    }
}

/// Make the join rows of `place_id` match `amenity_ids` exactly.
async fn sync_edges<C: ConnectionTrait>(conn: &C, place_id: &str, amenity_ids: &[String]) -> Result<(), StorageError> {
    place_amenity::Entity::delete_many()
        .filter(place_amenity::Column::PlaceId.eq(place_id))
        .filter(place_amenity::Column::AmenityId.is_not_in(amenity_ids.iter().cloned()))
        .exec(conn)
        .await?;
    for amenity_id in amenity_ids {
        link(conn, place_id, amenity_id).await?;
    }
    Ok(())
}

async fn remove_object<C: ConnectionTrait>(conn: &C, obj: &Object) -> Result<u64, StorageError> {
    let id = obj.id().to_string();
    let res = match obj.kind() {
        Kind::State => states::Entity::delete_by_id(id).exec(conn).await?,
        Kind::City => cities::Entity::delete_by_id(id).exec(conn).await?,
        Kind::User => users::Entity::delete_by_id(id).exec(conn).await?,
        Kind::Review => reviews::Entity::delete_by_id(id).exec(conn).await?,
        Kind::Place => {
            place_amenity::Entity::delete_many()
                .filter(place_amenity::Column::PlaceId.eq(id.as_str()))
                .exec(conn)
                .await?;
            places::Entity::delete_by_id(id).exec(conn).await?
        }
        Kind::Amenity => {
            place_amenity::Entity::delete_many()
                .filter(place_amenity::Column::AmenityId.eq(id.as_str()))
                .exec(conn)
                .await?;
            amenities::Entity::delete_by_id(id).exec(conn).await?
        }
    };
    Ok(res.rows_affected)
}

/// Attach each place's amenity ids from the join table.
async fn with_edges<C: ConnectionTrait>(conn: &C, rows: Vec<places::Model>) -> Result<Vec<Object>, StorageError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = rows.iter().map(|m| m.id.clone()).collect();
    let edges = place_amenity::Entity::find()
        .filter(place_amenity::Column::PlaceId.is_in(ids))
        .order_by_asc(place_amenity::Column::AmenityId)
        .all(conn)
        .await?;
    let mut by_place: HashMap<String, Vec<String>> = HashMap::new();
    for edge in edges {
        by_place.entry(edge.place_id).or_default().push(edge.amenity_id);
    }
    Ok(rows
        .into_iter()
        .map(|m| {
            let amenity_ids = by_place.remove(&m.id).unwrap_or_default();
            Object::Place(m.into_place(amenity_ids))
        })
        .collect())
}

async fn load_kind<C: ConnectionTrait>(conn: &C, kind: Kind) -> Result<Vec<Object>, StorageError> {
    Ok(match kind {
        Kind::State => states::Entity::find().all(conn).await?.into_iter().map(|m| State::from(m).into()).collect(),
        Kind::City => cities::Entity::find().all(conn).await?.into_iter().map(|m| City::from(m).into()).collect(),
        Kind::User => users::Entity::find().all(conn).await?.into_iter().map(|m| User::from(m).into()).collect(),
        Kind::Review => reviews::Entity::find().all(conn).await?.into_iter().map(|m| Review::from(m).into()).collect(),
        Kind::Amenity => {
            amenities::Entity::find().all(conn).await?.into_iter().map(|m| Amenity::from(m).into()).collect()
        }
        Kind::Place => with_edges(conn, places::Entity::find().all(conn).await?).await?,
    })
}

async fn count_kind<C: ConnectionTrait>(conn: &C, kind: Kind) -> Result<u64, StorageError> {
    Ok(match kind {
        Kind::State => states::Entity::find().count(conn).await?,
        Kind::City => cities::Entity::find().count(conn).await?,
        Kind::User => users::Entity::find().count(conn).await?,
        Kind::Place => places::Entity::find().count(conn).await?,
        Kind::Review => reviews::Entity::find().count(conn).await?,
        Kind::Amenity => amenities::Entity::find().count(conn).await?,
    })
}

async fn exists<C: ConnectionTrait>(conn: &C, kind: Kind, id: &str) -> Result<bool, StorageError> {
    let id = id.to_string();
    Ok(match kind {
        Kind::Place => places::Entity::find_by_id(id).one(conn).await?.is_some(),
        Kind::Amenity => amenities::Entity::find_by_id(id).one(conn).await?.is_some(),
        other => load_one(conn, other, &id).await?.is_some(),
    })
}

async fn load_one<C: ConnectionTrait>(conn: &C, kind: Kind, id: &str) -> Result<Option<Object>, StorageError> {
    let id = id.to_string();
    Ok(match kind {
        Kind::State => states::Entity::find_by_id(id).one(conn).await?.map(|m| State::from(m).into()),
        Kind::City => cities::Entity::find_by_id(id).one(conn).await?.map(|m| City::from(m).into()),
        Kind::User => users::Entity::find_by_id(id).one(conn).await?.map(|m| User::from(m).into()),
        Kind::Review => reviews::Entity::find_by_id(id).one(conn).await?.map(|m| Review::from(m).into()),
        Kind::Amenity => amenities::Entity::find_by_id(id).one(conn).await?.map(|m| Amenity::from(m).into()),
        Kind::Place => {
            let rows = places::Entity::find_by_id(id).all(conn).await?;
            with_edges(conn, rows).await?.into_iter().next()
        }
    })
}

async fn link<C: ConnectionTrait>(conn: &C, place_id: &str, amenity_id: &str) -> Result<bool, StorageError> {
    if !exists(conn, Kind::Place, place_id).await? {
        return Err(StorageError::not_found(Kind::Place, place_id));
    }
    if !exists(conn, Kind::Amenity, amenity_id).await? {
        return Err(StorageError::not_found(Kind::Amenity, amenity_id));
    }
    let present = place_amenity::Entity::find_by_id((place_id.to_string(), amenity_id.to_string()))
        .one(conn)
        .await?
        .is_some();
    if present {
        return Ok(false);
    }
    place_amenity::Entity::insert(place_amenity::edge(place_id, amenity_id))
        .exec_without_returning(conn)
        .await?;
    Ok(true)
}

async fn unlink<C: ConnectionTrait>(conn: &C, place_id: &str, amenity_id: &str) -> Result<bool, StorageError> {
    if !exists(conn, Kind::Place, place_id).await? {
        return Err(StorageError::not_found(Kind::Place, place_id));
    }
    let res = place_amenity::Entity::delete_many()
        .filter(place_amenity::Column::PlaceId.eq(place_id))
        .filter(place_amenity::Column::AmenityId.eq(amenity_id))
        .exec(conn)
        .await?;
    Ok(res.rows_affected > 0)
}

#[async_trait]
impl StorageBackend for DbStorage {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn all(&self, kind: Option<Kind>) -> Result<HashMap<String, Object>, StorageError> {
        let txn = self.session().await?;
        let kinds = kind.map_or_else(|| Kind::ALL.to_vec(), |k| vec![k]);
        let mut out = HashMap::new();
        for k in kinds {
            for obj in load_kind(&*txn, k).await? {
                out.insert(obj.key(), obj);
            }
        }
        Ok(out)
    }

    async fn get(&self, kind: Kind, id: &str) -> Result<Option<Object>, StorageError> {
        let txn = self.session().await?;
        load_one(&*txn, kind, id).await
    }

    async fn count(&self, kind: Option<Kind>) -> Result<usize, StorageError> {
        let txn = self.session().await?;
        let kinds = kind.map_or_else(|| Kind::ALL.to_vec(), |k| vec![k]);
        let mut total = 0u64;
        for k in kinds {
            total += count_kind(&*txn, k).await?;
        }
        Ok(total as usize)
    }

    async fn new(&self, obj: Object) -> Result<(), StorageError> {
        let result = {
            let txn = self.session().await?;
            write_object(&*txn, &obj).await
        };
        if result.is_ok() {
            debug!(key = %obj.key(), "db: staged");
        }
        self.guarded(result).await
    }

    async fn save(&self) -> Result<(), StorageError> {
        let Some(txn) = self.session.lock().await.take() else {
            return Ok(());
        };
        txn.commit().await?;
        info!("db: session committed");
        Ok(())
    }

    async fn delete(&self, obj: &Object) -> Result<(), StorageError> {
        let result = {
            let txn = self.session().await?;
            remove_object(&*txn, obj).await
        };
        if let Ok(rows) = result {
            debug!(key = %obj.key(), rows, "db: delete staged");
        }
        self.guarded(result).await.map(|_| ())
    }

    async fn reload(&self) -> Result<(), StorageError> {
        self.close().await?;
        if self.reset_schema.swap(false, Ordering::SeqCst) {
            migration::Migrator::fresh(&self.db).await?;
            info!("db: schema recreated");
        } else {
            migration::Migrator::up(&self.db, None).await?;
            debug!("db: schema up to date");
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        if let Some(txn) = self.session.lock().await.take() {
            txn.rollback().await?;
            debug!("db: session rolled back");
        }
        Ok(())
    }

    async fn find_children(&self, kind: Kind, fk: ForeignKey, owner_id: &str) -> Result<Vec<Object>, StorageError> {
        let txn = self.session().await?;
        let conn = &*txn;
        Ok(match (kind, fk) {
            (Kind::City, ForeignKey::StateId) => cities::Entity::find()
                .filter(cities::Column::StateId.eq(owner_id))
                .all(conn)
                .await?
                .into_iter()
                .map(|m| City::from(m).into())
                .collect(),
            (Kind::Place, ForeignKey::CityId | ForeignKey::UserId) => {
                let column = match fk {
                    ForeignKey::CityId => places::Column::CityId,
                    _ => places::Column::UserId,
                };
                let rows = places::Entity::find().filter(column.eq(owner_id)).all(conn).await?;
                with_edges(conn, rows).await?
            }
            (Kind::Review, ForeignKey::PlaceId | ForeignKey::UserId) => {
                let column = match fk {
                    ForeignKey::PlaceId => reviews::Column::PlaceId,
                    _ => reviews::Column::UserId,
                };
                reviews::Entity::find()
                    .filter(column.eq(owner_id))
                    .all(conn)
                    .await?
                    .into_iter()
                    .map(|m| Review::from(m).into())
                    .collect()
            }
            _ => Vec::new(),
        })
    }

    async fn place_amenities(&self, place_id: &str) -> Result<Vec<Amenity>, StorageError> {
        let txn = self.session().await?;
        let rows = amenities::Entity::find()
            .join(JoinType::InnerJoin, amenities::Relation::PlaceAmenity.def())
            .filter(place_amenity::Column::PlaceId.eq(place_id))
            .order_by_asc(amenities::Column::Id)
            .all(&*txn)
            .await?;
        Ok(rows.into_iter().map(Amenity::from).collect())
    }

    async fn link_amenity(&self, place_id: &str, amenity_id: &str) -> Result<bool, StorageError> {
        let result = {
            let txn = self.session().await?;
            link(&*txn, place_id, amenity_id).await
        };
        match result {
            // lookups that find nothing leave the session intact
            Err(StorageError::NotFound(_)) => result,
            _ => self.guarded(result).await,
        }
    }

    async fn unlink_amenity(&self, place_id: &str, amenity_id: &str) -> Result<bool, StorageError> {
        let result = {
            let txn = self.session().await?;
            unlink(&*txn, place_id, amenity_id).await
        };
        match result {
            Err(StorageError::NotFound(_)) => result,
            _ => self.guarded(result).await,
        }
    }
}
