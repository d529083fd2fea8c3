use std::hash::{Hash, Hasher};

use serde_json::{Map, Value};

use crate::{
    amenity::Amenity,
    attrs,
    base::BaseModel,
    city::City,
    errors::ModelError,
    kind::{ForeignKey, Kind, CLASS_FIELD},
    place::Place,
    review::Review,
    state::State,
    user::User,
};

/// Any live entity held by a storage backend.
///
/// Two objects are equal when they share kind and id, whatever their
/// attributes; compare the inner structs for attribute equality.
#[derive(Clone, Debug)]
pub enum Object {
    State(State),
    City(City),
    User(User),
    Place(Place),
    Review(Review),
    Amenity(Amenity),
}

macro_rules! each_kind {
    ($obj:expr, $inner:ident => $body:expr) => {
        match $obj {
            Object::State($inner) => $body,
            Object::City($inner) => $body,
            Object::User($inner) => $body,
            Object::Place($inner) => $body,
            Object::Review($inner) => $body,
            Object::Amenity($inner) => $body,
        }
    };
}

impl Object {
    pub fn kind(&self) -> Kind {
        match self {
            Object::State(_) => Kind::State,
            Object::City(_) => Kind::City,
            Object::User(_) => Kind::User,
            Object::Place(_) => Kind::Place,
            Object::Review(_) => Kind::Review,
            Object::Amenity(_) => Kind::Amenity,
        }
    }

    pub fn base(&self) -> &BaseModel {
        each_kind!(self, o => &o.base)
    }

    pub fn base_mut(&mut self) -> &mut BaseModel {
        each_kind!(self, o => &mut o.base)
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    /// Storage key `"Kind.id"`.
    pub fn key(&self) -> String {
        self.kind().key(self.id())
    }

    pub fn touch(&mut self) {
        self.base_mut().touch();
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        each_kind!(self, o => o.validate())
    }

    /// Value of a foreign-key attribute, when this kind has it.
    pub fn foreign_key(&self, fk: ForeignKey) -> Option<&str> {
        match (self, fk) {
            (Object::City(c), ForeignKey::StateId) => Some(&c.state_id),
            (Object::Place(p), ForeignKey::CityId) => Some(&p.city_id),
            (Object::Place(p), ForeignKey::UserId) => Some(&p.user_id),
            (Object::Review(r), ForeignKey::PlaceId) => Some(&r.place_id),
            (Object::Review(r), ForeignKey::UserId) => Some(&r.user_id),
            _ => None,
        }
    }

    /// All public attributes plus `__class__`, timestamps as ISO text.
    pub fn to_dict(&self) -> Result<Map<String, Value>, ModelError> {
        let value = each_kind!(self, o => serde_json::to_value(o))
            .map_err(|e| ModelError::Serialization(e.to_string()))?;
        let Value::Object(mut map) = value else {
            return Err(ModelError::Serialization(format!("{} did not serialize to an object", self.kind())));
        };
        map.insert(CLASS_FIELD.to_string(), Value::String(self.kind().name().to_string()));
        Ok(map)
    }

    /// Reconstruction path: rebuild an entity from a record written by
    /// `to_dict`, keeping its id and timestamps.
    pub fn from_dict(record: &Map<String, Value>) -> Result<Self, ModelError> {
        let class = record
            .get(CLASS_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::required(CLASS_FIELD))?;
        let kind: Kind = class.parse()?;
        Self::decode(kind, Value::Object(record.clone()))
    }

    /// Fresh entity of `kind` from caller-supplied attributes. Identity keys
    /// in `input` are ignored; foreign keys are accepted here and only here.
    pub fn create(kind: Kind, input: &Map<String, Value>) -> Result<Self, ModelError> {
        let mut record: Map<String, Value> = input
            .iter()
            .filter(|(k, _)| !attrs::PROTECTED.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let base = serde_json::to_value(BaseModel::new()).map_err(|e| ModelError::Serialization(e.to_string()))?;
        if let Value::Object(base) = base {
            record.extend(base);
        }
        let obj = Self::decode(kind, Value::Object(record))
            .map_err(|e| ModelError::Validation(e.to_string()))?;
        obj.validate()?;
        Ok(obj)
    }

    /// Apply an update through the kind's allow-list. Identity keys, foreign
    /// keys and unknown keys are ignored; a value of the wrong type rejects
    /// the whole update and leaves `self` unchanged. Timestamps are not touched.
    pub fn update(&mut self, input: &Map<String, Value>) -> Result<(), ModelError> {
        let mut next = self.clone();
        for (key, value) in input {
            if attrs::PROTECTED.contains(&key.as_str()) {
                continue;
            }
            each_kind!(&mut next, o => o.assign(key, value))?;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn decode(kind: Kind, value: Value) -> Result<Self, ModelError> {
        let obj = match kind {
            Kind::State => serde_json::from_value(value).map(Object::State),
            Kind::City => serde_json::from_value(value).map(Object::City),
            Kind::User => serde_json::from_value(value).map(Object::User),
            Kind::Place => serde_json::from_value(value).map(Object::Place),
            Kind::Review => serde_json::from_value(value).map(Object::Review),
            Kind::Amenity => serde_json::from_value(value).map(Object::Amenity),
        };
        obj.map_err(|e| ModelError::Serialization(format!("{kind}: {e}")))
    }

    pub fn as_place(&self) -> Option<&Place> {
        match self { Object::Place(p) => Some(p), _ => None }
    }

    pub fn as_place_mut(&mut self) -> Option<&mut Place> {
        match self { Object::Place(p) => Some(p), _ => None }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.id() == other.id()
    }
}

impl Eq for Object {}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.id().hash(state);
    }
}

macro_rules! into_object {
    ($($ty:ident),*) => {
        $(impl From<$ty> for Object {
            fn from(v: $ty) -> Self { Object::$ty(v) }
        }

        impl TryFrom<Object> for $ty {
            type Error = Object;

            fn try_from(obj: Object) -> Result<Self, Object> {
                match obj {
                    Object::$ty(v) => Ok(v),
                    other => Err(other),
                }
            }
        })*
    };
}

into_object!(State, City, User, Place, Review, Amenity);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn to_dict_carries_discriminator_and_iso_timestamps() -> Result<(), ModelError> {
        let state: Object = State::new("California")?.into();
        let dict = state.to_dict()?;
        assert_eq!(dict.get("__class__"), Some(&json!("State")));
        assert_eq!(dict.get("name"), Some(&json!("California")));
        let created = dict.get("created_at").and_then(Value::as_str).unwrap_or_default();
        assert_eq!(created, crate::base::format_time(&state.base().created_at));
        Ok(())
    }

    #[test]
    fn reconstruction_keeps_identity() -> Result<(), ModelError> {
        let mut place = Place::new("c1", "u1", "Loft")?;
        place.latitude = Some(37.77);
        place.add_amenity("a1");
        let original: Object = place.clone().into();
        let rebuilt = Object::from_dict(&original.to_dict()?)?;
        assert_eq!(rebuilt.as_place(), Some(&place));
        Ok(())
    }

    #[test]
    fn unknown_discriminator_is_reported() {
        let record = map(json!({"__class__": "Spaceship", "id": "x"}));
        assert!(matches!(Object::from_dict(&record), Err(ModelError::UnknownKind(k)) if k == "Spaceship"));
    }

    #[test]
    fn create_ignores_supplied_identity() -> Result<(), ModelError> {
        let attrs = map(json!({"id": "forged", "created_at": "2001-01-01T00:00:00", "name": "Wifi"}));
        let amenity = Object::create(Kind::Amenity, &attrs)?;
        assert_ne!(amenity.id(), "forged");
        assert_eq!(amenity.base().created_at, amenity.base().updated_at);
        Ok(())
    }

    #[test]
    fn amenity_ids_never_repeat() -> Result<(), ModelError> {
        let attrs = map(json!({"city_id": "c", "user_id": "u", "name": "L", "amenity_ids": ["a", "a", "b"]}));
        let created = Object::create(Kind::Place, &attrs)?;
        assert_eq!(created.as_place().map(|p| p.amenity_ids.clone()), Some(vec!["a".to_string(), "b".to_string()]));

        let mut record = created.to_dict()?;
        record.insert("amenity_ids".into(), json!(["b", "b"]));
        let mut rebuilt = Object::from_dict(&record)?;
        assert_eq!(rebuilt.as_place().map(|p| p.amenity_ids.len()), Some(1));
        if let Object::Place(place) = &mut rebuilt {
            assert!(!place.add_amenity("b"));
            assert!(place.remove_amenity("b"));
            assert!(place.amenity_ids.is_empty());
        }
        Ok(())
    }

    #[test]
    fn create_requires_mandatory_fields() {
        assert!(Object::create(Kind::User, &map(json!({"email": "a@b.c"}))).is_err());
        assert!(Object::create(Kind::City, &map(json!({"name": "SF"}))).is_err());
        assert!(Object::create(Kind::State, &map(json!({"name": ""}))).is_err());
    }

    #[test]
    fn update_applies_allow_list_only() -> Result<(), ModelError> {
        let mut obj: Object = Place::new("c1", "u1", "Loft")?.into();
        let id = obj.id().to_string();
        obj.update(&map(json!({
            "id": "other",
            "city_id": "c2",
            "user_id": "u2",
            "name": "Big Loft",
            "max_guest": 6,
            "favourite_colour": "blue"
        })))?;
        let place = obj.as_place().cloned().expect("place");
        assert_eq!(obj.id(), id);
        assert_eq!(place.city_id, "c1");
        assert_eq!(place.user_id, "u1");
        assert_eq!(place.name, "Big Loft");
        assert_eq!(place.max_guest, 6);
        Ok(())
    }

    #[test]
    fn rejected_update_leaves_object_untouched() -> Result<(), ModelError> {
        let mut obj: Object = Place::new("c1", "u1", "Loft")?.into();
        let err = obj.update(&map(json!({"name": "Renamed", "price_by_night": "cheap"})));
        assert!(matches!(err, Err(ModelError::Validation(_))));
        assert_eq!(obj.as_place().map(|p| p.name.as_str()), Some("Loft"));
        Ok(())
    }

    #[test]
    fn equality_is_by_identity() -> Result<(), ModelError> {
        let state = State::new("Nevada")?;
        let mut renamed = state.clone();
        renamed.name = "Arizona".into();
        assert_eq!(Object::from(state.clone()), Object::from(renamed));
        assert_ne!(Object::from(state), Object::from(State::new("Nevada")?));
        Ok(())
    }
}
