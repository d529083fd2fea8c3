use std::{fmt, str::FromStr};

use crate::errors::ModelError;

/// Name of the discriminator field in serialized records.
pub const CLASS_FIELD: &str = "__class__";

/// The six entity kinds the storage layer knows how to rebuild.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    State,
    City,
    User,
    Place,
    Review,
    Amenity,
}

impl Kind {
    pub const ALL: [Kind; 6] = [Kind::State, Kind::City, Kind::User, Kind::Place, Kind::Review, Kind::Amenity];

    /// Discriminator value, also the prefix of storage keys.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::State => "State",
            Kind::City => "City",
            Kind::User => "User",
            Kind::Place => "Place",
            Kind::Review => "Review",
            Kind::Amenity => "Amenity",
        }
    }

    /// Storage key `"Kind.id"`.
    pub fn key(&self, id: &str) -> String {
        format!("{}.{}", self.name(), id)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ModelError::UnknownKind(s.to_string()))
    }
}

/// Foreign-key attributes backing the one-to-many edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ForeignKey {
    StateId,
    CityId,
    UserId,
    PlaceId,
}

impl ForeignKey {
    pub fn field(&self) -> &'static str {
        match self {
            ForeignKey::StateId => "state_id",
            ForeignKey::CityId => "city_id",
            ForeignKey::UserId => "user_id",
            ForeignKey::PlaceId => "place_id",
        }
    }

    /// Whether entities of `kind` carry this key.
    pub fn applies_to(&self, kind: Kind) -> bool {
        matches!(
            (kind, self),
            (Kind::City, ForeignKey::StateId)
                | (Kind::Place, ForeignKey::CityId)
                | (Kind::Place, ForeignKey::UserId)
                | (Kind::Review, ForeignKey::PlaceId)
                | (Kind::Review, ForeignKey::UserId)
        )
    }
}
