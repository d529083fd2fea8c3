//! Join table for the Place <-> Amenity edge. One row per edge.
use sea_orm::{entity::prelude::*, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "place_amenity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub place_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub amenity_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Place, Amenity }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Place => Entity::belongs_to(super::places::Entity)
                .from(Column::PlaceId)
                .to(super::places::Column::Id)
                .into(),
            Relation::Amenity => Entity::belongs_to(super::amenities::Entity)
                .from(Column::AmenityId)
                .to(super::amenities::Column::Id)
                .into(),
        }
    }
}

impl Related<super::places::Entity> for Entity {
    fn to() -> RelationDef { Relation::Place.def() }
}

impl Related<super::amenities::Entity> for Entity {
    fn to() -> RelationDef { Relation::Amenity.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn edge(place_id: &str, amenity_id: &str) -> ActiveModel {
    ActiveModel { place_id: Set(place_id.to_string()), amenity_id: Set(amenity_id.to_string()) }
}
