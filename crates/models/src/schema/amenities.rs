use sea_orm::{entity::prelude::*, Set};

use crate::{amenity::Amenity, base::BaseModel};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "amenities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { PlaceAmenity }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::PlaceAmenity => Entity::has_many(super::place_amenity::Entity).into() }
    }
}

impl Related<super::place_amenity::Entity> for Entity {
    fn to() -> RelationDef { Relation::PlaceAmenity.def() }
}

impl Related<super::places::Entity> for Entity {
    fn to() -> RelationDef { super::place_amenity::Relation::Place.def() }
    fn via() -> Option<RelationDef> { Some(super::place_amenity::Relation::Amenity.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Amenity {
    fn from(m: Model) -> Self {
        Amenity { base: BaseModel::restore(m.id, m.created_at, m.updated_at), name: m.name }
    }
}

impl From<&Amenity> for ActiveModel {
    fn from(a: &Amenity) -> Self {
        ActiveModel {
            id: Set(a.base.id.clone()),
            created_at: Set(a.base.created_at),
            updated_at: Set(a.base.updated_at),
            name: Set(a.name.clone()),
        }
    }
}
