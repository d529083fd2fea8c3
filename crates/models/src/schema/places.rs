use sea_orm::{entity::prelude::*, Set};

use crate::{base::BaseModel, place::Place};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "places")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub number_rooms: i32,
    pub number_bathrooms: i32,
    pub max_guest: i32,
    pub price_by_night: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { City, User, Reviews, PlaceAmenity }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::City => Entity::belongs_to(super::cities::Entity)
                .from(Column::CityId)
                .to(super::cities::Column::Id)
                .into(),
            Relation::User => Entity::belongs_to(super::users::Entity)
                .from(Column::UserId)
                .to(super::users::Column::Id)
                .into(),
            Relation::Reviews => Entity::has_many(super::reviews::Entity).into(),
            Relation::PlaceAmenity => Entity::has_many(super::place_amenity::Entity).into(),
        }
    }
}

impl Related<super::cities::Entity> for Entity {
    fn to() -> RelationDef { Relation::City.def() }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef { Relation::Reviews.def() }
}

impl Related<super::place_amenity::Entity> for Entity {
    fn to() -> RelationDef { Relation::PlaceAmenity.def() }
}

impl Related<super::amenities::Entity> for Entity {
    fn to() -> RelationDef { super::place_amenity::Relation::Amenity.def() }
    fn via() -> Option<RelationDef> { Some(super::place_amenity::Relation::Place.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Domain value; edges live in `place_amenity` and are supplied by the caller.
    pub fn into_place(self, amenity_ids: Vec<String>) -> Place {
        Place {
            base: BaseModel::restore(self.id, self.created_at, self.updated_at),
            city_id: self.city_id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            number_rooms: self.number_rooms,
            number_bathrooms: self.number_bathrooms,
            max_guest: self.max_guest,
            price_by_night: self.price_by_night,
            latitude: self.latitude,
            longitude: self.longitude,
            amenity_ids,
        }
    }
}

impl From<&Place> for ActiveModel {
    fn from(p: &Place) -> Self {
        ActiveModel {
            id: Set(p.base.id.clone()),
            created_at: Set(p.base.created_at),
            updated_at: Set(p.base.updated_at),
            city_id: Set(p.city_id.clone()),
            user_id: Set(p.user_id.clone()),
            name: Set(p.name.clone()),
            description: Set(p.description.clone()),
            number_rooms: Set(p.number_rooms),
            number_bathrooms: Set(p.number_bathrooms),
            max_guest: Set(p.max_guest),
            price_by_night: Set(p.price_by_night),
            latitude: Set(p.latitude),
            longitude: Set(p.longitude),
        }
    }
}
