use sea_orm::{entity::prelude::*, Set};

use crate::{base::BaseModel, review::Review};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Place, User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Place => Entity::belongs_to(super::places::Entity)
                .from(Column::PlaceId)
                .to(super::places::Column::Id)
                .into(),
            Relation::User => Entity::belongs_to(super::users::Entity)
                .from(Column::UserId)
                .to(super::users::Column::Id)
                .into(),
        }
    }
}

impl Related<super::places::Entity> for Entity {
    fn to() -> RelationDef { Relation::Place.def() }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Review {
    fn from(m: Model) -> Self {
        Review {
            base: BaseModel::restore(m.id, m.created_at, m.updated_at),
            place_id: m.place_id,
            user_id: m.user_id,
            text: m.text,
        }
    }
}

impl From<&Review> for ActiveModel {
    fn from(r: &Review) -> Self {
        ActiveModel {
            id: Set(r.base.id.clone()),
            created_at: Set(r.base.created_at),
            updated_at: Set(r.base.updated_at),
            place_id: Set(r.place_id.clone()),
            user_id: Set(r.user_id.clone()),
            text: Set(r.text.clone()),
        }
    }
}
