use sea_orm::{entity::prelude::*, Set};

use crate::{base::BaseModel, user::User};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Places, Reviews }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Places => Entity::has_many(super::places::Entity).into(),
            Relation::Reviews => Entity::has_many(super::reviews::Entity).into(),
        }
    }
}

impl Related<super::places::Entity> for Entity {
    fn to() -> RelationDef { Relation::Places.def() }
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef { Relation::Reviews.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(m: Model) -> Self {
        User {
            base: BaseModel::restore(m.id, m.created_at, m.updated_at),
            email: m.email,
            password: m.password,
            first_name: m.first_name,
            last_name: m.last_name,
        }
    }
}

impl From<&User> for ActiveModel {
    fn from(u: &User) -> Self {
        ActiveModel {
            id: Set(u.base.id.clone()),
            created_at: Set(u.base.created_at),
            updated_at: Set(u.base.updated_at),
            email: Set(u.email.clone()),
            password: Set(u.password.clone()),
            first_name: Set(u.first_name.clone()),
            last_name: Set(u.last_name.clone()),
        }
    }
}
