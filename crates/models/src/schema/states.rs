use sea_orm::{entity::prelude::*, Set};

use crate::{base::BaseModel, state::State};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "states")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Cities }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Cities => Entity::has_many(super::cities::Entity).into() }
    }
}

impl Related<super::cities::Entity> for Entity {
    fn to() -> RelationDef { Relation::Cities.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for State {
    fn from(m: Model) -> Self {
        State { base: BaseModel::restore(m.id, m.created_at, m.updated_at), name: m.name }
    }
}

impl From<&State> for ActiveModel {
    fn from(s: &State) -> Self {
        ActiveModel {
            id: Set(s.base.id.clone()),
            created_at: Set(s.base.created_at),
            updated_at: Set(s.base.updated_at),
            name: Set(s.name.clone()),
        }
    }
}
