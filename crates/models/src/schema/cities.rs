use sea_orm::{entity::prelude::*, Set};

use crate::{base::BaseModel, city::City};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub state_id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { State, Places }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::State => Entity::belongs_to(super::states::Entity)
                .from(Column::StateId)
                .to(super::states::Column::Id)
                .into(),
            Relation::Places => Entity::has_many(super::places::Entity).into(),
        }
    }
}

impl Related<super::states::Entity> for Entity {
    fn to() -> RelationDef { Relation::State.def() }
}

impl Related<super::places::Entity> for Entity {
    fn to() -> RelationDef { Relation::Places.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for City {
    fn from(m: Model) -> Self {
        City {
            base: BaseModel::restore(m.id, m.created_at, m.updated_at),
            state_id: m.state_id,
            name: m.name,
        }
    }
}

impl From<&City> for ActiveModel {
    fn from(c: &City) -> Self {
        ActiveModel {
            id: Set(c.base.id.clone()),
            created_at: Set(c.base.created_at),
            updated_at: Set(c.base.updated_at),
            state_id: Set(c.state_id.clone()),
            name: Set(c.name.clone()),
        }
    }
}
