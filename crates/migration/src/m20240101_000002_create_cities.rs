//! Create `cities` table with FK to `states`.
//!
//! Deleting a state with cities is refused; cities are never removed implicitly.
use sea_orm_migration::{prelude::*, schema::*};

use crate::columns::audit_timestamp;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        manager
            .create_table(
                Table::create()
                    .table(Cities::Table)
                    .if_not_exists()
                    .col(string_len(Cities::Id, 60).primary_key())
                    .col(audit_timestamp(backend, Cities::CreatedAt))
                    .col(audit_timestamp(backend, Cities::UpdatedAt))
                    .col(string_len(Cities::StateId, 60))
                    .col(string_len(Cities::Name, 128))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_city_state")
                            .from(Cities::Table, Cities::StateId)
                            .to(States::Table, States::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Cities::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Cities { Table, Id, CreatedAt, UpdatedAt, StateId, Name }

#[derive(DeriveIden)]
enum States { Table, Id }
