//! Create `states` table.
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
                    .table(States::Table)
                    .if_not_exists()
                    .col(string_len(States::Id, 60).primary_key())
                    .col(audit_timestamp(backend, States::CreatedAt))
                    .col(audit_timestamp(backend, States::UpdatedAt))
                    .col(string_len(States::Name, 128))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(States::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum States { Table, Id, CreatedAt, UpdatedAt, Name }
