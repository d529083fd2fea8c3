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
                    .table(Amenities::Table)
                    .if_not_exists()
                    .col(string_len(Amenities::Id, 60).primary_key())
                    .col(audit_timestamp(backend, Amenities::CreatedAt))
                    .col(audit_timestamp(backend, Amenities::UpdatedAt))
                    .col(string_len(Amenities::Name, 128))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Amenities::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Amenities { Table, Id, CreatedAt, UpdatedAt, Name }
