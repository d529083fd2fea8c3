//! Create `reviews` table with FKs to `places` and `users`.
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
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(string_len(Reviews::Id, 60).primary_key())
                    .col(audit_timestamp(backend, Reviews::CreatedAt))
                    .col(audit_timestamp(backend, Reviews::UpdatedAt))
                    .col(string_len(Reviews::PlaceId, 60))
                    .col(string_len(Reviews::UserId, 60))
                    .col(string_len(Reviews::Text, 1024))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_place")
                            .from(Reviews::Table, Reviews::PlaceId)
                            .to(Places::Table, Places::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_user")
                            .from(Reviews::Table, Reviews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Reviews::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Reviews { Table, Id, CreatedAt, UpdatedAt, PlaceId, UserId, Text }

#[derive(DeriveIden)]
enum Places { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
