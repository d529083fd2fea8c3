//! Create `place_amenity` join table.
//!
//! Composite primary key makes an edge unique; rows follow either side on delete.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlaceAmenity::Table)
                    .if_not_exists()
                    .col(string_len(PlaceAmenity::PlaceId, 60))
                    .col(string_len(PlaceAmenity::AmenityId, 60))
                    .primary_key(
                        Index::create()
                            .name("pk_place_amenity")
                            .col(PlaceAmenity::PlaceId)
                            .col(PlaceAmenity::AmenityId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_amenity_place")
                            .from(PlaceAmenity::Table, PlaceAmenity::PlaceId)
                            .to(Places::Table, Places::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_amenity_amenity")
                            .from(PlaceAmenity::Table, PlaceAmenity::AmenityId)
                            .to(Amenities::Table, Amenities::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PlaceAmenity::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PlaceAmenity { Table, PlaceId, AmenityId }

#[derive(DeriveIden)]
enum Places { Table, Id }

#[derive(DeriveIden)]
enum Amenities { Table, Id }
