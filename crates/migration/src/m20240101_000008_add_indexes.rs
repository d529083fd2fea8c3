use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Cities: lookup by owning state
        manager
            .create_index(
                Index::create()
                    .name("idx_city_state")
                    .table(Cities::Table)
                    .col(Cities::StateId)
                    .to_owned(),
            )
            .await?;

        // Places: lookup by city and by host
        manager
            .create_index(
                Index::create()
                    .name("idx_place_city")
                    .table(Places::Table)
                    .col(Places::CityId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_place_user")
                    .table(Places::Table)
                    .col(Places::UserId)
                    .to_owned(),
            )
            .await?;

        // Reviews: lookup by place and by author
        manager
            .create_index(
                Index::create()
                    .name("idx_review_place")
                    .table(Reviews::Table)
                    .col(Reviews::PlaceId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_review_user")
                    .table(Reviews::Table)
                    .col(Reviews::UserId)
                    .to_owned(),
            )
            .await?;

        // PlaceAmenity: reverse lookup from amenity
        manager
            .create_index(
                Index::create()
                    .name("idx_place_amenity_amenity")
                    .table(PlaceAmenity::Table)
                    .col(PlaceAmenity::AmenityId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            ("idx_city_state", Cities::Table.into_iden()),
            ("idx_place_city", Places::Table.into_iden()),
            ("idx_place_user", Places::Table.into_iden()),
            ("idx_review_place", Reviews::Table.into_iden()),
            ("idx_review_user", Reviews::Table.into_iden()),
            ("idx_place_amenity_amenity", PlaceAmenity::Table.into_iden()),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Cities { Table, StateId }

#[derive(DeriveIden)]
enum Places { Table, CityId, UserId }

#[derive(DeriveIden)]
enum Reviews { Table, PlaceId, UserId }

#[derive(DeriveIden)]
enum PlaceAmenity { Table, AmenityId }
