// Initial schema: one table holding every saved place.
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Place {
    Table,
    Id,
    Name,
    Category,
    Lat,
    Lon,
    Country,
    IsoCountryCode,
    Locality,
    UtcOffsetSecs,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Place::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Place::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(Place::Name).text().not_null())
                    .col(ColumnDef::new(Place::Category).text().not_null())
                    .col(ColumnDef::new(Place::Lat).double().not_null())
                    .col(ColumnDef::new(Place::Lon).double().not_null())
                    .col(ColumnDef::new(Place::Country).text())
                    .col(ColumnDef::new(Place::IsoCountryCode).text())
                    .col(ColumnDef::new(Place::Locality).text())
                    .col(ColumnDef::new(Place::UtcOffsetSecs).integer())
                    .col(
                        ColumnDef::new(Place::CreatedAt)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Place::Table).to_owned())
            .await
    }
}
