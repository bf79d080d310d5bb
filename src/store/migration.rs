//! Migration module for the place database.
pub mod m20240501_000001_create_places;

use crate::store::migration::m20240501_000001_create_places::Migration as CreatePlacesMigration;
use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn sea_orm_migration::MigrationTrait>> {
        vec![Box::new(CreatePlacesMigration)]
    }
}

/// Runs all pending migrations.
pub async fn run_migrations(db_conn: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db_conn, None).await
}
