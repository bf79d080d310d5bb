//! Entity definition for the place table.
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "place")]
pub struct Model {
    /// UUID, stored as text.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    /// PlaceCategory stored as text.
    #[sea_orm(column_type = "Text")]
    pub category: String,
    pub lat: f64,
    pub lon: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub country: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub iso_country_code: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub locality: Option<String>,
    #[sea_orm(column_type = "Integer", nullable)]
    pub utc_offset_secs: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
