use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{debug, info};
use uuid::Uuid;

use crate::geo::Coordinate;
use crate::place::{Place, PlaceCategory, Placemark};
use crate::store::entity::{ActiveModel, Entity as PlaceEntity, Model};
use crate::store::error::StoreError;

/// Data access object for the place table. The single durable source of
/// truth across restarts; the in-memory collection is populated from one
/// full fetch at startup and kept consistent by explicit mutation.
#[derive(Debug, Clone)]
pub struct PlaceStore {
    conn: DatabaseConnection,
}

impl PlaceStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn fetch_all(&self) -> Result<Vec<Place>, StoreError> {
        let rows = PlaceEntity::find().all(&self.conn).await?;
        info!(count = rows.len(), "fetched places from store");
        rows.into_iter().map(model_to_place).collect()
    }

    /// Insert a new place or update the stored row for an existing id.
    pub async fn upsert(&self, place: &Place) -> Result<(), StoreError> {
        let id = place.id.to_string();
        let existing = PlaceEntity::find_by_id(id.clone()).one(&self.conn).await?;
        let model = place_to_active_model(place);
        if existing.is_some() {
            debug!(%id, "updating place");
            model.update(&self.conn).await?;
        } else {
            debug!(%id, "inserting place");
            model.insert(&self.conn).await?;
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let res = PlaceEntity::delete_by_id(id.to_string())
            .exec(&self.conn)
            .await?;
        if res.rows_affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn model_to_place(model: Model) -> Result<Place, StoreError> {
    let id = Uuid::parse_str(&model.id)
        .map_err(|_| StoreError::Corrupt(format!("bad place id: {}", model.id)))?;
    let category = PlaceCategory::parse(&model.category)
        .ok_or_else(|| StoreError::Corrupt(format!("bad category: {}", model.category)))?;
    let has_placemark = model.country.is_some()
        || model.iso_country_code.is_some()
        || model.locality.is_some()
        || model.utc_offset_secs.is_some();
    let placemark = has_placemark.then(|| Placemark {
        country: model.country,
        iso_country_code: model.iso_country_code,
        locality: model.locality,
        utc_offset_secs: model.utc_offset_secs,
    });
    Ok(Place {
        id,
        name: model.name,
        category,
        coord: Coordinate::new(model.lat, model.lon),
        placemark,
        created_at: model.created_at,
    })
}

fn place_to_active_model(place: &Place) -> ActiveModel {
    let pm = place.placemark.clone().unwrap_or_default();
    ActiveModel {
        id: Set(place.id.to_string()),
        name: Set(place.name.clone()),
        category: Set(place.category.as_str().to_string()),
        lat: Set(place.coord.lat),
        lon: Set(place.coord.lon),
        country: Set(pm.country),
        iso_country_code: Set(pm.iso_country_code),
        locality: Set(pm.locality),
        utc_offset_secs: Set(pm.utc_offset_secs),
        created_at: Set(place.created_at),
    }
}
