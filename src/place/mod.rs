use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

/// How the user relates to a pinned place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Visited,
    Wishlist,
    Lived,
}

impl PlaceCategory {
    pub const ALL: [PlaceCategory; 3] = [
        PlaceCategory::Visited,
        PlaceCategory::Wishlist,
        PlaceCategory::Lived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::Visited => "visited",
            PlaceCategory::Wishlist => "wishlist",
            PlaceCategory::Lived => "lived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "visited" => Some(PlaceCategory::Visited),
            "wishlist" => Some(PlaceCategory::Wishlist),
            "lived" => Some(PlaceCategory::Lived),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached result of reverse geocoding a place's coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placemark {
    pub country: Option<String>,
    pub iso_country_code: Option<String>,
    pub locality: Option<String>,
    /// Offset from UTC in seconds for the place's time zone, when known.
    pub utc_offset_secs: Option<i32>,
}

/// A user-saved point of interest.
///
/// The coordinate is always present; the name may be empty only transiently
/// while the user is still typing it, never after save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub category: PlaceCategory,
    pub coord: Coordinate,
    pub placemark: Option<Placemark>,
    pub created_at: DateTime<Utc>,
}

impl Place {
    pub fn new(name: impl Into<String>, category: PlaceCategory, coord: Coordinate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            coord,
            placemark: None,
            created_at: Utc::now(),
        }
    }

    /// One-line summary for list output and map callouts.
    pub fn subtitle(&self) -> String {
        let mut parts = vec![self.category.as_str().to_string()];
        if let Some(pm) = &self.placemark {
            if let Some(locality) = &pm.locality {
                parts.push(locality.clone());
            }
            if let Some(country) = &pm.country {
                parts.push(country.clone());
            }
        }
        parts.join(" • ")
    }
}

/// Restriction on which places are displayed. Absence (`None` at the use
/// site) means no restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceFilter {
    Category(PlaceCategory),
}

/// Key the displayed place list is ordered by. The ascending flag is stored
/// beside it in preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    TimeZone,
    Distance,
    Country,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::TimeZone => "time",
            SortKey::Distance => "distance",
            SortKey::Country => "country",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Some(SortKey::Name),
            "time" | "timezone" => Some(SortKey::TimeZone),
            "distance" => Some(SortKey::Distance),
            "country" => Some(SortKey::Country),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_round_trip() {
        for cat in PlaceCategory::ALL {
            assert_eq!(PlaceCategory::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(PlaceCategory::parse("WISHLIST"), Some(PlaceCategory::Wishlist));
        assert_eq!(PlaceCategory::parse("unknown"), None);
    }

    #[test]
    fn subtitle_includes_known_placemark_parts() {
        let mut place = Place::new("Rome", PlaceCategory::Visited, Coordinate::new(41.9, 12.5));
        assert_eq!(place.subtitle(), "visited");
        place.placemark = Some(Placemark {
            country: Some("Italy".into()),
            iso_country_code: Some("IT".into()),
            locality: Some("Rome".into()),
            utc_offset_secs: Some(3600),
        });
        assert_eq!(place.subtitle(), "visited • Rome • Italy");
    }
}
