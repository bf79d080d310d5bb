use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, used for great-circle distances.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle (haversine) distance to `other` in meters.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }

    /// Shareable web link for this coordinate.
    pub fn share_url(&self) -> String {
        format!("https://maps.apple.com/?ll={},{}", self.lat, self.lon)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lon)
    }
}

/// A rectangular map region: a center plus latitude/longitude spans in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    pub lat_delta: f64,
    pub lon_delta: f64,
}

impl Region {
    /// Region centered on a single point with a fixed close-up span.
    pub fn around(center: Coordinate) -> Self {
        Self {
            center,
            lat_delta: 0.01,
            lon_delta: 0.01,
        }
    }

    /// Smallest region containing every coordinate, or None for an empty set.
    pub fn bounding(coords: &[Coordinate]) -> Option<Self> {
        let first = coords.first()?;
        let mut min_lat = first.lat;
        let mut max_lat = first.lat;
        let mut min_lon = first.lon;
        let mut max_lon = first.lon;
        for c in &coords[1..] {
            min_lat = min_lat.min(c.lat);
            max_lat = max_lat.max(c.lat);
            min_lon = min_lon.min(c.lon);
            max_lon = max_lon.max(c.lon);
        }
        Some(Self {
            center: Coordinate::new((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0),
            lat_delta: max_lat - min_lat,
            lon_delta: max_lon - min_lon,
        })
    }

    /// Corner coordinates as (min_lat, min_lon, max_lat, max_lon).
    pub fn corners(&self) -> (f64, f64, f64, f64) {
        (
            self.center.lat - self.lat_delta / 2.0,
            self.center.lon - self.lon_delta / 2.0,
            self.center.lat + self.lat_delta / 2.0,
            self.center.lon + self.lon_delta / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_distance_is_sane() {
        // Rome to Paris is roughly 1,105 km.
        let rome = Coordinate::new(41.9028, 12.4964);
        let paris = Coordinate::new(48.8566, 2.3522);
        let d = rome.distance_m(&paris);
        assert!((1_050_000.0..1_160_000.0).contains(&d), "got {d}");
        assert_eq!(rome.distance_m(&rome), 0.0);
    }

    #[test]
    fn bounding_region_contains_all_points() {
        let coords = vec![
            Coordinate::new(41.9, 12.5),
            Coordinate::new(48.9, 2.4),
            Coordinate::new(52.5, 13.4),
        ];
        let region = Region::bounding(&coords).unwrap();
        let (min_lat, min_lon, max_lat, max_lon) = region.corners();
        for c in &coords {
            assert!(c.lat >= min_lat && c.lat <= max_lat);
            assert!(c.lon >= min_lon && c.lon <= max_lon);
        }
        assert!(Region::bounding(&[]).is_none());
    }

    #[test]
    fn share_url_format() {
        let c = Coordinate::new(41.9028, 12.4964);
        assert_eq!(c.share_url(), "https://maps.apple.com/?ll=41.9028,12.4964");
    }
}
