use crate::geo::{Coordinate, Region};
use crate::place::Place;
use crate::search::service::SearchResult;

/// Anything that can appear on the map: a saved place or a search result.
#[derive(Debug, Clone, PartialEq)]
pub enum MapItem {
    Place(Place),
    SearchResult(SearchResult),
}

impl MapItem {
    pub fn title(&self) -> &str {
        match self {
            MapItem::Place(p) => &p.name,
            MapItem::SearchResult(r) => &r.title,
        }
    }

    pub fn coord(&self) -> Coordinate {
        match self {
            MapItem::Place(p) => p.coord,
            MapItem::SearchResult(r) => r.coord,
        }
    }
}

/// The map display surface. It never originates place data; it only reflects
/// what the collection and search layers tell it to show.
pub trait MapSurface {
    fn add(&mut self, items: Vec<MapItem>);
    fn remove(&mut self, items: Vec<MapItem>);
    fn select(&mut self, item: MapItem);
    fn fit_bounds(&mut self, region: Region);
}

/// Terminal renderer: annotations become log lines.
#[derive(Debug, Default)]
pub struct ConsoleMap;

impl MapSurface for ConsoleMap {
    fn add(&mut self, items: Vec<MapItem>) {
        for item in items {
            println!("  + {} ({})", item.title(), item.coord());
        }
    }

    fn remove(&mut self, items: Vec<MapItem>) {
        for item in items {
            println!("  - {} ({})", item.title(), item.coord());
        }
    }

    fn select(&mut self, item: MapItem) {
        println!("  > focused on {} ({})", item.title(), item.coord());
    }

    fn fit_bounds(&mut self, region: Region) {
        let (min_lat, min_lon, max_lat, max_lon) = region.corners();
        println!("  [view] {min_lat:.4},{min_lon:.4} .. {max_lat:.4},{max_lon:.4}");
    }
}
