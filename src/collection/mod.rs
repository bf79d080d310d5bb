use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::geo::{Coordinate, Region};
use crate::map::{MapItem, MapSurface};
use crate::place::{Place, PlaceCategory, PlaceFilter, SortKey};


/// Where the view should move after a zoom-to-displayed request.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoomTarget {
    Single(Place),
    Bounds(Region),
}

/// Owns the authoritative place list and the displayed filtered/sorted
/// subset, keeping the map surface synchronized with minimal add/remove
/// churn.
///
/// All mutation goes through explicit named transitions; every transition
/// that can change the displayed subset runs the recompute pipeline itself,
/// so callers never have to remember a follow-up call.
#[derive(Debug)]
pub struct PlaceCollection {
    places: Vec<Place>,
    displayed: Vec<Place>,
    /// Identity snapshot of the displayed subset after the last recompute.
    shown: HashSet<Uuid>,
    filter: Option<PlaceFilter>,
    search_text: String,
    sort_by: SortKey,
    ascending: bool,
    user_position: Option<Coordinate>,
    categories_present: HashSet<PlaceCategory>,
    countries_visited: usize,
}

impl Default for PlaceCollection {
    fn default() -> Self {
        Self {
            places: Vec::new(),
            displayed: Vec::new(),
            shown: HashSet::new(),
            filter: None,
            search_text: String::new(),
            sort_by: SortKey::Name,
            ascending: false,
            user_position: None,
            categories_present: HashSet::new(),
            countries_visited: 0,
        }
    }
}

impl PlaceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the persisted sort order without triggering a recompute;
    /// used once at startup before the first pipeline run.
    pub fn restore_sort(&mut self, sort_by: SortKey, ascending: bool) {
        self.sort_by = sort_by;
        self.ascending = ascending;
    }

    pub fn sort_by(&self) -> SortKey {
        self.sort_by
    }

    pub fn ascending(&self) -> bool {
        self.ascending
    }

    pub fn displayed(&self) -> &[Place] {
        &self.displayed
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn categories_present(&self) -> &HashSet<PlaceCategory> {
        &self.categories_present
    }

    /// Count of distinct countries across places with a cached reverse
    /// geocode; places without one are ignored.
    pub fn countries_visited(&self) -> usize {
        self.countries_visited
    }

    pub fn filter(&self) -> Option<PlaceFilter> {
        self.filter
    }

    pub fn is_filtering(&self) -> bool {
        self.filter.is_some() || !self.search_text.is_empty()
    }

    pub fn user_position(&self) -> Option<Coordinate> {
        self.user_position
    }

    pub fn set_user_position(&mut self, position: Option<Coordinate>) {
        self.user_position = position;
    }

    /// Case-insensitive name lookup, using the same Unicode lowercasing as
    /// the in-list search filter.
    pub fn find_by_name(&self, name: &str) -> Option<&Place> {
        let wanted = name.to_lowercase();
        self.places.iter().find(|p| p.name.to_lowercase() == wanted)
    }

    /// Replace the full set, e.g. from the startup store fetch. Recomputes
    /// derived aggregates but leaves displayed-set reconciliation to the
    /// caller's following `recompute`.
    pub fn set_all(&mut self, places: Vec<Place>) {
        self.places = places;
        self.refresh_aggregates();
    }

    pub fn set_filter(&mut self, filter: Option<PlaceFilter>, map: &mut dyn MapSurface) {
        self.filter = filter;
        self.recompute(map);
        if let Some(target) = self.zoom_target() {
            apply_zoom(target, map);
        }
    }

    /// In-list search text: case-insensitive substring match against the
    /// place name. Empty matches everything.
    pub fn set_search_text(&mut self, text: impl Into<String>, map: &mut dyn MapSurface) {
        self.search_text = text.into();
        self.recompute(map);
    }

    /// Selecting the current key flips the direction; selecting a different
    /// key adopts it and keeps the direction.
    pub fn set_sort(&mut self, key: SortKey, map: &mut dyn MapSurface) {
        if self.sort_by == key {
            self.ascending = !self.ascending;
        } else {
            self.sort_by = key;
        }
        self.recompute(map);
    }

    /// Filter, sort, then reconcile the map: compare the new displayed set
    /// against the previous one as unordered identity sets and emit only the
    /// difference, removals first.
    pub fn recompute(&mut self, map: &mut dyn MapSurface) {
        let search = self.search_text.to_lowercase();
        let mut next: Vec<Place> = self
            .places
            .iter()
            .filter(|place| {
                let searching = search.is_empty() || place.name.to_lowercase().contains(&search);
                let filtered = match self.filter {
                    None => true,
                    Some(PlaceFilter::Category(cat)) => place.category == cat,
                };
                searching && filtered
            })
            .cloned()
            .collect();
        self.sort(&mut next);

        let next_ids: HashSet<Uuid> = next.iter().map(|p| p.id).collect();
        let removed: Vec<MapItem> = self
            .displayed
            .iter()
            .filter(|p| !next_ids.contains(&p.id))
            .cloned()
            .map(MapItem::Place)
            .collect();
        let added: Vec<MapItem> = next
            .iter()
            .filter(|p| !self.shown.contains(&p.id))
            .cloned()
            .map(MapItem::Place)
            .collect();
        debug!(
            displayed = next.len(),
            removed = removed.len(),
            added = added.len(),
            "recomputed displayed places"
        );
        if !removed.is_empty() {
            map.remove(removed);
        }
        if !added.is_empty() {
            map.add(added);
        }

        self.displayed = next;
        self.shown = next_ids;
    }

    /// Stable ascending sort by the active key, reversed wholesale when the
    /// direction flag is descending. Reversing the whole sequence (rather
    /// than inverting the comparator) makes a direction flip an exact
    /// reversal even across ties.
    fn sort(&self, places: &mut [Place]) {
        let user = self.user_position;
        places.sort_by(|a, b| compare(self.sort_by, user, a, b));
        if !self.ascending {
            places.reverse();
        }
    }

    /// Where to move the view for the current displayed subset: a single
    /// place is selected directly, several get a bounding region.
    pub fn zoom_target(&self) -> Option<ZoomTarget> {
        match self.displayed.len() {
            0 => None,
            1 => Some(ZoomTarget::Single(self.displayed[0].clone())),
            _ => {
                let coords: Vec<Coordinate> = self.displayed.iter().map(|p| p.coord).collect();
                Region::bounding(&coords).map(ZoomTarget::Bounds)
            }
        }
    }

    /// Remove the place from the full list and the displayed subset and emit
    /// the map removal. Returns the removed place so the caller can forward
    /// the deletion to the store.
    pub fn delete(&mut self, id: Uuid, map: &mut dyn MapSurface) -> Option<Place> {
        let idx = self.places.iter().position(|p| p.id == id)?;
        let place = self.places.remove(idx);
        self.displayed.retain(|p| p.id != id);
        if self.shown.remove(&id) {
            map.remove(vec![MapItem::Place(place.clone())]);
        }
        self.refresh_aggregates();
        Some(place)
    }

    /// Mutate in place when the id exists, append otherwise, then run the
    /// pipeline so the map reflects the change.
    pub fn upsert(&mut self, place: Place, map: &mut dyn MapSurface) {
        match self.places.iter_mut().find(|p| p.id == place.id) {
            Some(existing) => {
                // Re-announce an edited place so the surface redraws it.
                if self.shown.contains(&place.id) {
                    map.remove(vec![MapItem::Place(existing.clone())]);
                    self.shown.remove(&place.id);
                    self.displayed.retain(|p| p.id != place.id);
                }
                *existing = place;
            }
            None => self.places.push(place),
        }
        self.refresh_aggregates();
        self.recompute(map);
    }

    /// Attach a reverse-geocode result to a place. Aggregates depend on the
    /// cached country, so they refresh here too.
    pub fn apply_placemark(&mut self, id: Uuid, placemark: crate::place::Placemark) {
        if let Some(place) = self.places.iter_mut().find(|p| p.id == id) {
            place.placemark = Some(placemark.clone());
        }
        if let Some(place) = self.displayed.iter_mut().find(|p| p.id == id) {
            place.placemark = Some(placemark);
        }
        self.refresh_aggregates();
    }

    fn refresh_aggregates(&mut self) {
        self.categories_present = self.places.iter().map(|p| p.category).collect();
        self.countries_visited = self
            .places
            .iter()
            .filter_map(|p| p.placemark.as_ref().and_then(|pm| pm.country.as_deref()))
            .collect::<HashSet<_>>()
            .len();
    }
}

/// Apply a zoom target to the map surface.
pub fn apply_zoom(target: ZoomTarget, map: &mut dyn MapSurface) {
    match target {
        ZoomTarget::Single(place) => map.select(MapItem::Place(place)),
        ZoomTarget::Bounds(region) => map.fit_bounds(region),
    }
}

fn compare(key: SortKey, user: Option<Coordinate>, a: &Place, b: &Place) -> Ordering {
    match key {
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::TimeZone => utc_offset(a).cmp(&utc_offset(b)),
        SortKey::Distance => {
            let da = distance_from(user, a);
            let db = distance_from(user, b);
            da.total_cmp(&db)
        }
        SortKey::Country => iso_code(a).cmp(iso_code(b)),
    }
}

/// Places without a cached time zone sort at the local offset, matching how
/// an unset zone reads as "here".
fn utc_offset(place: &Place) -> i32 {
    place
        .placemark
        .as_ref()
        .and_then(|pm| pm.utc_offset_secs)
        .unwrap_or_else(|| chrono::Local::now().offset().local_minus_utc())
}

/// Unknown distance sorts as zero, i.e. nearest.
fn distance_from(user: Option<Coordinate>, place: &Place) -> f64 {
    user.map(|u| place.coord.distance_m(&u)).unwrap_or(0.0)
}

/// Unknown country sorts as the empty string, i.e. first.
fn iso_code(place: &Place) -> &str {
    place
        .placemark
        .as_ref()
        .and_then(|pm| pm.iso_country_code.as_deref())
        .unwrap_or("")
}
