use tracing::{error, info, warn};
use uuid::Uuid;

use crate::collection::PlaceCollection;
use crate::map::MapSurface;
use crate::place::{Place, PlaceFilter, Placemark, SortKey};
use crate::prefs::{Prefs, PrefsFile};
use crate::search::service::SearchQuery;
use crate::search::{SearchOrchestrator, SearchTicket};
use crate::store::PlaceStore;

/// Location permission state, mirrored from whatever position source the
/// frontend has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    NotDetermined,
    Authorized,
    Denied,
}

/// The explicitly constructed application state: place collection, search
/// orchestration, persistence, and preferences behind one handle that the
/// frontend owns and passes down. Nothing here is global.
///
/// Store and geocode failures never surface past a log line; the in-memory
/// state stays authoritative for the session.
pub struct AppState {
    pub collection: PlaceCollection,
    pub search: SearchOrchestrator,
    pub prefs: Prefs,
    store: PlaceStore,
    prefs_file: PrefsFile,
    pub auth_status: AuthStatus,
    /// Set while location permission is denied; the frontend surfaces it as
    /// a persistent banner. Never cleared by a retry, only by a new status.
    pub show_auth_error: bool,
}

impl AppState {
    pub fn new(store: PlaceStore, prefs_file: PrefsFile) -> Self {
        let prefs = prefs_file.load();
        let mut collection = PlaceCollection::new();
        collection.restore_sort(prefs.sort_by, prefs.ascending);
        Self {
            collection,
            search: SearchOrchestrator::new(),
            prefs,
            store,
            prefs_file,
            auth_status: AuthStatus::default(),
            show_auth_error: false,
        }
    }

    /// One full fetch at startup. A failing store yields the empty state.
    pub async fn load_places(&mut self, map: &mut dyn MapSurface) {
        let places = match self.store.fetch_all().await {
            Ok(places) => places,
            Err(e) => {
                warn!(error = %e, "could not load places, starting empty");
                Vec::new()
            }
        };
        info!(count = places.len(), "loaded places");
        self.collection.set_all(places);
        self.collection.recompute(map);
    }

    /// Create or edit a place, reconcile the map, and persist. A failed save
    /// is logged and otherwise ignored.
    pub async fn save_place(&mut self, place: Place, map: &mut dyn MapSurface) {
        self.collection.upsert(place.clone(), map);
        if let Err(e) = self.store.upsert(&place).await {
            error!(error = %e, place = %place.name, "failed to persist place");
        }
    }

    /// Delete by id; returns the removed place when it existed.
    pub async fn delete_place(&mut self, id: Uuid, map: &mut dyn MapSurface) -> Option<Place> {
        let removed = self.collection.delete(id, map)?;
        if let Err(e) = self.store.delete(id).await {
            error!(error = %e, place = %removed.name, "failed to delete place from store");
        }
        Some(removed)
    }

    /// Attach a reverse-geocode result and persist the enriched place.
    pub async fn apply_placemark(&mut self, id: Uuid, placemark: Placemark) {
        self.collection.apply_placemark(id, placemark);
        if let Some(place) = self.collection.places().iter().find(|p| p.id == id) {
            let place = place.clone();
            if let Err(e) = self.store.upsert(&place).await {
                error!(error = %e, place = %place.name, "failed to persist placemark");
            }
        }
    }

    pub fn set_filter(&mut self, filter: Option<PlaceFilter>, map: &mut dyn MapSurface) {
        self.collection.set_filter(filter, map);
    }

    pub fn set_search_text(&mut self, text: &str, map: &mut dyn MapSurface) {
        self.collection.set_search_text(text, map);
    }

    /// Change the sort order and persist the new key/direction.
    pub fn set_sort(&mut self, key: SortKey, map: &mut dyn MapSurface) {
        self.collection.set_sort(key, map);
        self.prefs.sort_by = self.collection.sort_by();
        self.prefs.ascending = self.collection.ascending();
        self.persist_prefs();
    }

    /// Submit a remote search; recent-search history changes are persisted
    /// immediately.
    pub fn submit_search(&mut self, query: SearchQuery, map: &mut dyn MapSurface) -> SearchTicket {
        let ticket = self.search.submit(query, &mut self.prefs, map);
        self.persist_prefs();
        ticket
    }

    pub fn remove_recent_search(&mut self, query: &str) {
        self.prefs.remove_recent_search(query);
        self.persist_prefs();
    }

    /// True exactly once, on the very first run.
    pub fn take_first_launch(&mut self) -> bool {
        if self.prefs.completed_first_launch {
            return false;
        }
        self.prefs.completed_first_launch = true;
        self.persist_prefs();
        true
    }

    pub fn set_auth_status(&mut self, status: AuthStatus) {
        self.auth_status = status;
        self.validate_auth();
    }

    /// Refresh the denied-permission banner state; returns whether
    /// position-dependent features may proceed.
    pub fn validate_auth(&mut self) -> bool {
        self.show_auth_error = self.auth_status == AuthStatus::Denied;
        !self.show_auth_error
    }

    fn persist_prefs(&self) {
        if let Err(e) = self.prefs_file.save(&self.prefs) {
            warn!(error = %e, "failed to persist preferences");
        }
    }
}
