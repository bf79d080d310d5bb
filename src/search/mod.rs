pub mod nominatim;
pub mod service;

#[cfg(test)]
mod tests;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::map::{MapItem, MapSurface};
use crate::prefs::Prefs;
use crate::search::service::{SearchQuery, SearchResponse, SearchResult, SearchServiceError, Suggestion};

/// Lifecycle of the one in-flight remote search. Terminal states stay
/// visible until the next submission or cancellation returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    Completed,
    Cancelled,
    Failed,
}

/// A submitted search the caller must dispatch to the service: carry the
/// generation through the async call and hand it back to [`SearchOrchestrator::complete`].
#[derive(Debug, Clone)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: SearchQuery,
    pub cancel: CancellationToken,
}

/// Manages the lifecycle of remote place/address lookup: at most one search
/// is active, back-to-back submissions supersede each other, and only the
/// most recently submitted search's results are ever surfaced.
///
/// The orchestrator never talks to the network itself. `submit` hands the
/// caller a ticket; the caller dispatches it on the service and reports the
/// outcome through `complete`, which drops anything stale.
#[derive(Debug, Default)]
pub struct SearchOrchestrator {
    state: SearchState,
    generation: u64,
    completion_generation: u64,
    fragment: String,
    loading: bool,
    results: Vec<SearchResult>,
    completions: Vec<Suggestion>,
    selected: Option<SearchResult>,
    cancel: Option<CancellationToken>,
}

impl SearchOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn selected(&self) -> Option<&SearchResult> {
        self.selected.as_ref()
    }

    pub fn completions(&self) -> &[Suggestion] {
        &self.completions
    }

    /// Start a new search. Any search already in flight is cancelled first
    /// and its eventual result will be dropped. The query text is recorded
    /// into recent-search history.
    pub fn submit(
        &mut self,
        query: SearchQuery,
        prefs: &mut Prefs,
        map: &mut dyn MapSurface,
    ) -> SearchTicket {
        if self.state == SearchState::Searching {
            debug!(generation = self.generation, "superseding in-flight search");
            self.abort_in_flight();
        }
        self.clear_results(map);

        prefs.add_recent_search(query.text());

        self.generation += 1;
        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());
        self.loading = true;
        self.state = SearchState::Searching;
        SearchTicket {
            generation: self.generation,
            query,
            cancel,
        }
    }

    /// Apply a finished search. Outcomes for anything but the current
    /// generation arrive late by definition and are dropped; returns
    /// whether the outcome was applied.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<SearchResponse, SearchServiceError>,
        map: &mut dyn MapSurface,
    ) -> bool {
        if generation != self.generation || self.state != SearchState::Searching {
            debug!(
                generation,
                current = self.generation,
                "dropping stale search outcome"
            );
            return false;
        }
        self.loading = false;
        self.cancel = None;

        let response = match outcome {
            Ok(r) => r,
            Err(e) => {
                // Failures fall back to the empty-results state; the user
                // retries by searching again.
                warn!(error = %e, "search failed");
                self.results.clear();
                self.state = SearchState::Failed;
                return true;
            }
        };

        self.state = SearchState::Completed;
        self.results = response.results;
        if !self.results.is_empty() {
            map.add(self.results.iter().cloned().map(MapItem::SearchResult).collect());
        }
        if self.results.len() == 1 {
            let only = self.results[0].clone();
            let region = only
                .region
                .unwrap_or_else(|| crate::geo::Region::around(only.coord));
            map.select(MapItem::SearchResult(only.clone()));
            map.fit_bounds(region);
            self.selected = Some(only);
        } else if let Some(region) = response.bounding_region {
            map.fit_bounds(region);
        }
        true
    }

    /// Explicit external cancellation, e.g. the user clearing the field.
    pub fn cancel(&mut self, map: &mut dyn MapSurface) {
        self.abort_in_flight();
        self.clear_results(map);
        self.state = SearchState::Idle;
    }

    /// Update the live autocomplete fragment. Empty text clears the
    /// suggestion list; non-empty text starts a new completion generation,
    /// implicitly superseding the previous one.
    pub fn set_fragment(&mut self, text: impl Into<String>) -> Option<u64> {
        self.fragment = text.into();
        if self.fragment.is_empty() {
            self.completions.clear();
            None
        } else {
            self.completion_generation += 1;
            Some(self.completion_generation)
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Apply autocomplete suggestions; only the latest generation wins.
    pub fn complete_autocomplete(&mut self, generation: u64, suggestions: Vec<Suggestion>) {
        if generation == self.completion_generation {
            self.completions = suggestions;
        } else {
            debug!(
                generation,
                current = self.completion_generation,
                "dropping stale autocomplete"
            );
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if self.state == SearchState::Searching {
            self.state = SearchState::Cancelled;
        }
        self.loading = false;
    }

    fn clear_results(&mut self, map: &mut dyn MapSurface) {
        if !self.results.is_empty() {
            map.remove(
                self.results
                    .drain(..)
                    .map(MapItem::SearchResult)
                    .collect(),
            );
        }
        self.selected = None;
    }
}
