use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::{Coordinate, Region};
use crate::place::Placemark;

/// What the user asked the search service for: free text, or a completion
/// suggestion they picked while typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Text(String),
    Completion(Suggestion),
}

impl SearchQuery {
    /// The text recorded into recent-search history and echoed into the
    /// search field.
    pub fn text(&self) -> &str {
        match self {
            SearchQuery::Text(s) => s,
            SearchQuery::Completion(c) => &c.title,
        }
    }
}

/// A query suggestion produced while the user is typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub subtitle: String,
}

/// A point of interest or address returned by the search service.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub subtitle: String,
    pub coord: Coordinate,
    pub category: Option<String>,
    pub region: Option<Region>,
}

/// A successful search response: results plus the region that covers them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub bounding_region: Option<Region>,
}

#[derive(Error, Debug)]
pub enum SearchServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Remote geocoding/search collaborator. Implementations may take arbitrary
/// time; callers must tolerate late or never-arriving completions.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Find places and addresses matching the query, optionally biased
    /// towards a region.
    async fn search(
        &self,
        query: &SearchQuery,
        region_hint: Option<Region>,
    ) -> Result<SearchResponse, SearchServiceError>;

    /// Resolve a coordinate to a human-readable placemark.
    async fn reverse_geocode(&self, coord: Coordinate) -> Result<Placemark, SearchServiceError>;

    /// Query suggestions for a partial text fragment. Fire-and-forget from
    /// the caller's perspective; the latest call wins.
    async fn autocomplete(
        &self,
        fragment: &str,
        region_hint: Option<Region>,
    ) -> Result<Vec<Suggestion>, SearchServiceError>;
}
