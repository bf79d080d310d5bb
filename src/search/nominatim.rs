use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::geo::{Coordinate, Region};
use crate::place::Placemark;
use crate::search::service::{
    SearchQuery, SearchResponse, SearchResult, SearchService, SearchServiceError, Suggestion,
};

/// Results requested per search; Nominatim caps free-form queries anyway.
const SEARCH_LIMIT: u32 = 10;
const SUGGESTION_LIMIT: u32 = 5;

/// OpenStreetMap Nominatim client. Nominatim has no dedicated completion
/// endpoint, so autocomplete is a small search; latest-wins supersession is
/// handled by the orchestrator, not here.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    base_url: String,
    inner: reqwest::Client,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SearchServiceError> {
        let inner = reqwest::Client::builder()
            // Nominatim's usage policy requires an identifying agent.
            .user_agent(concat!("trailmark/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            inner,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn run_search(
        &self,
        q: &str,
        region_hint: Option<Region>,
        limit: u32,
    ) -> Result<Vec<SearchRow>, SearchServiceError> {
        let limit = limit.to_string();
        let mut req = self.inner.get(self.endpoint("search")).query(&[
            ("q", q),
            ("format", "jsonv2"),
            ("limit", limit.as_str()),
        ]);
        if let Some(region) = region_hint {
            // viewbox biases ranking without excluding outside matches.
            let (min_lat, min_lon, max_lat, max_lon) = region.corners();
            req = req.query(&[
                ("viewbox", format!("{min_lon},{min_lat},{max_lon},{max_lat}")),
                ("bounded", "0".to_string()),
            ]);
        }
        debug!(query = q, limit = %limit, "nominatim search");
        let rows: Vec<SearchRow> = req.send().await?.error_for_status()?.json().await?;
        Ok(rows)
    }
}

#[async_trait]
impl SearchService for NominatimClient {
    async fn search(
        &self,
        query: &SearchQuery,
        region_hint: Option<Region>,
    ) -> Result<SearchResponse, SearchServiceError> {
        let q = match query {
            SearchQuery::Text(s) => s.clone(),
            // A picked suggestion searches on its full display line.
            SearchQuery::Completion(c) if c.subtitle.is_empty() => c.title.clone(),
            SearchQuery::Completion(c) => format!("{} {}", c.title, c.subtitle),
        };
        let rows = self.run_search(&q, region_hint, SEARCH_LIMIT).await?;
        let results = rows
            .into_iter()
            .map(SearchRow::into_result)
            .collect::<Result<Vec<_>, _>>()?;
        let coords: Vec<Coordinate> = results.iter().map(|r| r.coord).collect();
        Ok(SearchResponse {
            bounding_region: Region::bounding(&coords),
            results,
        })
    }

    async fn reverse_geocode(&self, coord: Coordinate) -> Result<Placemark, SearchServiceError> {
        let row: ReverseRow = self
            .inner
            .get(self.endpoint("reverse"))
            .query(&[
                ("lat", coord.lat.to_string()),
                ("lon", coord.lon.to_string()),
                ("format", "jsonv2".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(row.into_placemark())
    }

    async fn autocomplete(
        &self,
        fragment: &str,
        region_hint: Option<Region>,
    ) -> Result<Vec<Suggestion>, SearchServiceError> {
        let rows = self.run_search(fragment, region_hint, SUGGESTION_LIMIT).await?;
        Ok(rows
            .into_iter()
            .map(|row| Suggestion {
                title: if row.name.is_empty() {
                    row.display_name
                        .split(',')
                        .next()
                        .unwrap_or_default()
                        .to_string()
                } else {
                    row.name.clone()
                },
                subtitle: row.display_name,
            })
            .collect())
    }
}

/// One row of a jsonv2 search response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct SearchRow {
    lat: String,
    lon: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    boundingbox: Option<[String; 4]>,
}

impl SearchRow {
    fn into_result(self) -> Result<SearchResult, SearchServiceError> {
        let coord = Coordinate::new(parse_f64(&self.lat)?, parse_f64(&self.lon)?);
        let region = match &self.boundingbox {
            // Order per Nominatim: min_lat, max_lat, min_lon, max_lon.
            Some([min_lat, max_lat, min_lon, max_lon]) => Region::bounding(&[
                Coordinate::new(parse_f64(min_lat)?, parse_f64(min_lon)?),
                Coordinate::new(parse_f64(max_lat)?, parse_f64(max_lon)?),
            ]),
            None => None,
        };
        let title = if self.name.is_empty() {
            self.display_name
                .split(',')
                .next()
                .unwrap_or_default()
                .to_string()
        } else {
            self.name
        };
        Ok(SearchResult {
            title,
            subtitle: self.display_name,
            coord,
            category: self.category,
            region,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReverseRow {
    #[serde(default)]
    address: ReverseAddress,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
}

impl ReverseRow {
    fn into_placemark(self) -> Placemark {
        let addr = self.address;
        Placemark {
            country: addr.country,
            iso_country_code: addr.country_code.map(|c| c.to_uppercase()),
            locality: addr.city.or(addr.town).or(addr.village),
            // Nominatim does not report time zones.
            utc_offset_secs: None,
        }
    }
}

fn parse_f64(s: &str) -> Result<f64, SearchServiceError> {
    s.parse::<f64>()
        .map_err(|_| SearchServiceError::Decode(format!("bad coordinate: {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{Expectation, Server, matchers::*, responders::*};

    #[tokio::test]
    async fn search_parses_rows_and_bounds() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/search")).respond_with(
                json_encoded(serde_json::json!([
                    {
                        "lat": "41.8902",
                        "lon": "12.4922",
                        "name": "Colosseum",
                        "display_name": "Colosseum, Rome, Italy",
                        "category": "historic",
                        "boundingbox": ["41.8893", "41.8911", "12.4907", "12.4938"]
                    },
                    {
                        "lat": "48.8584",
                        "lon": "2.2945",
                        "name": "",
                        "display_name": "Eiffel Tower, Paris, France"
                    }
                ])),
            ),
        );

        let client = NominatimClient::new(server.url_str("")).unwrap();
        let response = client
            .search(&SearchQuery::Text("landmark".into()), None)
            .await
            .unwrap();

        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].title, "Colosseum");
        assert_eq!(response.results[0].category.as_deref(), Some("historic"));
        assert!(response.results[0].region.is_some());
        // Falls back to the first display-name segment when name is empty.
        assert_eq!(response.results[1].title, "Eiffel Tower");
        let region = response.bounding_region.unwrap();
        let (min_lat, _, max_lat, _) = region.corners();
        assert!(min_lat <= 41.8902 && max_lat >= 48.8584);
    }

    #[tokio::test]
    async fn reverse_geocode_builds_placemark() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/reverse")).respond_with(
                json_encoded(serde_json::json!({
                    "display_name": "Rome, Italy",
                    "address": {
                        "city": "Rome",
                        "country": "Italy",
                        "country_code": "it"
                    }
                })),
            ),
        );

        let client = NominatimClient::new(server.url_str("")).unwrap();
        let placemark = client
            .reverse_geocode(Coordinate::new(41.9, 12.5))
            .await
            .unwrap();

        assert_eq!(placemark.country.as_deref(), Some("Italy"));
        assert_eq!(placemark.iso_country_code.as_deref(), Some("IT"));
        assert_eq!(placemark.locality.as_deref(), Some("Rome"));
        assert_eq!(placemark.utc_offset_secs, None);
    }

    #[tokio::test]
    async fn http_error_surfaces_as_service_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/search"))
                .respond_with(status_code(503)),
        );

        let client = NominatimClient::new(server.url_str("")).unwrap();
        let err = client
            .search(&SearchQuery::Text("anything".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchServiceError::Http(_)));
    }

    #[tokio::test]
    async fn autocomplete_maps_rows_to_suggestions() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/search")).respond_with(
                json_encoded(serde_json::json!([
                    {"lat": "48.85", "lon": "2.35", "name": "Paris", "display_name": "Paris, France"}
                ])),
            ),
        );

        let client = NominatimClient::new(server.url_str("")).unwrap();
        let suggestions = client.autocomplete("par", None).await.unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Paris");
        assert_eq!(suggestions[0].subtitle, "Paris, France");
    }
}
