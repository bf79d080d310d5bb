use super::*;
use crate::geo::{Coordinate, Region};
use crate::map::testing::RecordingMap;

fn result(title: &str, lat: f64, lon: f64) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        subtitle: String::new(),
        coord: Coordinate::new(lat, lon),
        category: None,
        region: None,
    }
}

fn response(results: Vec<SearchResult>) -> SearchResponse {
    let coords: Vec<Coordinate> = results.iter().map(|r| r.coord).collect();
    SearchResponse {
        bounding_region: Region::bounding(&coords),
        results,
    }
}

#[test]
fn only_latest_submission_surfaces_results() {
    let mut map = RecordingMap::default();
    let mut prefs = Prefs::default();
    let mut search = SearchOrchestrator::new();

    let t1 = search.submit(SearchQuery::Text("cafe".into()), &mut prefs, &mut map);
    let t2 = search.submit(SearchQuery::Text("museum".into()), &mut prefs, &mut map);
    assert!(t1.cancel.is_cancelled(), "superseded search must be cancelled");
    assert!(!t2.cancel.is_cancelled());

    // Q2 completes first, then Q1's late outcome arrives.
    let applied = search.complete(
        t2.generation,
        Ok(response(vec![result("Museum", 1.0, 1.0), result("Gallery", 2.0, 2.0)])),
        &mut map,
    );
    assert!(applied);
    let applied = search.complete(
        t1.generation,
        Ok(response(vec![result("Cafe", 9.0, 9.0)])),
        &mut map,
    );
    assert!(!applied, "stale outcome must report as dropped");

    let titles: Vec<&str> = search.results().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Museum", "Gallery"]);
    assert_eq!(search.state(), SearchState::Completed);
    assert!(!search.is_loading());
}

#[test]
fn late_outcome_after_explicit_cancel_is_dropped() {
    let mut map = RecordingMap::default();
    let mut prefs = Prefs::default();
    let mut search = SearchOrchestrator::new();

    let ticket = search.submit(SearchQuery::Text("harbour".into()), &mut prefs, &mut map);
    assert_eq!(search.state(), SearchState::Searching);
    assert!(search.is_loading());

    search.cancel(&mut map);
    assert_eq!(search.state(), SearchState::Idle);
    assert!(!search.is_loading());
    assert!(ticket.cancel.is_cancelled());

    let applied =
        search.complete(ticket.generation, Ok(response(vec![result("Harbour", 1.0, 1.0)])), &mut map);
    assert!(!applied);
    assert!(search.results().is_empty());
}

#[test]
fn single_result_is_auto_selected_and_fitted() {
    let mut map = RecordingMap::default();
    let mut prefs = Prefs::default();
    let mut search = SearchOrchestrator::new();

    let ticket = search.submit(SearchQuery::Text("colosseum".into()), &mut prefs, &mut map);
    search.complete(
        ticket.generation,
        Ok(response(vec![result("Colosseum", 41.89, 12.49)])),
        &mut map,
    );

    assert_eq!(search.selected().map(|r| r.title.as_str()), Some("Colosseum"));
    assert_eq!(map.selected.len(), 1);
    assert_eq!(map.fitted.len(), 1);
}

#[test]
fn several_results_fit_the_bounding_region_without_selection() {
    let mut map = RecordingMap::default();
    let mut prefs = Prefs::default();
    let mut search = SearchOrchestrator::new();

    let ticket = search.submit(SearchQuery::Text("station".into()), &mut prefs, &mut map);
    search.complete(
        ticket.generation,
        Ok(response(vec![result("North", 1.0, 1.0), result("South", -1.0, -1.0)])),
        &mut map,
    );

    assert!(search.selected().is_none());
    assert!(map.selected.is_empty());
    assert_eq!(map.fitted.len(), 1);
    assert_eq!(map.added_titles(), vec!["North", "South"]);
}

#[test]
fn failure_and_empty_results_become_silent_empty_state() {
    let mut map = RecordingMap::default();
    let mut prefs = Prefs::default();
    let mut search = SearchOrchestrator::new();

    let ticket = search.submit(SearchQuery::Text("nowhere".into()), &mut prefs, &mut map);
    let applied = search.complete(
        ticket.generation,
        Err(SearchServiceError::Decode("boom".into())),
        &mut map,
    );
    assert!(applied, "a failure outcome still lands");
    assert!(search.results().is_empty());
    assert_eq!(search.state(), SearchState::Failed);
    assert!(!search.is_loading());

    let ticket = search.submit(SearchQuery::Text("nothing".into()), &mut prefs, &mut map);
    search.complete(ticket.generation, Ok(response(vec![])), &mut map);
    assert!(search.results().is_empty());
    assert_eq!(search.state(), SearchState::Completed);
    assert_eq!(map.call_count(), 0, "empty outcomes emit no annotations");
}

#[test]
fn new_search_replaces_previous_result_annotations() {
    let mut map = RecordingMap::default();
    let mut prefs = Prefs::default();
    let mut search = SearchOrchestrator::new();

    let ticket = search.submit(SearchQuery::Text("cafe".into()), &mut prefs, &mut map);
    search.complete(
        ticket.generation,
        Ok(response(vec![result("Cafe A", 1.0, 1.0), result("Cafe B", 2.0, 2.0)])),
        &mut map,
    );
    map.clear();

    let ticket = search.submit(SearchQuery::Text("bar".into()), &mut prefs, &mut map);
    let mut removed = map.removed_titles();
    removed.sort();
    assert_eq!(removed, vec!["Cafe A", "Cafe B"]);
    search.complete(ticket.generation, Ok(response(vec![result("Bar", 3.0, 3.0)])), &mut map);
    assert_eq!(search.results().len(), 1);
}

#[test]
fn submit_records_query_into_history() {
    let mut map = RecordingMap::default();
    let mut prefs = Prefs::default();
    let mut search = SearchOrchestrator::new();

    search.submit(SearchQuery::Text("Paris".into()), &mut prefs, &mut map);
    search.submit(
        SearchQuery::Completion(Suggestion {
            title: "Rome".into(),
            subtitle: "Italy".into(),
        }),
        &mut prefs,
        &mut map,
    );
    search.submit(SearchQuery::Text("paris".into()), &mut prefs, &mut map);

    assert_eq!(prefs.recent_searches, vec!["Rome", "paris"]);
}

#[test]
fn autocomplete_latest_generation_wins() {
    let mut search = SearchOrchestrator::new();

    let g1 = search.set_fragment("pa").unwrap();
    let g2 = search.set_fragment("par").unwrap();

    // The older request lands after the newer one: it must be dropped.
    search.complete_autocomplete(
        g2,
        vec![Suggestion {
            title: "Paris".into(),
            subtitle: "France".into(),
        }],
    );
    search.complete_autocomplete(
        g1,
        vec![Suggestion {
            title: "Palermo".into(),
            subtitle: "Italy".into(),
        }],
    );

    let titles: Vec<&str> = search.completions().iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Paris"]);

    // Clearing the fragment clears the list and stops the subscription.
    assert!(search.set_fragment("").is_none());
    assert!(search.completions().is_empty());
}
