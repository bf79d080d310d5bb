use super::*;
use tempfile::tempdir;

#[test]
fn recent_search_dedup_is_case_insensitive_and_keeps_latest_casing() {
    let mut prefs = Prefs::default();
    prefs.add_recent_search("Paris");
    prefs.add_recent_search("Rome");
    prefs.add_recent_search("paris");

    assert_eq!(prefs.recent_searches, vec!["Rome", "paris"]);
    let newest: Vec<&str> = prefs.recent_searches_newest_first().collect();
    assert_eq!(newest, vec!["paris", "Rome"]);

    prefs.remove_recent_search("ROME");
    assert_eq!(prefs.recent_searches, vec!["paris"]);
}

#[test]
fn single_query_history_stays_length_one() {
    let mut prefs = Prefs::default();
    prefs.add_recent_search("Paris");
    prefs.add_recent_search("paris");
    assert_eq!(prefs.recent_searches, vec!["paris"]);
}

#[test]
fn load_returns_defaults_when_missing_and_round_trips() {
    let dir = tempdir().expect("create temp dir");
    let file = PrefsFile::new(dir.path().join("trailmark")).expect("create prefs dir");

    let loaded = file.load();
    assert_eq!(loaded, Prefs::default());
    assert!(!loaded.completed_first_launch);

    let mut prefs = loaded;
    prefs.add_recent_search("Lisbon");
    prefs.sort_by = SortKey::Country;
    prefs.ascending = true;
    prefs.completed_first_launch = true;
    file.save(&prefs).expect("save prefs");

    let reloaded = file.load();
    assert_eq!(reloaded, prefs);
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let dir = tempdir().expect("create temp dir");
    let file = PrefsFile::new(dir.path()).expect("create prefs dir");
    std::fs::write(dir.path().join("prefs.json"), "{not json").unwrap();
    assert_eq!(file.load(), Prefs::default());
}
