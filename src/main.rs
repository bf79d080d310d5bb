mod app;
mod cli;
mod collection;
mod config;
mod geo;
mod logging;
mod map;
mod place;
mod prefs;
mod search;
mod store;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::app::{AppState, AuthStatus};
use crate::cli::Command;
use crate::collection::apply_zoom;
use crate::config::AppConfig;
use crate::geo::{Coordinate, Region};
use crate::map::ConsoleMap;
use crate::place::{Place, PlaceFilter, Placemark, SortKey};
use crate::prefs::PrefsFile;
use crate::search::SearchTicket;
use crate::search::nominatim::NominatimClient;
use crate::search::service::{
    SearchQuery, SearchResponse, SearchService, SearchServiceError, Suggestion,
};
use crate::store::{PlaceStore, connect_database, default_db_path, run_migrations};

#[derive(Parser, Debug, Clone)]
#[command(name = "tmk", version, about = "Pin and browse the places you have been")]
pub struct Cli {
    /// Directory for the place database, preferences and logs
    #[arg(long)]
    data_dir: Option<std::path::PathBuf>,

    /// Base URL of the Nominatim geocoding service
    #[arg(long, default_value = "")]
    nominatim_url: String,

    /// Log level (error,warn,info,debug,trace)
    #[arg(long, default_value = "")]
    log_level: String,
}

/// Completions of work dispatched onto background tasks.
enum Event {
    SearchDone {
        generation: u64,
        outcome: Result<SearchResponse, SearchServiceError>,
    },
    SuggestDone {
        generation: u64,
        suggestions: Vec<Suggestion>,
    },
    Geocoded {
        id: Uuid,
        placemark: Placemark,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    let cli = Cli::parse();
    let cfg = AppConfig::from_cli(cli)?;

    std::fs::create_dir_all(&cfg.data_dir)
        .with_context(|| format!("create data dir: {}", cfg.data_dir.display()))?;
    logging::init_logging(&cfg.log_level, &cfg.data_dir.join("tmk.log"))?;

    run_cli_loop(cfg).await
}

async fn run_cli_loop(cfg: AppConfig) -> Result<()> {
    let conn = connect_database(&default_db_path(&cfg.data_dir))
        .await
        .context("open place database")?;
    run_migrations(&conn).await.context("migrate place database")?;

    let store = PlaceStore::new(conn);
    let prefs_file = PrefsFile::new(&cfg.data_dir)?;
    let mut state = AppState::new(store, prefs_file);
    let service = Arc::new(NominatimClient::new(&cfg.nominatim_url)?);
    let mut map = ConsoleMap;

    if state.take_first_launch() {
        println!("Welcome to trailmark. Type /help for commands.");
    }
    state.load_places(&mut map).await;
    println!("{} places loaded.", state.collection.places().len());

    let (tx, mut rx) = mpsc::channel::<Event>(32);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match cli::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(cmd) => {
                        handle_command(cmd, &mut state, &mut map, &service, &tx).await;
                    }
                    Err(usage) => println!("{usage}"),
                }
            }
            Some(event) = rx.recv() => {
                handle_event(event, &mut state, &mut map).await;
            }
        }
    }

    Ok(())
}

async fn handle_command(
    cmd: Command,
    state: &mut AppState,
    map: &mut ConsoleMap,
    service: &Arc<NominatimClient>,
    tx: &mpsc::Sender<Event>,
) {
    match cmd {
        Command::Help => cli::print_help(),
        Command::Quit => unreachable!("handled by the loop"),
        Command::Add {
            category,
            coord,
            name,
        } => {
            let place = Place::new(name, category, coord);
            let id = place.id;
            state.save_place(place, map).await;
            dispatch_geocode(service, tx, id, coord);
        }
        Command::Rename { from, to } => match state.collection.find_by_name(&from) {
            Some(place) => {
                let mut place = place.clone();
                place.name = to;
                state.save_place(place, map).await;
            }
            None => println!("no place named {from:?}"),
        },
        Command::Recat { category, name } => match state.collection.find_by_name(&name) {
            Some(place) => {
                let mut place = place.clone();
                place.category = category;
                state.save_place(place, map).await;
            }
            None => println!("no place named {name:?}"),
        },
        Command::Delete(name) => match state.collection.find_by_name(&name) {
            Some(place) => {
                let id = place.id;
                if let Some(removed) = state.delete_place(id, map).await {
                    println!("deleted {}", removed.name);
                }
            }
            None => println!("no place named {name:?}"),
        },
        Command::List => print_places(state),
        Command::Stats => print_stats(state),
        Command::Filter(category) => {
            state.set_filter(category.map(PlaceFilter::Category), map);
            print_places(state);
        }
        Command::Find(text) => {
            state.set_search_text(&text, map);
            print_places(state);
        }
        Command::Sort(key) => {
            if key == SortKey::Distance
                && state.collection.user_position().is_none()
                && !state.validate_auth()
            {
                println!("location permission denied; distances unavailable (/locate <lat> <lon>)");
            }
            state.set_sort(key, map);
            let dir = if state.collection.ascending() { "asc" } else { "desc" };
            println!("sorted by {} ({dir})", state.collection.sort_by().as_str());
            print_places(state);
        }
        Command::Search(query) => {
            let ticket = state.submit_search(SearchQuery::Text(query), map);
            dispatch_search(service, tx, ticket, region_hint(state));
            println!("searching...");
        }
        Command::Suggest(fragment) => {
            match state.search.set_fragment(fragment) {
                Some(generation) => {
                    let fragment = state.search.fragment().to_string();
                    dispatch_autocomplete(service, tx, generation, fragment, region_hint(state));
                }
                None => println!("(suggestions cleared)"),
            }
        }
        Command::Pick { index, category } => {
            let Some(result) = state.search.results().get(index.wrapping_sub(1)).cloned() else {
                println!("no search result #{index}");
                return;
            };
            let place = Place::new(result.title, category, result.coord);
            let id = place.id;
            state.save_place(place, map).await;
            dispatch_geocode(service, tx, id, result.coord);
        }
        Command::Recent => {
            let recents: Vec<&str> = state.prefs.recent_searches_newest_first().collect();
            if recents.is_empty() {
                println!("no recent searches");
            }
            for r in recents {
                println!("  {r}");
            }
        }
        Command::Forget(text) => state.remove_recent_search(&text),
        Command::Cancel => {
            state.search.cancel(map);
            println!("search cancelled");
        }
        Command::Locate(position) => {
            match position {
                Some(coord) => {
                    state.set_auth_status(AuthStatus::Authorized);
                    state.collection.set_user_position(Some(coord));
                    println!("position set to {coord}");
                }
                None => {
                    state.set_auth_status(AuthStatus::Denied);
                    state.collection.set_user_position(None);
                    println!("location access denied");
                }
            }
            state.collection.recompute(map);
        }
        Command::Zoom => match state.collection.zoom_target() {
            Some(target) => apply_zoom(target, map),
            None => println!("nothing to zoom to"),
        },
        Command::Share(name) => match state.collection.find_by_name(&name) {
            Some(place) => println!("{}", place.coord.share_url()),
            None => println!("no place named {name:?}"),
        },
    }
}

async fn handle_event(event: Event, state: &mut AppState, map: &mut ConsoleMap) {
    match event {
        Event::SearchDone {
            generation,
            outcome,
        } => {
            // A dropped stale outcome prints nothing; the live search will.
            if !state.search.complete(generation, outcome, map) {
                return;
            }
            let results = state.search.results();
            if results.is_empty() {
                println!("no results");
            } else {
                for (i, r) in results.iter().enumerate() {
                    println!("  {}. {} ({})", i + 1, r.title, r.subtitle);
                }
                println!("(/pick <n> to save one)");
            }
        }
        Event::SuggestDone {
            generation,
            suggestions,
        } => {
            state.search.complete_autocomplete(generation, suggestions);
            for s in state.search.completions() {
                if s.subtitle.is_empty() {
                    println!("  ? {}", s.title);
                } else {
                    println!("  ? {} ({})", s.title, s.subtitle);
                }
            }
        }
        Event::Geocoded { id, placemark } => {
            debug!(%id, "applying reverse geocode");
            state.apply_placemark(id, placemark).await;
        }
    }
}

/// Bias remote lookups towards the area the user is already looking at.
fn region_hint(state: &AppState) -> Option<Region> {
    let coords: Vec<Coordinate> = state
        .collection
        .displayed()
        .iter()
        .map(|p| p.coord)
        .collect();
    Region::bounding(&coords)
}

fn dispatch_search(
    service: &Arc<NominatimClient>,
    tx: &mpsc::Sender<Event>,
    ticket: SearchTicket,
    region_hint: Option<Region>,
) {
    let service = Arc::clone(service);
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = tokio::select! {
            _ = ticket.cancel.cancelled() => return,
            outcome = service.search(&ticket.query, region_hint) => outcome,
        };
        let _ = tx
            .send(Event::SearchDone {
                generation: ticket.generation,
                outcome,
            })
            .await;
    });
}

fn dispatch_autocomplete(
    service: &Arc<NominatimClient>,
    tx: &mpsc::Sender<Event>,
    generation: u64,
    fragment: String,
    region_hint: Option<Region>,
) {
    let service = Arc::clone(service);
    let tx = tx.clone();
    tokio::spawn(async move {
        match service.autocomplete(&fragment, region_hint).await {
            Ok(suggestions) => {
                let _ = tx
                    .send(Event::SuggestDone {
                        generation,
                        suggestions,
                    })
                    .await;
            }
            Err(e) => warn!(error = %e, "autocomplete failed"),
        }
    });
}

/// Best-effort placemark backfill after a place is saved. Failures are
/// logged and the place simply keeps an empty subtitle.
fn dispatch_geocode(
    service: &Arc<NominatimClient>,
    tx: &mpsc::Sender<Event>,
    id: Uuid,
    coord: Coordinate,
) {
    let service = Arc::clone(service);
    let tx = tx.clone();
    tokio::spawn(async move {
        match service.reverse_geocode(coord).await {
            Ok(placemark) => {
                let _ = tx.send(Event::Geocoded { id, placemark }).await;
            }
            Err(e) => warn!(error = %e, "reverse geocode failed"),
        }
    });
}

fn print_places(state: &AppState) {
    let displayed = state.collection.displayed();
    if displayed.is_empty() {
        println!("(no places)");
        return;
    }
    if state.collection.is_filtering() {
        println!("{} places found", displayed.len());
    }
    for (i, p) in displayed.iter().enumerate() {
        // subtitle() always carries at least the category.
        println!("  {}. {} ({})", i + 1, p.name, p.subtitle());
    }
}

fn print_stats(state: &AppState) {
    let c = &state.collection;
    println!(
        "{} places, {} countries visited",
        c.places().len(),
        c.countries_visited()
    );
    let mut cats: Vec<&str> = c.categories_present().iter().map(|c| c.as_str()).collect();
    cats.sort_unstable();
    println!("categories: {}", cats.join(", "));
    if let Some(PlaceFilter::Category(cat)) = c.filter() {
        println!("filter: {cat}");
    }
    if state.show_auth_error {
        println!("! location access is denied; distance sorting is unavailable");
    }
}
