use crate::geo::Coordinate;
use crate::place::{PlaceCategory, SortKey};

/// A parsed interactive command. Anything not starting with `/` is treated
/// as in-list search text, mirroring typing into the search field.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Add {
        category: PlaceCategory,
        coord: Coordinate,
        name: String,
    },
    Rename {
        from: String,
        to: String,
    },
    Recat {
        category: PlaceCategory,
        name: String,
    },
    Delete(String),
    List,
    Stats,
    Filter(Option<PlaceCategory>),
    Find(String),
    Sort(SortKey),
    Search(String),
    Suggest(String),
    Pick {
        index: usize,
        category: PlaceCategory,
    },
    Recent,
    Forget(String),
    Cancel,
    Locate(Option<Coordinate>),
    Zoom,
    Share(String),
}

pub fn print_help() {
    println!(
        "/add <category> <lat> <lon> <name>  Pin a place (category: visited|wishlist|lived)\n\
         /list              Show the displayed places\n\
         /stats             Show counts: places, countries visited, categories\n\
         /filter <category|none>  Restrict the list to one category\n\
         /find [text]       Search within place names (empty clears)\n\
         /sort <name|time|distance|country>  Sort; repeating a key flips direction\n\
         /search <query>    Look up places and addresses remotely\n\
         /suggest [text]    Autocomplete suggestions for a fragment (empty clears)\n\
         /pick <n> [category]  Save search result n as a place\n\
         /recent            Show recent searches\n\
         /forget <text>     Remove one recent search\n\
         /cancel            Cancel the running search\n\
         /rename <old> -> <new>  Rename a place\n\
         /recat <category> <name>  Change a place's category\n\
         /delete <name>     Delete a place\n\
         /locate <lat> <lon>|off  Set or deny the current position\n\
         /zoom              Zoom the map to the displayed places\n\
         /share <name>      Print a shareable link for a place\n\
         /help              Show this help\n\
         /quit              Quit"
    );
}

/// Parse one input line. `Err` carries a usage message for the user.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if !line.starts_with('/') {
        return Ok(Command::Find(line.to_string()));
    }
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };
    match cmd {
        "/help" => Ok(Command::Help),
        "/quit" | "/exit" => Ok(Command::Quit),
        "/add" => parse_add(rest),
        "/rename" => match rest.split_once("->") {
            Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
                Ok(Command::Rename {
                    from: from.trim().to_string(),
                    to: to.trim().to_string(),
                })
            }
            _ => Err("usage: /rename <old name> -> <new name>".into()),
        },
        "/recat" => {
            let (cat, name) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: /recat <category> <name>")?;
            let category =
                PlaceCategory::parse(cat).ok_or_else(|| format!("unknown category: {cat}"))?;
            Ok(Command::Recat {
                category,
                name: name.trim().to_string(),
            })
        }
        "/delete" if !rest.is_empty() => Ok(Command::Delete(rest.to_string())),
        "/delete" => Err("usage: /delete <name>".into()),
        "/list" => Ok(Command::List),
        "/stats" => Ok(Command::Stats),
        "/filter" => match rest {
            "" => Err("usage: /filter <visited|wishlist|lived|none>".into()),
            "none" => Ok(Command::Filter(None)),
            other => PlaceCategory::parse(other)
                .map(|c| Command::Filter(Some(c)))
                .ok_or_else(|| format!("unknown category: {other}")),
        },
        "/find" => Ok(Command::Find(rest.to_string())),
        "/sort" => SortKey::parse(rest)
            .map(Command::Sort)
            .ok_or("usage: /sort <name|time|distance|country>".into()),
        "/search" if !rest.is_empty() => Ok(Command::Search(rest.to_string())),
        "/search" => Err("usage: /search <query>".into()),
        "/suggest" => Ok(Command::Suggest(rest.to_string())),
        "/pick" => {
            let mut parts = rest.split_whitespace();
            let index: usize = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: /pick <n> [category]")?;
            let category = match parts.next() {
                Some(c) => {
                    PlaceCategory::parse(c).ok_or_else(|| format!("unknown category: {c}"))?
                }
                None => PlaceCategory::Visited,
            };
            Ok(Command::Pick { index, category })
        }
        "/recent" => Ok(Command::Recent),
        "/forget" if !rest.is_empty() => Ok(Command::Forget(rest.to_string())),
        "/forget" => Err("usage: /forget <text>".into()),
        "/cancel" => Ok(Command::Cancel),
        "/locate" => match rest {
            "off" => Ok(Command::Locate(None)),
            other => {
                let mut parts = other.split_whitespace();
                let lat = parts.next().and_then(|s| s.parse::<f64>().ok());
                let lon = parts.next().and_then(|s| s.parse::<f64>().ok());
                match (lat, lon) {
                    (Some(lat), Some(lon)) => Ok(Command::Locate(Some(Coordinate::new(lat, lon)))),
                    _ => Err("usage: /locate <lat> <lon> | /locate off".into()),
                }
            }
        },
        "/zoom" => Ok(Command::Zoom),
        "/share" if !rest.is_empty() => Ok(Command::Share(rest.to_string())),
        "/share" => Err("usage: /share <name>".into()),
        other => Err(format!("unknown command: {other} (try /help)")),
    }
}

fn parse_add(rest: &str) -> Result<Command, String> {
    let usage = "usage: /add <category> <lat> <lon> <name>";
    let mut parts = rest.splitn(4, char::is_whitespace);
    let category = parts
        .next()
        .and_then(PlaceCategory::parse)
        .ok_or(usage)?;
    let lat = parts
        .next()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or(usage)?;
    let lon = parts
        .next()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or(usage)?;
    let name = parts.next().unwrap_or("").trim();
    // A place may only be nameless while it is being typed, never on save.
    if name.is_empty() {
        return Err(usage.to_string());
    }
    Ok(Command::Add {
        category,
        coord: Coordinate::new(lat, lon),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_multiword_name() {
        let cmd = parse("/add visited 40.7 -74.0 New York").unwrap();
        assert_eq!(
            cmd,
            Command::Add {
                category: PlaceCategory::Visited,
                coord: Coordinate::new(40.7, -74.0),
                name: "New York".to_string(),
            }
        );
        assert!(parse("/add visited 40.7 -74.0").is_err());
        assert!(parse("/add visited 40.7 -74.0   ").is_err());
        assert!(parse("/add nowhere 1 2 X").is_err());
    }

    #[test]
    fn bare_text_becomes_in_list_search() {
        assert_eq!(parse("rome"), Ok(Command::Find("rome".to_string())));
        assert_eq!(parse("/find"), Ok(Command::Find(String::new())));
    }

    #[test]
    fn parses_filter_and_sort() {
        assert_eq!(
            parse("/filter wishlist").unwrap(),
            Command::Filter(Some(PlaceCategory::Wishlist))
        );
        assert_eq!(parse("/filter none").unwrap(), Command::Filter(None));
        assert_eq!(parse("/sort country").unwrap(), Command::Sort(SortKey::Country));
        assert!(parse("/sort sideways").is_err());
    }

    #[test]
    fn parses_rename_and_pick() {
        assert_eq!(
            parse("/rename Old Town -> New Town").unwrap(),
            Command::Rename {
                from: "Old Town".to_string(),
                to: "New Town".to_string(),
            }
        );
        assert_eq!(
            parse("/pick 2 wishlist").unwrap(),
            Command::Pick {
                index: 2,
                category: PlaceCategory::Wishlist
            }
        );
        assert_eq!(
            parse("/pick 1").unwrap(),
            Command::Pick {
                index: 1,
                category: PlaceCategory::Visited
            }
        );
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse("/teleport 1 2").is_err());
    }
}
