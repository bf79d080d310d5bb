use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::place::SortKey;

#[cfg(test)]
mod tests;

const PREFS_FILE: &str = "prefs.json";

#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("failed to create preferences directory: {0}")]
    CreateDir(std::io::Error),
    #[error("failed to write preferences: {0}")]
    Write(std::io::Error),
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Small persisted key/value state living outside the place database. Every
/// field has a typed default so a missing or partial file never fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefs {
    /// Recent search queries, oldest first; the most recent entry is last.
    pub recent_searches: Vec<String>,
    pub sort_by: SortKey,
    pub ascending: bool,
    pub completed_first_launch: bool,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            recent_searches: Vec::new(),
            sort_by: SortKey::Name,
            ascending: false,
            completed_first_launch: false,
        }
    }
}

impl Prefs {
    /// Insertion order is recency: dedup case-insensitively, then append, so
    /// a resubmitted query moves to the most-recent slot with its new casing.
    pub fn add_recent_search(&mut self, query: &str) {
        self.remove_recent_search(query);
        self.recent_searches.push(query.to_string());
    }

    pub fn remove_recent_search(&mut self, query: &str) {
        let lowered = query.to_lowercase();
        self.recent_searches
            .retain(|s| s.to_lowercase() != lowered);
    }

    /// Recent searches, most recent first, for display.
    pub fn recent_searches_newest_first(&self) -> impl Iterator<Item = &str> {
        self.recent_searches.iter().rev().map(String::as_str)
    }
}

/// File-backed storage for [`Prefs`].
#[derive(Debug, Clone)]
pub struct PrefsFile {
    path: PathBuf,
}

impl PrefsFile {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(PrefsError::CreateDir)?;
        Ok(Self {
            path: dir.join(PREFS_FILE),
        })
    }

    /// Load preferences, falling back to defaults when the file is missing
    /// or unreadable. A corrupt file is logged and replaced on next save.
    pub fn load(&self) -> Prefs {
        match fs::read_to_string(&self.path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "corrupt prefs file, using defaults");
                    Prefs::default()
                }
            },
            Err(_) => Prefs::default(),
        }
    }

    pub fn save(&self, prefs: &Prefs) -> Result<(), PrefsError> {
        let json = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, json).map_err(|e| {
            error!(path = %self.path.display(), "failed to write prefs file");
            PrefsError::Write(e)
        })
    }
}
