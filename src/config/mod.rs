use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";


/// Resolved runtime configuration: CLI args over environment variables over
/// the config file over defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the place database, preferences and log file.
    pub data_dir: PathBuf,
    pub nominatim_url: String,
    pub log_level: String,
}

/// Optional values as they appear in `config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub nominatim_url: Option<String>,
    pub log_level: Option<String>,
}

impl AppConfig {
    pub fn from_cli(cli: crate::Cli) -> Result<Self> {
        let file_cfg = load_file_config().unwrap_or_default();

        let data_dir = cli
            .data_dir
            .or_else(|| std::env::var("TRAILMARK_DATA_DIR").ok().map(PathBuf::from))
            .or(file_cfg.data_dir)
            .or_else(|| dirs::data_dir().map(|d| d.join("trailmark")))
            .unwrap_or_else(|| PathBuf::from(".trailmark"));

        let nominatim_url = if cli.nominatim_url.is_empty() {
            std::env::var("TRAILMARK_NOMINATIM_URL")
                .ok()
                .or(file_cfg.nominatim_url)
                .unwrap_or_else(|| DEFAULT_NOMINATIM_URL.to_string())
        } else {
            cli.nominatim_url
        };

        let log_level = if cli.log_level.is_empty() {
            std::env::var("TRAILMARK_LOG")
                .ok()
                .or(file_cfg.log_level)
                .unwrap_or_else(|| "info".to_string())
        } else {
            cli.log_level
        };

        Ok(Self {
            data_dir,
            nominatim_url,
            log_level,
        })
    }
}

/// Read a specific config file. Parse failures are downgraded to defaults so
/// a broken file never blocks startup.
pub fn read_file_config(path: &Path) -> Result<FileConfig> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("read config file: {}", path.display()))?;
    match toml::from_str::<FileConfig>(&s) {
        Ok(cfg) => {
            info!(path = %path.display(), "loaded config file");
            Ok(cfg)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e.to_string(), "parse config failed");
            Ok(FileConfig::default())
        }
    }
}

/// Locate and read the first existing config file.
pub fn load_file_config() -> Result<FileConfig> {
    for p in candidate_paths() {
        if p.exists() {
            return read_file_config(&p);
        }
    }
    Ok(FileConfig::default())
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut v = Vec::new();
    if let Ok(p) = std::env::var("TRAILMARK_CONFIG") {
        v.push(PathBuf::from(p));
    }
    if let Some(config_dir) = dirs::config_dir() {
        v.push(config_dir.join("trailmark/config.toml"));
    }
    v
}
