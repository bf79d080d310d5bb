use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Logs go to a file inside the data directory so they never interleave
/// with the interactive prompt.
pub fn init_logging(level: &str, log_path: &Path) -> Result<()> {
    let log_file = std::sync::Arc::new(std::fs::File::create(log_path)?);
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    info!("logging initialized");
    Ok(())
}
