use std::path::Path;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

/// Connects to the SQLite database, creating the file if needed.
pub async fn connect_database(db_path: &str) -> Result<DatabaseConnection, DbErr> {
    info!("connecting to SQLite database at: {}", db_path);

    let mut opt = ConnectOptions::new(format!("sqlite://{}?mode=rwc", db_path));
    opt.max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// Default database location inside the application data directory.
pub fn default_db_path(data_dir: &Path) -> String {
    data_dir.join("places.sqlite").to_string_lossy().to_string()
}
