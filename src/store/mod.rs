//! SQLite persistence for places.
pub mod connection;
pub mod dao;
pub mod entity;
pub mod error;
pub mod migration;

pub use connection::{connect_database, default_db_path};
pub use dao::PlaceStore;
pub use error::StoreError;
pub use migration::run_migrations;
