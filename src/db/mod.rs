pub mod connection;
pub mod error;
pub mod migrate;

pub use connection::{build_postgres_url, check_health, connect_pool, DbSettings, StoreBackend};
pub use error::{DbError, Result};
pub use migrate::run_migrations;
