//! SQLite storage backend for emporium
//!
//! Provides [`SqliteRepositoryProvider`], which implements every repository
//! trait from `emporium-core` on top of a single [`SqlitePool`], and
//! [`SqliteLoginAttemptRepository`] for deployments that want throttle state
//! to survive a restart.
//!
//! ```rust,ignore
//! use emporium_core::repositories::RepositoryProvider;
//! use emporium_storage_sqlite::connect;
//!
//! let provider = connect("sqlite://emporium.db").await?;
//! provider.migrate().await?;
//! ```
pub mod migrations;
pub mod repositories;

use std::str::FromStr;

use emporium_core::{Error, error::StorageError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use repositories::{
    SqliteLoginAttemptRepository, SqliteProductRepository, SqliteRepositoryProvider,
    SqliteUserRepository,
};
pub use sqlx::SqlitePool;

/// Open a pool for `database_url`, creating the file if it does not exist.
///
/// In-memory databases are limited to a single connection, since each
/// connection would otherwise see its own empty database.
pub async fn connect(database_url: &str) -> Result<SqliteRepositoryProvider, Error> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .create_if_missing(true);

    let max_connections = if database_url.contains(":memory:") {
        1
    } else {
        5
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to database");
            StorageError::Connection(e.to_string())
        })?;

    Ok(SqliteRepositoryProvider::new(pool))
}
