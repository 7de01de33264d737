//! Versioned schema migrations
//!
//! A storage backend lists its [`Migration`]s and hands them to a
//! [`MigrationManager`], which records what has been applied in a bookkeeping
//! table and runs the rest in version order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emporium_core::error::StorageError;
use sqlx::Database;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MigrationError> for emporium_core::Error {
    fn from(e: MigrationError) -> Self {
        StorageError::Migration(e.to_string()).into()
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[async_trait]
pub trait Migration<DB: Database>: Send + Sync {
    /// Execute the migration
    async fn up<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Rollback the migration
    async fn down<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Unique version number for ordering migrations
    fn version(&self) -> i64;

    /// Human readable name of the migration
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    /// Unix timestamp, seconds
    pub applied_at: i64,
}

impl MigrationRecord {
    pub fn applied_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.applied_at, 0)
    }
}

/// The migrations from `migrations` whose version is not in `applied`,
/// lowest version first.
pub fn pending<'m, DB: Database>(
    migrations: &'m [Box<dyn Migration<DB>>],
    applied: &[MigrationRecord],
) -> Vec<&'m dyn Migration<DB>> {
    let mut pending: Vec<&dyn Migration<DB>> = migrations
        .iter()
        .map(|m| m.as_ref())
        .filter(|m| !applied.iter().any(|r| r.version == m.version()))
        .collect();
    pending.sort_by_key(|m| m.version());
    tracing::debug!(
        pending = pending.len(),
        applied = applied.len(),
        "Computed pending migrations"
    );
    pending
}

#[async_trait]
pub trait MigrationManager<DB: Database>: Send + Sync {
    fn get_migration_table_name(&self) -> &str {
        "_emporium_migrations"
    }

    /// Initialize migration tracking table
    async fn initialize(&self) -> Result<()>;

    /// Apply pending migrations
    async fn up(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Rollback migrations
    async fn down(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Get list of applied migrations
    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>>;

    /// Check if specific migration was applied
    async fn is_applied(&self, version: i64) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Any;

    struct Noop(i64);

    #[async_trait]
    impl Migration<Any> for Noop {
        async fn up<'a>(&'a self, _conn: &'a mut <Any as Database>::Connection) -> Result<()> {
            Ok(())
        }

        async fn down<'a>(&'a self, _conn: &'a mut <Any as Database>::Connection) -> Result<()> {
            Ok(())
        }

        fn version(&self) -> i64 {
            self.0
        }

        fn name(&self) -> &str {
            "Noop"
        }
    }

    fn record(version: i64) -> MigrationRecord {
        MigrationRecord {
            version,
            name: "Noop".to_string(),
            applied_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_pending_skips_applied_and_sorts() {
        let migrations: Vec<Box<dyn Migration<Any>>> =
            vec![Box::new(Noop(3)), Box::new(Noop(1)), Box::new(Noop(2))];

        let versions: Vec<i64> = pending(&migrations, &[record(2)])
            .iter()
            .map(|m| m.version())
            .collect();
        assert_eq!(versions, vec![1, 3]);
    }

    #[test]
    fn test_nothing_pending_when_all_applied() {
        let migrations: Vec<Box<dyn Migration<Any>>> = vec![Box::new(Noop(1))];
        assert!(pending(&migrations, &[record(1)]).is_empty());
    }

    #[test]
    fn test_migration_error_maps_to_storage_error() {
        let error: emporium_core::Error = MigrationError::Migration("boom".to_string()).into();
        assert!(matches!(
            error,
            emporium_core::Error::Storage(StorageError::Migration(_))
        ));
        assert_eq!(record(0).applied_at().map(|t| t.timestamp()), Some(1_700_000_000));
    }
}
