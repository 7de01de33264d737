//! Repository implementations for SQLite storage

pub mod login_attempt;
pub mod product;
pub mod user;

pub use login_attempt::SqliteLoginAttemptRepository;
pub use product::SqliteProductRepository;
pub use user::SqliteUserRepository;

use async_trait::async_trait;
use emporium_core::{
    Error,
    error::StorageError,
    repositories::{ProductRepositoryProvider, RepositoryProvider, UserRepositoryProvider},
};
use emporium_migration::MigrationManager;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::migrations::{self, SqliteMigrationManager};

/// Repository provider implementation for SQLite
///
/// Login attempts are not part of the provider; call
/// [`login_attempts`](Self::login_attempts) when the throttle should share
/// this database.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: Arc<SqliteUserRepository>,
    product: Arc<SqliteProductRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let user = Arc::new(SqliteUserRepository::new(pool.clone()));
        let product = Arc::new(SqliteProductRepository::new(pool.clone()));

        Self {
            pool,
            user,
            product,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A login attempt repository backed by the same pool.
    pub fn login_attempts(&self) -> SqliteLoginAttemptRepository {
        SqliteLoginAttemptRepository::new(self.pool.clone())
    }
}

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl ProductRepositoryProvider for SqliteRepositoryProvider {
    type ProductRepo = SqliteProductRepository;

    fn product(&self) -> &Self::ProductRepo {
        &self.product
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        manager.up(&migrations::all()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(())
    }
}
