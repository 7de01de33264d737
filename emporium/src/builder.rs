//! Builder pattern for constructing Emporium instances
//!
//! The builder uses a type-state parameter so that [`EmporiumBuilder::build`]
//! is only available once storage has been configured.
//!
//! # Example
//!
//! ```rust,no_run
//! use emporium::{EmporiumBuilder, TokenConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let emporium = EmporiumBuilder::new()
//!         .with_sqlite("sqlite://emporium.db")
//!         .await?
//!         .with_sqlite_login_attempts()
//!         .with_token_config(TokenConfig::new("a-secret-of-at-least-thirty-two-bytes")?)
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     emporium.health_check().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use emporium_core::{
    clock::{Clock, SystemClock},
    crypto::{Argon2Hasher, PasswordHasher},
    repositories::{InMemoryLoginAttemptRepository, LoginAttemptRepository, RepositoryProvider},
    storage::LoginThrottleConfig,
    token::TokenConfig,
};

use crate::Emporium;

/// Errors that can occur when building an Emporium instance.
#[derive(Debug, thiserror::Error)]
pub enum EmporiumBuilderError {
    /// Failed to connect to storage backend
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    /// Failed to run database migrations
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Marker type indicating no storage has been configured yet.
pub struct NoStorage;

/// Marker type indicating storage has been configured.
pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

/// A type-safe builder for constructing [`Emporium`] instances.
pub struct EmporiumBuilder<Storage> {
    storage: Storage,
    token_config: Option<TokenConfig>,
    throttle_config: LoginThrottleConfig,
    login_attempts: Option<Arc<dyn LoginAttemptRepository>>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    apply_migrations: bool,
}

impl Default for EmporiumBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl EmporiumBuilder<NoStorage> {
    /// Create a new builder with default configuration.
    ///
    /// # Defaults
    ///
    /// - Login throttle: 5 attempts, 30 minute lockout, in-memory store
    /// - Tokens: random secret (tokens do not survive a restart)
    /// - Password hashing: Argon2
    /// - Apply migrations: false
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            token_config: None,
            throttle_config: LoginThrottleConfig::default(),
            login_attempts: None,
            hasher: Arc::new(Argon2Hasher),
            clock: Arc::new(SystemClock),
            apply_migrations: false,
        }
    }

    /// Use an already constructed repository provider.
    pub fn with_repositories<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> EmporiumBuilder<WithStorage<R>> {
        EmporiumBuilder {
            storage: WithStorage { repositories },
            token_config: self.token_config,
            throttle_config: self.throttle_config,
            login_attempts: self.login_attempts,
            hasher: self.hasher,
            clock: self.clock,
            apply_migrations: self.apply_migrations,
        }
    }
}

#[cfg(feature = "sqlite")]
impl EmporiumBuilder<NoStorage> {
    /// Configure SQLite storage by connecting to the given URL.
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection URL (e.g., "sqlite::memory:" or "sqlite://path/to/db.sqlite")
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<EmporiumBuilder<WithStorage<crate::SqliteRepositoryProvider>>, EmporiumBuilderError>
    {
        let provider = emporium_storage_sqlite::connect(url)
            .await
            .map_err(|e| EmporiumBuilderError::StorageConnection(e.to_string()))?;

        Ok(self.with_repositories(Arc::new(provider)))
    }

    /// Configure SQLite storage with an existing connection pool.
    pub fn with_sqlite_pool(
        self,
        pool: emporium_storage_sqlite::SqlitePool,
    ) -> EmporiumBuilder<WithStorage<crate::SqliteRepositoryProvider>> {
        self.with_repositories(Arc::new(crate::SqliteRepositoryProvider::new(pool)))
    }
}

#[cfg(feature = "sqlite")]
impl EmporiumBuilder<WithStorage<crate::SqliteRepositoryProvider>> {
    /// Keep login attempt records in the SQLite database instead of memory.
    ///
    /// Lockouts then survive a restart and are shared between processes
    /// using the same database file.
    pub fn with_sqlite_login_attempts(mut self) -> Self {
        let repository = self.storage.repositories.login_attempts();
        self.login_attempts = Some(Arc::new(repository));
        self
    }
}

impl<S> EmporiumBuilder<S> {
    /// Set the signing configuration for login tokens.
    pub fn with_token_config(mut self, config: TokenConfig) -> Self {
        self.token_config = Some(config);
        self
    }

    /// Set the login throttle policy.
    ///
    /// The default in-memory store takes its TTL and capacity from this
    /// configuration.
    pub fn with_login_throttle(mut self, config: LoginThrottleConfig) -> Self {
        self.throttle_config = config;
        self
    }

    /// Use a custom store for login attempt records.
    pub fn with_login_attempt_repository(
        mut self,
        repository: Arc<dyn LoginAttemptRepository>,
    ) -> Self {
        self.login_attempts = Some(repository);
        self
    }

    /// Use a custom password hasher.
    pub fn with_password_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Use a custom time source for the login throttle.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set whether to automatically apply database migrations during build.
    ///
    /// Default: false
    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }
}

impl<R: RepositoryProvider> EmporiumBuilder<WithStorage<R>> {
    /// Build the Emporium instance.
    ///
    /// If `apply_migrations(true)` was called, migrations are applied before
    /// returning.
    pub async fn build(self) -> Result<Emporium<R>, EmporiumBuilderError> {
        if self.apply_migrations {
            self.storage
                .repositories
                .migrate()
                .await
                .map_err(|e| EmporiumBuilderError::Migration(e.to_string()))?;
        }

        let tokens = match self.token_config {
            Some(config) => config,
            None => {
                tracing::warn!("No token secret configured, using a random one");
                TokenConfig::new_random()
                    .map_err(|e| EmporiumBuilderError::InvalidConfiguration(e.to_string()))?
            }
        };

        let login_attempts = self.login_attempts.unwrap_or_else(|| {
            Arc::new(InMemoryLoginAttemptRepository::new(&self.throttle_config))
        });

        Ok(Emporium::from_parts(
            self.storage.repositories,
            tokens,
            self.throttle_config,
            login_attempts,
            self.hasher,
            self.clock,
        ))
    }
}
