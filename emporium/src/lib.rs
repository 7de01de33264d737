//! # Emporium
//!
//! Emporium is a small users and products backend. This crate wires a storage
//! backend into the services from `emporium-core` and exposes them through a
//! single [`Emporium`] handle that an HTTP layer (see `emporium-axum`) can
//! share across requests.
//!
//! Logins go through a throttle that locks an email for 30 minutes after
//! five consecutive failures. The user listing accepts `field:value`
//! search and sort directives plus page parameters.
//!
//! ## Example
//!
//! ```rust,no_run
//! use emporium::EmporiumBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let emporium = EmporiumBuilder::new()
//!         .with_sqlite("sqlite::memory:")
//!         .await?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let page = emporium.list_users(None, None, Some(1).into(), Some(10).into()).await?;
//!     println!("{} users", page.count);
//!     Ok(())
//! }
//! ```
mod builder;

use std::sync::Arc;

use emporium_core::{
    clock::{Clock, SystemClock},
    crypto::{Argon2Hasher, PasswordHasher},
    repositories::{
        InMemoryLoginAttemptRepository, LoginAttemptRepository, ProductRepositoryAdapter,
        RepositoryProvider, UserRepositoryAdapter,
    },
    services::{
        AuthenticationService, LoginThrottleService, PasswordCredentialVerifier,
        ProductService, UserService,
    },
    token::verify_token,
};

pub use builder::{EmporiumBuilder, EmporiumBuilderError, NoStorage, WithStorage};

/// Re-export core types from emporium_core
pub use emporium_core::{
    Error, PageParam, PageResult, Product, ProductId, User, UserId, UserSummary,
    error::{AuthError, StorageError, ValidationError},
    services::Authenticated,
    storage::LoginThrottleConfig,
    token::{TokenClaims, TokenConfig},
};

#[cfg(feature = "sqlite")]
pub use emporium_storage_sqlite::{SqliteLoginAttemptRepository, SqliteRepositoryProvider};

type UserRepo<R> = UserRepositoryAdapter<R>;
type ProductRepo<R> = ProductRepositoryAdapter<R>;

/// Handle to every service, shared by request handlers.
///
/// All methods take `&self`; wrap the handle in an `Arc` to share it.
pub struct Emporium<R: RepositoryProvider> {
    repositories: Arc<R>,
    user_service: Arc<UserService<UserRepo<R>>>,
    product_service: Arc<ProductService<ProductRepo<R>>>,
    authentication_service: Arc<AuthenticationService<PasswordCredentialVerifier<UserRepo<R>>>>,
    login_throttle: Arc<LoginThrottleService>,
}

impl<R: RepositoryProvider> Emporium<R> {
    /// Create an instance with an in-memory throttle store and Argon2 hashing.
    pub fn new(repositories: Arc<R>, tokens: TokenConfig) -> Self {
        let config = LoginThrottleConfig::default();
        let login_attempts = Arc::new(InMemoryLoginAttemptRepository::new(&config));

        Self::from_parts(
            repositories,
            tokens,
            config,
            login_attempts,
            Arc::new(Argon2Hasher),
            Arc::new(SystemClock),
        )
    }

    pub(crate) fn from_parts(
        repositories: Arc<R>,
        tokens: TokenConfig,
        throttle_config: LoginThrottleConfig,
        login_attempts: Arc<dyn LoginAttemptRepository>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));
        let product_repo = Arc::new(ProductRepositoryAdapter::new(repositories.clone()));

        let login_throttle = Arc::new(LoginThrottleService::new(
            login_attempts,
            clock,
            throttle_config,
        ));
        let verifier = Arc::new(PasswordCredentialVerifier::new(
            user_repo.clone(),
            hasher.clone(),
        ));

        Self {
            repositories,
            user_service: Arc::new(UserService::new(user_repo, hasher)),
            product_service: Arc::new(ProductService::new(product_repo)),
            authentication_service: Arc::new(AuthenticationService::new(
                verifier,
                login_throttle.clone(),
                tokens,
            )),
            login_throttle,
        }
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    /// Start purging idle login attempt records in the background.
    ///
    /// The task stops when `shutdown` changes.
    pub fn start_cleanup_task(
        &self,
        shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        self.login_throttle.start_cleanup_task(shutdown)
    }

    pub fn login_throttle(&self) -> &LoginThrottleService {
        &self.login_throttle
    }

    /// Log in with an email and password, returning the user and a bearer token.
    ///
    /// # Errors
    ///
    /// * [`AuthError::AccountLocked`] while the email is locked
    /// * [`AuthError::InvalidCredentials`] on an unknown email or wrong password
    pub async fn login(&self, email: &str, password: &str) -> Result<Authenticated, Error> {
        self.authentication_service.login(email, password).await
    }

    /// Validate a bearer token issued by [`login`](Self::login).
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, Error> {
        verify_token(token, self.authentication_service.token_config())
    }

    /// List users with optional `field:value` search and sort directives.
    pub async fn list_users(
        &self,
        search: Option<&str>,
        sort: Option<&str>,
        page_number: PageParam,
        page_size: PageParam,
    ) -> Result<PageResult, Error> {
        self.user_service
            .list_users(search, sort, page_number, page_size)
            .await
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<UserSummary>, Error> {
        self.user_service.get_user(user_id).await
    }

    /// Register a user.
    ///
    /// Returns `Ok(None)` if the store rejected the write.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Option<User>, Error> {
        self.user_service
            .create_user(name, email, password, password_confirm)
            .await
    }

    /// Change a user's name and email.
    ///
    /// Returns `Ok(None)` if the user is gone or the store rejected the write.
    pub async fn update_user(
        &self,
        user_id: &UserId,
        name: &str,
        email: &str,
    ) -> Result<Option<User>, Error> {
        self.user_service.update_user(user_id, name, email).await
    }

    pub async fn delete_user(&self, user_id: &UserId) -> Result<Option<UserId>, Error> {
        self.user_service.delete_user(user_id).await
    }

    /// Change a user's password after checking the current one.
    pub async fn change_password(
        &self,
        user_id: &UserId,
        password_old: &str,
        password_new: &str,
        password_confirm: &str,
    ) -> Result<Option<UserId>, Error> {
        self.user_service
            .change_password(user_id, password_old, password_new, password_confirm)
            .await
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, Error> {
        self.product_service.list_products().await
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, Error> {
        self.product_service.get_product(id).await
    }

    pub async fn create_product(
        &self,
        name: &str,
        brand: &str,
        price: f64,
    ) -> Result<Option<Product>, Error> {
        self.product_service.create_product(name, brand, price).await
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<Option<ProductId>, Error> {
        self.product_service.delete_product(id).await
    }

    pub async fn update_product_price(
        &self,
        id: &ProductId,
        new_price: f64,
    ) -> Result<Option<Product>, Error> {
        self.product_service.update_price(id, new_price).await
    }
}
