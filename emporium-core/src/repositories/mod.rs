//! Repository traits for data access layer
//!
//! This module defines the repository interfaces that services use to interact with storage.
//!
//! # Trait Hierarchy
//!
//! - Individual `*Repository` traits define the operations for each data domain
//! - Individual `*RepositoryProvider` traits provide access to each repository type
//! - [`RepositoryProvider`] combines the provider traits plus lifecycle methods
//!
//! Login attempts are the odd one out: they are not part of [`RepositoryProvider`]
//! because the throttle store can be chosen independently of the main database
//! (see [`InMemoryLoginAttemptRepository`]).

pub mod adapter;
pub mod login_attempt;
pub mod memory;
pub mod product;
pub mod user;

pub use adapter::{ProductRepositoryAdapter, UserRepositoryAdapter};
pub use login_attempt::LoginAttemptRepository;
pub use memory::InMemoryLoginAttemptRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for user repository access.
pub trait UserRepositoryProvider: Send + Sync + 'static {
    /// The user repository implementation type
    type UserRepo: UserRepository;

    /// Get the user repository
    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for product repository access.
pub trait ProductRepositoryProvider: Send + Sync + 'static {
    /// The product repository implementation type
    type ProductRepo: ProductRepository;

    /// Get the product repository
    fn product(&self) -> &Self::ProductRepo;
}

/// Provider trait that storage implementations must implement to provide all repositories.
///
/// # Example
///
/// ```rust,ignore
/// use emporium_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// impl UserRepositoryProvider for MyStorage {
///     type UserRepo = MyUserRepository;
///     fn user(&self) -> &Self::UserRepo { &self.user_repo }
/// }
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn migrate(&self) -> Result<(), Error> { /* ... */ }
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: UserRepositoryProvider + ProductRepositoryProvider {
    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), Error>;

    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
