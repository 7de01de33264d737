use crate::{
    Error, User, UserId,
    query::{SearchSpec, SortSpec},
    storage::{NewUser, UserCredentials},
};
use async_trait::async_trait;

/// Repository for user data access
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// List users matching `search`, ordered by `sort`
    async fn find_all(&self, search: &SearchSpec, sort: &SortSpec) -> Result<Vec<User>, Error>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Find a user together with their stored password hash
    async fn find_credentials_by_email(&self, email: &str)
    -> Result<Option<UserCredentials>, Error>;

    /// Create a new user
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Update the name and email of an existing user
    ///
    /// Returns [`StorageError::NotFound`](crate::error::StorageError::NotFound)
    /// when no user has the given ID.
    async fn update(&self, user: &User) -> Result<User, Error>;

    /// Delete a user by ID
    async fn delete(&self, id: &UserId) -> Result<(), Error>;

    /// Replace a user's password hash
    async fn set_password_hash(&self, id: &UserId, hash: &str) -> Result<(), Error>;
}
