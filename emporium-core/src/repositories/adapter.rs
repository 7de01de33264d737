use crate::{
    Error, Product, ProductId, User, UserId,
    query::{SearchSpec, SortSpec},
    repositories::{ProductRepository, RepositoryProvider, UserRepository},
    storage::{NewProduct, NewUser, UserCredentials},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Adapter that wraps a RepositoryProvider and implements individual repository traits
pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn find_all(&self, search: &SearchSpec, sort: &SortSpec) -> Result<Vec<User>, Error> {
        self.provider.user().find_all(search, sort).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_email(email).await
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, Error> {
        self.provider.user().find_credentials_by_email(email).await
    }

    async fn create(&self, user: NewUser) -> Result<User, Error> {
        self.provider.user().create(user).await
    }

    async fn update(&self, user: &User) -> Result<User, Error> {
        self.provider.user().update(user).await
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        self.provider.user().delete(id).await
    }

    async fn set_password_hash(&self, id: &UserId, hash: &str) -> Result<(), Error> {
        self.provider.user().set_password_hash(id, hash).await
    }
}

pub struct ProductRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> ProductRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> ProductRepository for ProductRepositoryAdapter<R> {
    async fn find_all(&self) -> Result<Vec<Product>, Error> {
        self.provider.product().find_all().await
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, Error> {
        self.provider.product().find_by_id(id).await
    }

    async fn create(&self, product: NewProduct) -> Result<Product, Error> {
        self.provider.product().create(product).await
    }

    async fn delete(&self, id: &ProductId) -> Result<(), Error> {
        self.provider.product().delete(id).await
    }

    async fn update_price(&self, id: &ProductId, price: f64) -> Result<Product, Error> {
        self.provider.product().update_price(id, price).await
    }
}
