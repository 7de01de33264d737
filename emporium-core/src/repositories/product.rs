use crate::{Error, Product, ProductId, storage::NewProduct};
use async_trait::async_trait;

/// Repository for the product catalogue
#[async_trait]
pub trait ProductRepository: Send + Sync + 'static {
    /// List every product
    async fn find_all(&self) -> Result<Vec<Product>, Error>;

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, Error>;

    async fn create(&self, product: NewProduct) -> Result<Product, Error>;

    async fn delete(&self, id: &ProductId) -> Result<(), Error>;

    /// Set a new price, returning the updated product
    async fn update_price(&self, id: &ProductId, price: f64) -> Result<Product, Error>;
}
