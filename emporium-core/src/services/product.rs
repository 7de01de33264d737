use crate::{
    Error, Product, ProductId,
    error::StorageError,
    repositories::ProductRepository,
    storage::NewProduct,
    validation::{validate_brand, validate_name, validate_price},
};
use std::sync::Arc;

/// Service for the product catalogue
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, Error> {
        self.repository.find_all().await
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, Error> {
        self.repository.find_by_id(id).await
    }

    /// Add a product. A store failure is logged and reported as `Ok(None)`.
    pub async fn create_product(
        &self,
        name: &str,
        brand: &str,
        price: f64,
    ) -> Result<Option<Product>, Error> {
        validate_name(name)?;
        validate_brand(brand)?;
        validate_price(price)?;

        let new_product = NewProduct::new(name.to_string(), brand.to_string(), price);
        match self.repository.create(new_product).await {
            Ok(product) => {
                tracing::info!(product_id = %product.id, "Created product");
                Ok(Some(product))
            }
            Err(e) => {
                tracing::error!(name = %name, error = %e, "Failed to create product");
                Ok(None)
            }
        }
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<Option<ProductId>, Error> {
        match self.repository.delete(id).await {
            Ok(()) => Ok(Some(id.clone())),
            Err(Error::Storage(StorageError::NotFound)) => Ok(None),
            Err(e) => {
                tracing::error!(product_id = %id, error = %e, "Failed to delete product");
                Ok(None)
            }
        }
    }

    /// Set a new price; `Ok(None)` if the product is unknown or the store fails.
    pub async fn update_price(
        &self,
        id: &ProductId,
        new_price: f64,
    ) -> Result<Option<Product>, Error> {
        validate_price(new_price)?;

        match self.repository.update_price(id, new_price).await {
            Ok(product) => Ok(Some(product)),
            Err(Error::Storage(StorageError::NotFound)) => Ok(None),
            Err(e) => {
                tracing::error!(product_id = %id, error = %e, "Failed to update product price");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockProductRepository {
        products: Mutex<Vec<Product>>,
    }

    #[async_trait]
    impl ProductRepository for MockProductRepository {
        async fn find_all(&self) -> Result<Vec<Product>, Error> {
            Ok(self.products.lock().unwrap().clone())
        }

        async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, Error> {
            let products = self.products.lock().unwrap();
            Ok(products.iter().find(|p| &p.id == id).cloned())
        }

        async fn create(&self, product: NewProduct) -> Result<Product, Error> {
            let created = Product::builder()
                .id(product.id)
                .name(product.name)
                .brand(product.brand)
                .price(product.price)
                .build()?;
            self.products.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn delete(&self, id: &ProductId) -> Result<(), Error> {
            let mut products = self.products.lock().unwrap();
            let before = products.len();
            products.retain(|p| &p.id != id);
            if products.len() == before {
                return Err(StorageError::NotFound.into());
            }
            Ok(())
        }

        async fn update_price(&self, id: &ProductId, price: f64) -> Result<Product, Error> {
            let mut products = self.products.lock().unwrap();
            let product = products
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or(StorageError::NotFound)?;
            product.price = price;
            Ok(product.clone())
        }
    }

    fn service() -> ProductService<MockProductRepository> {
        ProductService::new(Arc::new(MockProductRepository::default()))
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let service = service();
        let product = service
            .create_product("Kopi Susu", "Kapal Api", 2500.0)
            .await
            .unwrap()
            .unwrap();

        let products = service.list_products().await.unwrap();
        assert_eq!(products, vec![product]);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let service = service();
        assert!(service.create_product("", "Brand", 1.0).await.is_err());
        assert!(service.create_product("Kopi", "", 1.0).await.is_err());
        assert!(service.create_product("Kopi", "Brand", 0.0).await.is_err());
    }

    #[tokio::test]
    async fn test_update_price() {
        let service = service();
        let product = service
            .create_product("Teh", "Sosro", 3000.0)
            .await
            .unwrap()
            .unwrap();

        let updated = service.update_price(&product.id, 3500.0).await.unwrap().unwrap();
        assert_eq!(updated.price, 3500.0);

        assert!(service.update_price(&product.id, -1.0).await.is_err());
        assert!(
            service
                .update_price(&ProductId::new_random(), 10.0)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_product() {
        let service = service();
        let product = service
            .create_product("Teh", "Sosro", 3000.0)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            service.delete_product(&product.id).await.unwrap(),
            Some(product.id.clone())
        );
        assert!(service.delete_product(&product.id).await.unwrap().is_none());
        assert!(service.get_product(&product.id).await.unwrap().is_none());
    }
}
