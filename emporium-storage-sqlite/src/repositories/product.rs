use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emporium_core::{
    Error, Product, ProductId,
    error::{StorageError, utilities::DatabaseResultExt},
    repositories::ProductRepository,
    storage::NewProduct,
};
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct SqliteProduct {
    id: String,
    name: String,
    brand: String,
    price: f64,
    created_at: i64,
    updated_at: i64,
}

impl From<SqliteProduct> for Product {
    fn from(row: SqliteProduct) -> Self {
        Product {
            id: ProductId::new(&row.id),
            name: row.name,
            brand: row.brand,
            price: row.price,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_default(),
        }
    }
}

pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn find_all(&self) -> Result<Vec<Product>, Error> {
        let rows = sqlx::query_as::<_, SqliteProduct>(
            "SELECT id, name, brand, price, created_at, updated_at FROM products ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_db_err_with_context("Failed to list products")?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, Error> {
        let row = sqlx::query_as::<_, SqliteProduct>(
            "SELECT id, name, brand, price, created_at, updated_at FROM products WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        Ok(row.map(Product::from))
    }

    async fn create(&self, product: NewProduct) -> Result<Product, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteProduct>(
            r#"
            INSERT INTO products (id, name, brand, price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, name, brand, price, created_at, updated_at
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.price)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_db_err_with_context("Failed to create product")?;

        Ok(row.into())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_db_err_with_context("Failed to delete product")?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound.into());
        }
        Ok(())
    }

    async fn update_price(&self, id: &ProductId, price: f64) -> Result<Product, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteProduct>(
            r#"
            UPDATE products
            SET price = ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING id, name, brand, price, created_at, updated_at
            "#,
        )
        .bind(id.as_str())
        .bind(price)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_db_err_with_context("Failed to update product price")?
        .ok_or(StorageError::NotFound)?;

        Ok(row.into())
    }
}
