//! Products sold through the catalogue.
use crate::{
    Error,
    error::utilities::RequiredFieldExt,
    id::{generate_prefixed_id, validate_prefixed_id},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: &str) -> Self {
        ProductId(id.to_string())
    }

    pub fn new_random() -> Self {
        ProductId(generate_prefixed_id("prd"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "prd")
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price: f64,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn builder() -> ProductBuilder {
        ProductBuilder::default()
    }
}

#[derive(Default)]
pub struct ProductBuilder {
    id: Option<ProductId>,
    name: Option<String>,
    brand: Option<String>,
    price: Option<f64>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl ProductBuilder {
    pub fn id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn brand(mut self, brand: String) -> Self {
        self.brand = Some(brand);
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn build(self) -> Result<Product, Error> {
        let now = Utc::now();
        Ok(Product {
            id: self.id.unwrap_or_default(),
            name: self.name.require_field("Name")?,
            brand: self.brand.require_field("Brand")?,
            price: self.price.require_field("Price")?,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_prefixed() {
        let id = ProductId::new_random();
        assert!(id.as_str().starts_with("prd_"));
        assert!(id.is_valid());
        assert!(!ProductId::new("usr_AAAAAAAAAAAAAAAA").is_valid());
    }

    #[test]
    fn test_builder_requires_price() {
        let result = Product::builder()
            .name("Kopi".to_string())
            .brand("Kapal Api".to_string())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_serialized_fields() {
        let product = Product::builder()
            .name("Kopi".to_string())
            .brand("Kapal Api".to_string())
            .price(12.5)
            .build()
            .unwrap();

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["name"], "Kopi");
        assert_eq!(json["price"], 12.5);
        assert!(json.get("created_at").is_none());
    }
}
