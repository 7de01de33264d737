//! # Emporium Axum Integration
//!
//! HTTP surface for the emporium backend: JSON routes for login, user
//! management and the product catalogue, guarded by bearer tokens.
//!
//! ## Routes
//!
//! | Method | Path                           | Auth   |
//! |--------|--------------------------------|--------|
//! | GET    | `/health`                      | none   |
//! | POST   | `/login`                       | none   |
//! | GET    | `/users`                       | bearer |
//! | POST   | `/users`                       | bearer |
//! | GET    | `/users/{id}`                  | bearer |
//! | PUT    | `/users/{id}`                  | bearer |
//! | DELETE | `/users/{id}`                  | bearer |
//! | POST   | `/users/{id}/change-password`  | bearer |
//! | GET    | `/products`                    | bearer |
//! | POST   | `/products`                    | bearer |
//! | DELETE | `/products/{id}`               | bearer |
//! | PATCH  | `/products/{id}/price`         | bearer |
//!
//! Errors are returned as `{"error": "...", "code": <status>}`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use emporium::EmporiumBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let emporium = EmporiumBuilder::new()
//!         .with_sqlite("sqlite://emporium.db?mode=rwc")
//!         .await?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let app = emporium_axum::create_router(Arc::new(emporium));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod middleware;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use extractors::{ApiJson, AuthClaims, BearerToken};
pub use middleware::{AppState, require_auth};
pub use routes::create_router;
pub use types::{
    ChangePasswordRequest, CreateProductRequest, CreateProductResponse, CreateUserRequest,
    CreateUserResponse, HealthResponse, ListUsersQuery, LoginRequest, LoginResponse,
    PriceResponse, ProductIdResponse, UpdatePriceRequest, UpdateUserRequest, UserIdResponse,
};
