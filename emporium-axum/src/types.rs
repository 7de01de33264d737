use emporium::{ProductId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub token: String,
}

/// Query string of `GET /users`.
///
/// Page parameters are kept as raw text so that a malformed value turns
/// paging off instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page_number: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password_old: String,
    pub password_new: String,
    pub password_confirm: String,
}

#[derive(Debug, Serialize)]
pub struct UserIdResponse {
    pub id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub brand: String,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct CreateProductResponse {
    pub name: String,
    pub brand: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePriceRequest {
    pub new_price: f64,
}

#[derive(Debug, Serialize)]
pub struct ProductIdResponse {
    pub id: ProductId,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub id: ProductId,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
