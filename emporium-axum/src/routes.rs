use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use emporium::{Emporium, PageParam, ProductId, UserId};
use emporium_core::repositories::RepositoryProvider;
use tower_http::trace::TraceLayer;

use crate::{
    error::{ApiError, Result},
    extractors::{ApiJson, AuthClaims},
    middleware::{AppState, require_auth},
    types::*,
};

pub fn create_router<R>(emporium: Arc<Emporium<R>>) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = AppState { emporium };

    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/login", post(login_handler));

    let protected_routes = Router::new()
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/users/{id}",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
        .route("/users/{id}/change-password", post(change_password_handler))
        .route(
            "/products",
            get(list_products_handler).post(create_product_handler),
        )
        .route("/products/{id}", delete(delete_product_handler))
        .route("/products/{id}/price", patch(update_price_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth::<R>,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health_handler<R>(State(state): State<AppState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.emporium.health_check().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn login_handler<R>(
    State(state): State<AppState<R>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let authenticated = state
        .emporium
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        user_id: authenticated.user.id,
        email: authenticated.user.email,
        name: authenticated.user.name,
        token: authenticated.token,
    }))
}

async fn list_users_handler<R>(
    State(state): State<AppState<R>>,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let page = state
        .emporium
        .list_users(
            query.search.as_deref(),
            query.sort.as_deref(),
            PageParam::parse(query.page_number.as_deref()),
            PageParam::parse(query.page_size.as_deref()),
        )
        .await?;

    Ok(Json(page))
}

async fn get_user_handler<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user = state
        .emporium
        .get_user(&UserId::new(&id))
        .await?
        .ok_or(ApiError::NotFound("Unknown user"))?;

    Ok(Json(user))
}

async fn create_user_handler<R>(
    State(state): State<AppState<R>>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user = state
        .emporium
        .create_user(
            &payload.name,
            &payload.email,
            &payload.password,
            &payload.password_confirm,
        )
        .await?
        .ok_or(ApiError::Unprocessable("Failed to create user"))?;

    Ok(Json(CreateUserResponse {
        name: user.name,
        email: user.email,
    }))
}

async fn update_user_handler<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user_id = UserId::new(&id);
    ensure_user_exists(&state, &user_id).await?;

    let user = state
        .emporium
        .update_user(&user_id, &payload.name, &payload.email)
        .await?
        .ok_or(ApiError::Unprocessable("Failed to update user"))?;

    Ok(Json(UserIdResponse { id: user.id }))
}

async fn delete_user_handler<R>(
    State(state): State<AppState<R>>,
    AuthClaims(claims): AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user_id = UserId::new(&id);
    ensure_user_exists(&state, &user_id).await?;

    let id = state
        .emporium
        .delete_user(&user_id)
        .await?
        .ok_or(ApiError::Unprocessable("Failed to delete user"))?;

    tracing::info!(user_id = %id, deleted_by = %claims.sub, "User deleted over HTTP");
    Ok(Json(UserIdResponse { id }))
}

async fn change_password_handler<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user_id = UserId::new(&id);
    ensure_user_exists(&state, &user_id).await?;

    let id = state
        .emporium
        .change_password(
            &user_id,
            &payload.password_old,
            &payload.password_new,
            &payload.password_confirm,
        )
        .await?
        .ok_or(ApiError::Unprocessable("Failed to change password"))?;

    Ok(Json(UserIdResponse { id }))
}

async fn list_products_handler<R>(State(state): State<AppState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    Ok(Json(state.emporium.list_products().await?))
}

async fn create_product_handler<R>(
    State(state): State<AppState<R>>,
    ApiJson(payload): ApiJson<CreateProductRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let product = state
        .emporium
        .create_product(&payload.name, &payload.brand, payload.price)
        .await?
        .ok_or(ApiError::Unprocessable("Failed to create product"))?;

    Ok(Json(CreateProductResponse {
        name: product.name,
        brand: product.brand,
        price: product.price,
    }))
}

async fn delete_product_handler<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let product_id = ProductId::new(&id);
    ensure_product_exists(&state, &product_id).await?;

    let id = state
        .emporium
        .delete_product(&product_id)
        .await?
        .ok_or(ApiError::Unprocessable("Failed to delete product"))?;

    Ok(Json(ProductIdResponse { id }))
}

async fn update_price_handler<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdatePriceRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let product_id = ProductId::new(&id);
    ensure_product_exists(&state, &product_id).await?;

    let product = state
        .emporium
        .update_product_price(&product_id, payload.new_price)
        .await?
        .ok_or(ApiError::Unprocessable("Failed to update price"))?;

    Ok(Json(PriceResponse {
        id: product.id,
        price: product.price,
    }))
}

/// Distinguishes a missing record (404) from a write the store refused (422).
async fn ensure_user_exists<R: RepositoryProvider>(
    state: &AppState<R>,
    user_id: &UserId,
) -> Result<()> {
    match state.emporium.get_user(user_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("Unknown user")),
    }
}

async fn ensure_product_exists<R: RepositoryProvider>(
    state: &AppState<R>,
    product_id: &ProductId,
) -> Result<()> {
    match state.emporium.get_product(product_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("Unknown product")),
    }
}
