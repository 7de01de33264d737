use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use emporium::{EmporiumBuilder, Error, TokenConfig};
use emporium_core::crypto::PasswordHasher;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "0123456789abcdef0123456789abcdef";
const PASSWORD: &str = "rahasia123";

struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, plain: &str) -> Result<String, Error> {
        Ok(format!("plain:{plain}"))
    }

    async fn verify(&self, plain: &str, digest: &str) -> Result<bool, Error> {
        Ok(digest == format!("plain:{plain}"))
    }
}

async fn setup() -> Router {
    let emporium = EmporiumBuilder::new()
        .with_sqlite("sqlite::memory:")
        .await
        .expect("Failed to connect to SQLite")
        .with_password_hasher(Arc::new(PlainHasher))
        .with_token_config(TokenConfig::new(SECRET).unwrap())
        .apply_migrations(true)
        .build()
        .await
        .expect("Failed to build Emporium");

    emporium
        .create_user("Admin", "admin@example.com", PASSWORD, PASSWORD)
        .await
        .unwrap()
        .expect("Seed user was not created");

    emporium_axum::create_router(Arc::new(emporium))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({"email": "admin@example.com", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = setup().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_login_returns_token_and_profile() {
    let app = setup().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"email": "admin@example.com", "password": PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "admin@example.com");
    assert_eq!(body["name"], "Admin");
    assert!(body["user_id"].as_str().is_some());
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_login_wrong_password_then_locked() {
    let app = setup().await;
    let wrong = json!({"email": "admin@example.com", "password": "salah12345"});

    for _ in 0..5 {
        let (status, body) = send(&app, Method::POST, "/login", None, Some(wrong.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Wrong email or password");
        assert_eq!(body["code"], 401);
    }

    // Even the right password is refused while locked
    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"email": "admin@example.com", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "This email is blocked, try again later");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup().await;

    let (status, body) = send(&app, Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let (status, _) = send(&app, Method::GET, "/products", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_users_paging() {
    let app = setup().await;
    let token = login(&app).await;

    for i in 1..=4 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/users",
            Some(&token),
            Some(json!({
                "name": format!("User {i}"),
                "email": format!("user{i}@example.com"),
                "password": PASSWORD,
                "password_confirm": PASSWORD,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/users?page_number=1&page_size=2&sort=email:asc",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page_number"], 1);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["count"], 5);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["has_previous_page"], false);
    assert_eq!(body["has_next_page"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["email"], "admin@example.com");
    assert!(body["data"][0].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        Method::GET,
        "/users?page_number=abc&page_size=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page_number"], Value::Null);
    assert_eq!(body["has_next_page"], false);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_user_crud() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(&token),
        Some(json!({
            "name": "Budi",
            "email": "budi@example.com",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"name": "Budi", "email": "budi@example.com"}));

    let (_, listing) = send(
        &app,
        Method::GET,
        "/users?search=email:budi",
        Some(&token),
        None,
    )
    .await;
    let id = listing["data"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, &format!("/users/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Budi");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        Some(&token),
        Some(json!({"name": "Budi Santoso", "email": "budi.s@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/users/{id}/change-password"),
        Some(&token),
        Some(json!({
            "password_old": PASSWORD,
            "password_new": "baru123456",
            "password_confirm": "baru123456",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"email": "budi.s@example.com", "password": "baru123456"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::DELETE, &format!("/users/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (status, body) = send(&app, Method::GET, &format!("/users/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Unknown user");
}

#[tokio::test]
async fn test_user_errors() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(&token),
        Some(json!({
            "name": "Copy",
            "email": "admin@example.com",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email is already registered");

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(&token),
        Some(json!({
            "name": "Mismatch",
            "email": "mismatch@example.com",
            "password": PASSWORD,
            "password_confirm": "lain123456",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(&token),
        Some(json!({
            "name": "Bad",
            "email": "not-an-email",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(&token),
        Some(json!({"name": "Missing fields"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/users/does-not-exist",
        Some(&token),
        Some(json!({"name": "Ghost", "email": "ghost@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Unknown user");
}

#[tokio::test]
async fn test_product_flow() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(&token),
        Some(json!({"name": "Teh Botol", "brand": "Sosro", "price": 5000.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Teh Botol");
    assert_eq!(body["price"], 5000.0);

    let (status, body) = send(&app, Method::GET, "/products", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["brand"], "Sosro");
    let id = products[0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/products/{id}/price"),
        Some(&token),
        Some(json!({"new_price": 6500.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": id.as_str(), "price": 6500.0}));

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/products/{id}/price"),
        Some(&token),
        Some(json!({"new_price": -1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/products/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/products/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Unknown product");
}
