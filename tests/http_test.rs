mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use shop_unit_of_work::adapters::MemoryUnitOfWork;
use shop_unit_of_work::http::{router, AppState};

async fn app() -> Router {
    let state = AppState::new(Arc::new(MemoryUnitOfWork::new()), common::tokens());
    state
        .accounts()
        .seed_admin("admin", "admin-password")
        .await
        .expect("Failed to seed admin");
    router(state)
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
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"]
        .as_str()
        .expect("Token missing from login response")
        .to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn test_shopping_flow() {
    let app = app().await;
    let admin = login(&app, "admin", "admin-password").await;

    // Admin stocks the catalog
    let (status, product) = send(
        &app,
        Method::POST,
        "/products",
        Some(&admin),
        Some(json!({ "name": "Headphones", "price_cents": 4_999, "stock": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");
    let product_id = product["id"].as_str().expect("product id").to_string();

    // Customer registers and fills a cart
    let (status, user) = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": "frank", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{user}");
    assert!(user.get("password_hash").is_none());
    let customer = login(&app, "frank", "hunter22").await;

    let (status, cart) = send(&app, Method::GET, "/cart", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK, "{cart}");
    let cart_id = cart["id"].as_str().expect("cart id").to_string();

    let (status, cart) = send(
        &app,
        Method::POST,
        &format!("/carts/{cart_id}/items"),
        Some(&customer),
        Some(json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{cart}");
    assert_eq!(cart["total_cents"], json!(9_998));

    // Checkout
    let (status, order) = send(
        &app,
        Method::POST,
        "/orders",
        Some(&customer),
        Some(json!({ "cart_id": cart_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["total_cents"], json!(9_998));
    assert_eq!(order["items"][0]["unit_price_cents"], json!(4_999));

    let (_, product) = send(&app, Method::GET, &format!("/products/{product_id}"), None, None).await;
    assert_eq!(product["stock"], json!(1));

    // Second checkout of the now empty cart
    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        Some(&customer),
        Some(json!({ "cart_id": cart_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());

    let (status, orders) = send(&app, Method::GET, "/orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app().await;

    // No token
    let (status, body) = send(&app, Method::GET, "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    // Forged token
    let (status, _) = send(&app, Method::GET, "/users/me", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong password
    let (status, _) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "admin", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Non-admin product write
    send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": "gina", "password": "pa55word" })),
    )
    .await;
    let customer = login(&app, "gina", "pa55word").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/products",
        Some(&customer),
        Some(json!({ "name": "Nope", "price_cents": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Duplicate username
    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": "gina", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown product
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/products/{}", uuid::Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Invalid price
    let admin = login(&app, "admin", "admin-password").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/products",
        Some(&admin),
        Some(json!({ "name": "Broken", "price_cents": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Body missing a required field
    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(&admin),
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "expected JSON error body: {body}");

    // Path segment that is not a UUID
    let (status, body) = send(&app, Method::GET, "/products/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "expected JSON error body: {body}");
}

#[tokio::test]
async fn test_role_assignment() {
    let app = app().await;
    let admin = login(&app, "admin", "admin-password").await;

    let (_, user) = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": "hank", "password": "pa55word" })),
    )
    .await;
    let user_id = user["id"].as_str().expect("user id").to_string();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/users/{user_id}/role"),
        Some(&admin),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["role"], json!("admin"));

    // A fresh token carries the new role
    let promoted = login(&app, "hank", "pa55word").await;
    let (status, users) = send(&app, Method::GET, "/users", Some(&promoted), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().map(Vec::len), Some(2));
}
