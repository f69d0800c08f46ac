//! End-to-end handler tests: the full router over the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use eshop_back::models::{Order, Product};
use eshop_back::routes;
use eshop_back::store::{new_id, MemoryStore, Store};
use eshop_back::utils::jwt::AuthKeys;
use eshop_back::AppState;

fn test_state() -> AppState {
    AppState {
        store: Arc::new(MemoryStore::new()),
        auth: Arc::new(AuthKeys::new("test-secret")),
    }
}

fn token(state: &AppState, is_admin: bool) -> String {
    state.auth.issue(&new_id(), is_admin).unwrap()
}

fn sample_product(category_id: &str, featured: bool) -> Product {
    Product {
        id: String::new(),
        name: "Drill".to_string(),
        description: "x".to_string(),
        rich_description: String::new(),
        image: String::new(),
        images: Vec::new(),
        brand: String::new(),
        price: 10.0,
        category: category_id.to_string(),
        count_in_stock: 5,
        rating: 0.0,
        num_of_reviews: 0,
        is_featured: featured,
        date_created: chrono::Utc::now(),
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let state = test_state();
    let app = routes::create_router(state.clone());

    let (status, body) = send(&app, "GET", "/api/v1/categories", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));

    let (status, _) = send(&app, "GET", "/api/v1/categories", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "GET",
        "/api/v1/categories",
        Some(&token(&state, false)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn non_admin_tokens_are_not_treated_as_revoked() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    for uri in ["/api/v1/categories", "/api/v1/products", "/api/v1/orders", "/api/v1/users"] {
        let (status, _) = send(&app, "GET", uri, Some(&auth), None).await;
        assert_eq!(status, StatusCode::OK, "GET {} rejected a valid token", uri);
    }
}

#[tokio::test]
async fn registration_and_login_flow() {
    let state = test_state();
    let app = routes::create_router(state.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({ "name": "Alice", "email": "a@b.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user_id = body["id"].as_str().unwrap().to_string();
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users/login",
        None,
        Some(json!({ "email": "a@b.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], json!("a@b.com"));

    // The returned token must verify against the configured key and carry
    // the user's identifier.
    let claims = state.auth.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.sub, user_id);
    assert!(!claims.is_admin);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users/login",
        None,
        Some(json!({ "email": "a@b.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Password is wrong"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users/login",
        None,
        Some(json!({ "email": "nobody@b.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("User not found"));
}

#[tokio::test]
async fn duplicate_registration_email_is_rejected() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let payload = json!({ "name": "Alice", "email": "a@b.com", "password": "pw" });

    let (status, _) = send(&app, "POST", "/api/v1/users", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/api/v1/users", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn category_create_then_get_round_trips() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/categories",
        Some(&auth),
        Some(json!({ "name": "Tools", "icon": "wrench", "color": "#ffffff" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap();
    assert!(!id.is_empty());

    let (status, fetched) = send(
        &app,
        "GET",
        &format!("/api/v1/categories/{}", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], json!("Tools"));
    assert_eq!(fetched["icon"], json!("wrench"));
    assert_eq!(fetched["color"], json!("#ffffff"));
}

#[tokio::test]
async fn malformed_ids_are_rejected_before_the_store() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    for uri in [
        "/api/v1/categories/not-an-id",
        "/api/v1/products/not-an-id",
        "/api/v1/users/not-an-id",
    ] {
        let (status, _) = send(&app, "GET", uri, Some(&auth), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {} accepted a bad id", uri);
    }
}

#[tokio::test]
async fn product_create_requires_an_existing_category() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/products",
        Some(&auth),
        Some(json!({
            "name": "Drill",
            "description": "x",
            "category": new_id(),
            "countInStock": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Invalid Category"));

    // Nothing was persisted.
    let (_, count) = send(&app, "GET", "/api/v1/products/count", Some(&auth), None).await;
    assert_eq!(count["count"], json!(0));
}

#[tokio::test]
async fn product_reads_populate_the_category_reference() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    let (_, category) = send(
        &app,
        "POST",
        "/api/v1/categories",
        Some(&auth),
        Some(json!({ "name": "Tools" })),
    )
    .await;
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/products",
        Some(&auth),
        Some(json!({
            "name": "Drill",
            "description": "x",
            "category": category_id,
            "countInStock": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let product_id = created["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, "GET", "/api/v1/products", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["category"]["id"].as_str().unwrap(), category_id);
    assert_eq!(listed[0]["category"]["name"], json!("Tools"));

    let (status, fetched) = send(
        &app,
        "GET",
        &format!("/api/v1/products/{}", product_id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["category"]["id"].as_str().unwrap(), category_id);
}

#[tokio::test]
async fn products_filter_by_category_set() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    let mut ids = Vec::new();
    for name in ["Tools", "Toys"] {
        let (_, category) = send(
            &app,
            "POST",
            "/api/v1/categories",
            Some(&auth),
            Some(json!({ "name": name })),
        )
        .await;
        let category_id = category["id"].as_str().unwrap().to_string();
        state
            .store
            .insert_product(sample_product(&category_id, false))
            .await
            .unwrap();
        ids.push(category_id);
    }

    let (_, listed) = send(
        &app,
        "GET",
        &format!("/api/v1/products?categories={}", ids[0]),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["category"]["id"].as_str().unwrap(), ids[0]);

    let (_, listed) = send(
        &app,
        "GET",
        &format!("/api/v1/products?categories={},{}", ids[0], ids[1]),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let (_, listed) = send(&app, "GET", "/api/v1/products", Some(&auth), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn count_in_stock_range_is_enforced() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    let (_, category) = send(
        &app,
        "POST",
        "/api/v1/categories",
        Some(&auth),
        Some(json!({ "name": "Tools" })),
    )
    .await;
    let category_id = category["id"].as_str().unwrap();

    for bad in [-1, 1000] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/products",
            Some(&auth),
            Some(json!({
                "name": "Drill",
                "description": "x",
                "category": category_id,
                "countInStock": bad
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn featured_listing_honors_the_limit() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);
    let category_id = new_id();

    for _ in 0..5 {
        state
            .store
            .insert_product(sample_product(&category_id, true))
            .await
            .unwrap();
    }
    for _ in 0..3 {
        state
            .store
            .insert_product(sample_product(&category_id, false))
            .await
            .unwrap();
    }

    let (status, listed) = send(&app, "GET", "/api/v1/products/featured/2", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap().clone();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|p| p["isFeatured"] == json!(true)));

    // A zero limit means no cap, as does omitting the segment.
    let (_, listed) = send(&app, "GET", "/api/v1/products/featured/0", Some(&auth), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 5);

    let (_, listed) = send(&app, "GET", "/api/v1/products/featured", Some(&auth), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn product_update_merges_partially() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    let (_, category) = send(
        &app,
        "POST",
        "/api/v1/categories",
        Some(&auth),
        Some(json!({ "name": "Tools" })),
    )
    .await;
    let category_id = category["id"].as_str().unwrap();

    let (_, created) = send(
        &app,
        "POST",
        "/api/v1/products",
        Some(&auth),
        Some(json!({
            "name": "Drill",
            "description": "x",
            "category": category_id,
            "countInStock": 5,
            "price": 10.0
        })),
    )
    .await;
    let product_id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/v1/products/{}", product_id),
        Some(&auth),
        Some(json!({ "price": 99.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], json!(99.5));
    assert_eq!(updated["name"], json!("Drill"));
    assert_eq!(updated["countInStock"], json!(5));

    // The category reference is re-validated on update.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/products/{}", product_id),
        Some(&auth),
        Some(json!({ "category": new_id() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Invalid Category"));
}

#[tokio::test]
async fn delete_then_get_returns_not_found() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    let (_, category) = send(
        &app,
        "POST",
        "/api/v1/categories",
        Some(&auth),
        Some(json!({ "name": "Tools" })),
    )
    .await;
    let id = category["id"].as_str().unwrap().to_string();

    let (status, ack) = send(
        &app,
        "DELETE",
        &format!("/api/v1/categories/{}", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["success"], json!(true));

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/v1/categories/{}", id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn referenced_category_cannot_be_deleted() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    let (_, category) = send(
        &app,
        "POST",
        "/api/v1/categories",
        Some(&auth),
        Some(json!({ "name": "Tools" })),
    )
    .await;
    let category_id = category["id"].as_str().unwrap().to_string();

    let (_, product) = send(
        &app,
        "POST",
        "/api/v1/products",
        Some(&auth),
        Some(json!({
            "name": "Drill",
            "description": "x",
            "category": category_id,
            "countInStock": 5
        })),
    )
    .await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/categories/{}", category_id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/products/{}", product_id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/categories/{}", category_id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn user_reads_never_expose_the_password() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    let (_, created) = send(
        &app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({ "name": "Alice", "email": "a@b.com", "password": "pw" })),
    )
    .await;
    let user_id = created["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, "GET", "/api/v1/users", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    for user in listed.as_array().unwrap() {
        assert!(user.get("password").is_none());
        assert!(user.get("passwordHash").is_none());
    }

    let (status, fetched) = send(
        &app,
        "GET",
        &format!("/api/v1/users/{}", user_id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(fetched.get("password").is_none());
    assert!(fetched.get("passwordHash").is_none());

    let (_, updated) = send(
        &app,
        "PUT",
        &format!("/api/v1/users/{}", user_id),
        Some(&auth),
        Some(json!({ "name": "Alicia" })),
    )
    .await;
    assert!(updated.get("password").is_none());
    assert!(updated.get("passwordHash").is_none());
}

#[tokio::test]
async fn user_update_without_password_keeps_the_stored_hash() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);

    let (_, created) = send(
        &app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({ "name": "Alice", "email": "a@b.com", "password": "pw" })),
    )
    .await;
    let user_id = created["id"].as_str().unwrap().to_string();

    let before = state.store.find_user(&user_id).await.unwrap().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/v1/users/{}", user_id),
        Some(&auth),
        Some(json!({ "city": "Tbilisi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["city"], json!("Tbilisi"));
    assert_eq!(updated["name"], json!("Alice"));

    let after = state.store.find_user(&user_id).await.unwrap().unwrap();
    assert_eq!(before.password_hash, after.password_hash);

    // Supplying a new password replaces the hash and the old one stops working.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/users/{}", user_id),
        Some(&auth),
        Some(json!({ "password": "new-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/users/login",
        None,
        Some(json!({ "email": "a@b.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/users/login",
        None,
        Some(json!({ "email": "a@b.com", "password": "new-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn user_delete_is_admin_only() {
    let state = test_state();
    let app = routes::create_router(state.clone());

    let (_, created) = send(
        &app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({ "name": "Alice", "email": "a@b.com", "password": "pw" })),
    )
    .await;
    let user_id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/users/{}", user_id),
        Some(&token(&state, false)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, ack) = send(
        &app,
        "DELETE",
        &format!("/api/v1/users/{}", user_id),
        Some(&token(&state, true)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["success"], json!(true));
}

#[tokio::test]
async fn orders_listing_is_gated_and_read_only() {
    let state = test_state();
    let app = routes::create_router(state.clone());

    state
        .store
        .insert_order(Order {
            id: String::new(),
            order_items: Vec::new(),
            status: "Pending".to_string(),
            total_price: 25.0,
            user: new_id(),
            date_ordered: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let (status, _) = send(&app, "GET", "/api/v1/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, listed) = send(
        &app,
        "GET",
        "/api/v1/orders",
        Some(&token(&state, false)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["status"], json!("Pending"));
}

#[tokio::test]
async fn product_count_reflects_the_collection() {
    let state = test_state();
    let app = routes::create_router(state.clone());
    let auth = token(&state, false);
    let category_id = new_id();

    for _ in 0..3 {
        state
            .store
            .insert_product(sample_product(&category_id, false))
            .await
            .unwrap();
    }

    let (status, body) = send(&app, "GET", "/api/v1/products/count", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(3));
}
