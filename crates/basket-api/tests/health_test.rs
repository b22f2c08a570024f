//! Integration tests for the health endpoint.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use basket_test_support::MemoryCartStore;
use serde_json::json;

#[tokio::test]
async fn test_health_returns_200_with_status_ok() {
    let app = common::build_test_app(Arc::new(MemoryCartStore::default()));

    let (status, json) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["open_sessions"], 0);
}

#[tokio::test]
async fn test_health_counts_open_sessions() {
    let app = common::build_test_app(Arc::new(MemoryCartStore::default()));
    common::post_json(
        app.clone(),
        "/api/v1/carts/web-1/add-item",
        &json!({ "variant_id": "A", "unit_price": "1.00" }),
    )
    .await;
    common::get_json(app.clone(), "/api/v1/carts/pos-1").await;

    let (status, json) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["open_sessions"], 2);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = common::build_test_app(Arc::new(MemoryCartStore::default()));

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/nonexistent")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
