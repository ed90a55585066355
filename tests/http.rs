mod common;

use axum::body::Body;
use http::{Method, Request, StatusCode};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = common::test_app();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = common::test_app();
    let response = app.oneshot(get("/version")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["git_sha"].is_string());
    assert_eq!(json["live_sessions"], 0);
}

#[tokio::test]
async fn test_not_found() {
    let app = common::test_app();
    let response = app.oneshot(get("/nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_headers_present() {
    let app = common::test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_root_serves_index_html() {
    let app = common::test_app();
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], common::INDEX_HTML.as_bytes());
}

#[tokio::test]
async fn test_static_files_are_served() {
    let app = common::test_app();
    let response = app.oneshot(get("/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::test_app();
    let response = app.oneshot(get("/static/missing.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cluster_list_groups_clusters() {
    let app = common::test_app();
    let response = app.oneshot(get("/list/cluster")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let island_south = json["Island South"].as_array().unwrap();
    assert_eq!(island_south.len(), 3);
    assert!(island_south.contains(&serde_json::json!("Sooke")));
}

#[tokio::test]
async fn test_neighbourhood_list_empty_without_source() {
    let app = common::test_app();
    let response = app.oneshot(get("/list/neighbourhood")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({}));
}

#[tokio::test]
async fn test_stats_rejects_unknown_scope() {
    let app = common::test_app();
    let response = app
        .oneshot(post_json(
            "/stats",
            serde_json::json!({
                "names": ["Langley"],
                "scope": "Province",
                "activities": ["dg"],
                "stats_type": 0
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_stats_without_source_returns_empty_data() {
    let app = common::test_app();
    let response = app
        .oneshot(post_json(
            "/stats",
            serde_json::json!({
                "names": ["Langley"],
                "scope": "Cluster",
                "activities": ["dg", "cc"],
                "stats_type": 1
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], serde_json::json!([]));
    assert_eq!(json["source"]["title"], "");
    assert!(json["source"]["last_pulled"].is_string());
}

#[tokio::test]
async fn test_refresh_without_source_succeeds() {
    let app = common::test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri("/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["neighbourhood"].is_string());
    assert!(json["cluster"].is_string());
}
