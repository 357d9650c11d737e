// Router-level tests: request validation, error mapping, and the
// deterministic edit path, none of which need a live vendor.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use citewright::config::{Config, VendorKeys};
use citewright::edit::EditEngine;
use citewright::server::{create_router, AppState, DefaultStores};

fn test_router(vendors: VendorKeys) -> axum::Router {
    let stores = Arc::new(DefaultStores);
    let state = Arc::new(AppState {
        config: Config {
            vendors,
            ..Config::default()
        },
        credentials: stores.clone(),
        styles: stores,
        edit_engine: EditEngine::new(),
    });
    create_router(state)
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let router = test_router(VendorKeys::default());
    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn generate_rejects_unknown_mode() {
    let router = test_router(VendorKeys::default());
    let response = router
        .oneshot(json_post(
            "/api/statements/generate",
            serde_json::json!({
                "mode": "freeform",
                "rank": "SSgt"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("freeform"));
}

#[tokio::test]
async fn generate_without_any_key_is_a_credential_error() {
    let router = test_router(VendorKeys::default());
    let response = router
        .oneshot(json_post(
            "/api/statements/generate",
            serde_json::json!({
                "mode": "accomplishments",
                "rank": "SSgt",
                "accomplishments": [{
                    "id": "a1",
                    "category": "Leadership",
                    "description": "Led the flight through an inspection"
                }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Anthropic"));
}

#[tokio::test]
async fn edit_exact_match_resolves_without_network() {
    // With a key configured the exact tier still resolves locally; nothing
    // dials out.
    let router = test_router(VendorKeys {
        anthropic: Some("test-key".to_string()),
        ..Default::default()
    });
    let response = router
        .oneshot(json_post(
            "/api/statements/edit",
            serde_json::json!({
                "currentText": "Led the 2024 inspection team.",
                "highlightedText": "2024",
                "suggestionType": "replace",
                "replacementText": "2025"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["newText"], "Led the 2025 inspection team.");
    assert!(body.get("needsReview").is_none());
}

#[tokio::test]
async fn edit_replace_requires_replacement_text() {
    let router = test_router(VendorKeys::default());
    let response = router
        .oneshot(json_post(
            "/api/statements/edit",
            serde_json::json!({
                "currentText": "Led the team.",
                "highlightedText": "team",
                "suggestionType": "replace"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn edit_rejects_unknown_suggestion_type() {
    let router = test_router(VendorKeys::default());
    let response = router
        .oneshot(json_post(
            "/api/statements/edit",
            serde_json::json!({
                "currentText": "Led the team.",
                "highlightedText": "team",
                "suggestionType": "rewrite"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("rewrite"));
}

#[tokio::test]
async fn convert_rejects_empty_statement() {
    let router = test_router(VendorKeys::default());
    let response = router
        .oneshot(json_post(
            "/api/statements/convert",
            serde_json::json!({
                "statement": "   ",
                "targetSentences": 3
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn edit_exact_match_needs_no_credentials() {
    // No vendor key anywhere; the deterministic tiers still work.
    let router = test_router(VendorKeys::default());
    let response = router
        .oneshot(json_post(
            "/api/statements/edit",
            serde_json::json!({
                "currentText": "Led the 2024 inspection team.",
                "highlightedText": "2024",
                "suggestionType": "replace",
                "replacementText": "2025"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["newText"], "Led the 2025 inspection team.");
}

#[tokio::test]
async fn edit_escalation_without_key_is_a_credential_error() {
    // An ambiguous highlight needs the model tier, and that is the first
    // point at which a missing key matters.
    let router = test_router(VendorKeys::default());
    let response = router
        .oneshot(json_post(
            "/api/statements/edit",
            serde_json::json!({
                "currentText": "We led the team and led the team.",
                "highlightedText": "led the team",
                "suggestionType": "delete"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Anthropic"));
}
