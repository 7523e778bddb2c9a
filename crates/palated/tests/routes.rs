//! HTTP contract tests for the review service router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use palate_core::ReviewPipeline;
use palate_state::fakes::MemoryStore;
use palate_state::RecordId;
use palated::{create_router, ErrorBody};
use sentiment_oracle::fakes::ScriptedOracle;
use sentiment_oracle::OracleError;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: MemoryStore,
    oracle: ScriptedOracle,
}

fn test_app() -> TestApp {
    let store = MemoryStore::new();
    let oracle = ScriptedOracle::new().with_verdict("POSITIVE", 0.9);
    let pipeline = Arc::new(ReviewPipeline::new(store.clone(), oracle.clone()));
    TestApp {
        router: create_router(pipeline),
        store,
        oracle,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

fn post_raw(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn error_body(body: Value) -> ErrorBody {
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_submit_review_returns_created_review() {
    let app = test_app();
    let restaurant = app.store.add_restaurant("Sushi Place", "Fresh fish");

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/reviews",
            &json!({
                "restaurantId": restaurant.id.as_str(),
                "text": "great food",
                "userId": "u1"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["restaurantId"], restaurant.id.as_str());
    assert_eq!(body["authorId"], "u1");
    assert_eq!(body["text"], "great food");
    assert_eq!(body["sentimentLabel"], "POSITIVE");
    assert_eq!(body["sentimentScore"], 0.9);
    assert!(body["id"].as_str().is_some());
    assert!(body["createdAt"].as_str().is_some());
    assert_eq!(app.store.reviews().len(), 1);
}

#[tokio::test]
async fn test_author_field_round_trips_as_author_id() {
    let app = test_app();
    let restaurant = app.store.add_restaurant("Tacos", "");

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/reviews",
            &json!({
                "restaurantId": restaurant.id.as_str(),
                "text": "I'd give it <3 stars",
                "authorId": "u7"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["authorId"], "u7");
    assert_eq!(body["text"], "I'd give it <3 stars");
    assert!(body.get("userId").is_none());
}

#[tokio::test]
async fn test_submit_malformed_json_is_bad_request() {
    let app = test_app();

    let (status, body) = send(&app.router, post_raw("/api/reviews", "{not json".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_body(body).kind, "invalid_input");

    let (status, body) = send(
        &app.router,
        post_json("/api/reviews", &json!({"text": "missing restaurant"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_body(body).kind, "invalid_input");

    assert_eq!(app.store.sessions_acquired(), 0);
    assert_eq!(app.oracle.analyze_calls(), 0);
}

#[tokio::test]
async fn test_submit_invalid_fields_is_bad_request() {
    let app = test_app();
    let restaurant = app.store.add_restaurant("Tacos", "");

    for payload in [
        json!({"restaurantId": "bad id!", "text": "great", "userId": "u1"}),
        json!({"restaurantId": restaurant.id.as_str(), "text": "   ", "userId": "u1"}),
    ] {
        let (status, body) = send(&app.router, post_json("/api/reviews", &payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        let err = error_body(body);
        assert_eq!(err.kind, "invalid_input");
        assert!(!err.error.is_empty());
    }
    assert_eq!(app.oracle.analyze_calls(), 0);
}

#[tokio::test]
async fn test_submit_unknown_restaurant_is_not_found() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/reviews",
            &json!({
                "restaurantId": RecordId::generate().as_str(),
                "text": "great food",
                "userId": "u1"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_body(body).kind, "not_found");
    assert_eq!(app.oracle.analyze_calls(), 0);
}

#[tokio::test]
async fn test_upstream_and_persistence_failures_are_server_errors() {
    let app = test_app();
    let restaurant = app.store.add_restaurant("Tacos", "");
    let payload = json!({
        "restaurantId": restaurant.id.as_str(),
        "text": "great food",
        "userId": "u1"
    });

    app.oracle.fail_analyze(Some(OracleError::Timeout { timeout_ms: 5000 }));
    let (status, body) = send(&app.router, post_json("/api/reviews", &payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_body(body).kind, "upstream_failure");

    app.oracle.fail_analyze(None);
    app.store.fail_writes(true);
    let (status, body) = send(&app.router, post_json("/api/reviews", &payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_body(body).kind, "persistence_failure");

    assert_eq!(app.store.open_sessions(), 0);
}

#[tokio::test]
async fn test_list_reviews_with_and_without_filter() {
    let app = test_app();
    let tacos = app.store.add_restaurant("Tacos", "");
    let sushi = app.store.add_restaurant("Sushi", "");

    for (restaurant, text) in [(&tacos, "crispy"), (&sushi, "fresh")] {
        let (status, _) = send(
            &app.router,
            post_json(
                "/api/reviews",
                &json!({"restaurantId": restaurant.id.as_str(), "text": text, "userId": "u1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app.router, get("/api/reviews")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let uri = format!("/api/reviews?restaurantId={}", tacos.id.as_str());
    let (status, body) = send(&app.router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["text"], "crispy");

    let (status, body) = send(&app.router, get("/api/reviews?restaurantId=bad%20id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_body(body).kind, "invalid_input");
}

#[tokio::test]
async fn test_leaderboard_route() {
    let app = test_app();
    let a = app.store.add_restaurant("A", "first");
    let b = app.store.add_restaurant("B", "second");
    let oracle = app.oracle.clone().with_score(b.id.as_str(), 3.5);

    let (status, body) = send(&app.router, get("/api/leaderboard?limit=5")).await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], a.id.as_str());
    assert_eq!(entries[0]["name"], "A");
    assert_eq!(entries[0]["score"], 0.0);
    assert_eq!(entries[1]["id"], b.id.as_str());
    assert_eq!(entries[1]["score"], 3.5);
    assert!(entries[1]["createdAt"].as_str().is_some());
    assert_eq!(oracle.requested_limits(), vec![5]);
}

#[tokio::test]
async fn test_leaderboard_bad_limits() {
    let app = test_app();

    for uri in ["/api/leaderboard?limit=0", "/api/leaderboard?limit=-3", "/api/leaderboard?limit=abc"] {
        let (status, body) = send(&app.router, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error_body(body).kind, "invalid_input");
    }
    assert_eq!(app.oracle.leaderboard_calls(), 0);
}

#[tokio::test]
async fn test_leaderboard_upstream_failure() {
    let app = test_app();
    app.store.add_restaurant("A", "");
    app.oracle.fail_leaderboard(Some(OracleError::Http("connection refused".to_string())));

    let (status, body) = send(&app.router, get("/api/leaderboard")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_body(body).kind, "upstream_failure");
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/api/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_body(body).kind, "not_found");
}
