// tests/explain_api.rs


use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use explainer::prompt::{Level, build_prompt};
use test_helpers::{Script, StubGenerator, test_router};

fn post_explain(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/explain")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn assert_rejected(body: Value, reason: &str) {
    let generator = Arc::new(StubGenerator::hello());
    let app = test_router(generator.clone());

    let response = app.oneshot(post_explain(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": reason }));
    assert_eq!(generator.calls(), 0, "model must not be called for {}", body);
}

#[tokio::test]
async fn test_missing_or_blank_topic() {
    assert_rejected(json!({ "level": "teen" }), "missing topic").await;
    assert_rejected(json!({ "topic": "", "level": "teen" }), "missing topic").await;
    assert_rejected(json!({ "topic": "   ", "level": "teen" }), "missing topic").await;
    assert_rejected(json!({ "topic": 42, "level": "teen" }), "missing topic").await;
}

#[tokio::test]
async fn test_missing_level() {
    assert_rejected(json!({ "topic": "tides" }), "missing level").await;
    assert_rejected(json!({ "topic": "tides", "level": "" }), "missing level").await;
}

#[tokio::test]
async fn test_unknown_level() {
    assert_rejected(json!({ "topic": "tides", "level": "toddler" }), "invalid level").await;
}

#[tokio::test]
async fn test_body_not_an_object() {
    let generator = Arc::new(StubGenerator::hello());
    let app = test_router(generator.clone());

    let response = app.oneshot(post_explain("not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "invalid request body" })
    );

    assert_rejected(json!(["tides", "teen"]), "invalid request body").await;
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_non_streaming_explanation() {
    let generator = Arc::new(StubGenerator::hello());
    let app = test_router(generator.clone());

    let response = app
        .oneshot(post_explain(
            json!({ "topic": "  tides ", "level": "teen" }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "explanation": "Hello, world." })
    );
    assert_eq!(generator.prompts(), vec![build_prompt(Level::Teen, "tides")]);
}

#[tokio::test]
async fn test_legacy_level_id_accepted() {
    let generator = Arc::new(StubGenerator::hello());
    let app = test_router(generator.clone());

    let response = app
        .oneshot(post_explain(
            json!({ "topic": "tides", "level": "college" }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        generator.prompts(),
        vec![build_prompt(Level::Undergraduate, "tides")]
    );
}

#[tokio::test]
async fn test_non_streaming_upstream_failure() {
    let generator = Arc::new(StubGenerator::new(Script::FailToOpen));
    let app = test_router(generator);

    let response = app
        .oneshot(post_explain(
            json!({ "topic": "tides", "level": "expert" }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "generation failed" }));
}

#[tokio::test]
async fn test_streaming_wire_format() {
    let generator = Arc::new(StubGenerator::hello());
    let app = test_router(generator.clone());

    let response = app
        .oneshot(post_explain(
            json!({ "topic": "tides", "level": "teen", "stream": true }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(
        std::str::from_utf8(&body).unwrap(),
        "data: {\"text\":\"Hel\"}\n\n\
         data: {\"text\":\"lo, \"}\n\n\
         data: {\"text\":\"world.\"}\n\n\
         data: {\"done\":true}\n\n"
    );
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_streaming_without_fragments_still_terminates() {
    let generator = Arc::new(StubGenerator::new(Script::Fragments(vec!["", ""])));
    let app = test_router(generator);

    let response = app
        .oneshot(post_explain(
            json!({ "topic": "tides", "level": "teen", "stream": true }).to_string(),
        ))
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(std::str::from_utf8(&body).unwrap(), "data: {\"done\":true}\n\n");
}

#[tokio::test]
async fn test_streaming_open_failure_is_500() {
    let generator = Arc::new(StubGenerator::new(Script::FailToOpen));
    let app = test_router(generator);

    let response = app
        .oneshot(post_explain(
            json!({ "topic": "tides", "level": "teen", "stream": true }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "generation failed" }));
}

#[tokio::test]
async fn test_streaming_failure_midway_has_no_done_record() {
    let generator = Arc::new(StubGenerator::new(Script::FailAfter(vec!["Hel"])));
    let app = test_router(generator);

    let response = app
        .oneshot(post_explain(
            json!({ "topic": "tides", "level": "teen", "stream": true }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body();
    let mut received = String::new();
    let mut aborted = false;
    while let Some(frame) = body.frame().await {
        match frame {
            Ok(frame) => {
                if let Ok(data) = frame.into_data() {
                    received.push_str(std::str::from_utf8(&data).unwrap());
                }
            }
            Err(_) => {
                aborted = true;
                break;
            }
        }
    }

    assert!(aborted);
    assert_eq!(received, "data: {\"text\":\"Hel\"}\n\n");
    assert!(!received.contains("done"));
}

#[tokio::test]
async fn test_health() {
    let app = test_router(Arc::new(StubGenerator::hello()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}
