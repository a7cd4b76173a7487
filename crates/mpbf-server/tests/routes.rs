//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use mpbf_core::LearningConfig;
use mpbf_learning::LearningLogger;
use mpbf_llm::MockCompletionClient;
use mpbf_pipeline::{CommandPipeline, TracingNotifier};
use mpbf_server::{AppState, create_router};
use mpbf_store::InMemoryStore;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn test_router(client: MockCompletionClient) -> (axum::Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let pipeline = CommandPipeline::new(
        Arc::new(client),
        store.clone(),
        LearningLogger::with_storage(
            LearningConfig::default(),
            Arc::new(mpbf_learning::MemoryStorage::new()),
        ),
        Arc::new(TracingNotifier),
    );
    (create_router(AppState::new(pipeline)), store)
}

async fn post_json(router: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn healthz_reports_service() {
    let (router, _) = test_router(MockCompletionClient::new());

    let response = router
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["service"], json!("mpbf-server"));
}

#[tokio::test]
async fn command_then_confirm_over_http() {
    let intent = json!({
        "intent": "create",
        "action": "create_customer",
        "requiresDatabase": true,
        "requestsReport": false,
        "parameters": {"name": "شركة النور", "phone": "0501234567"},
        "confidence": 0.95,
        "missingInfo": []
    })
    .to_string();
    let (router, store) = test_router(MockCompletionClient::new().fallback(intent));

    let (status, body) = post_json(
        router.clone(),
        "/api/assistant/command",
        json!({"userId": 7, "message": "سجل عميل جديد اسمه شركة النور"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], json!("needs_confirmation"));
    let pending = body["pendingAction"].clone();
    assert_eq!(pending["action"], json!("create_customer"));
    assert!(store.customers().is_empty());

    let (status, body) = post_json(
        router,
        "/api/assistant/confirm",
        json!({"userId": 7, "pendingAction": pending}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("success"));
    assert_eq!(store.customers().len(), 1);
}

#[tokio::test]
async fn unknown_command_completes_with_message() {
    let intent = json!({
        "intent": "unknown",
        "action": null,
        "requiresDatabase": false,
        "requestsReport": false,
        "parameters": {},
        "confidence": 0.1,
        "missingInfo": []
    })
    .to_string();
    let (router, _) = test_router(MockCompletionClient::new().fallback(intent));

    let (status, body) = post_json(
        router,
        "/api/assistant/command",
        json!({"userId": 1, "message": "What's the weather today?"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], json!("completed"));
    assert_eq!(body["status"], json!("success"));
    assert!(body["message"].as_str().unwrap().contains("didn't understand"));
}
