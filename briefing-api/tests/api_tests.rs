//! Integration tests for briefing-api endpoints
//!
//! The router runs against an in-memory database and a scripted completion
//! client, so no network access is needed.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use briefing_api::{build_router, AppState};
use briefing_common::completion::{CompletionClient, CompletionError, CompletionRequest};
use briefing_common::config::MissingFieldPolicy;
use briefing_common::db::init_schema;
use briefing_common::extract::{Extractor, ExtractorSettings};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

const REPLY: &str = r#"{"objetivo":"Criar logo novo","publico_alvo":"Cliente","referencias":[],"prazos":{"entrega":"2 semanas"},"orcamento":{"total":2000.0},"observacoes":[]}"#;

const CONVERSATION: &str = "Cliente quer um logo novo, entrega em 2 semanas, orçamento de R$2000";

/// How the scripted client answers
#[derive(Clone)]
enum Script {
    Reply(String),
    Fail(u16),
    Hang,
}

struct ScriptedClient {
    script: Script,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(status) => Err(CompletionError::ApiError(*status, "upstream down".into())),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(String::new())
            }
        }
    }
}

struct TestApp {
    router: axum::Router,
    calls: Arc<AtomicUsize>,
}

async fn setup_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}

async fn setup_app(script: Script) -> TestApp {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = ScriptedClient {
        script,
        calls: calls.clone(),
    };
    let settings = ExtractorSettings {
        timeout: Duration::from_millis(100),
        missing_field_policy: MissingFieldPolicy::Strict,
        ..Default::default()
    };
    let state = AppState::new(setup_db().await, Extractor::new(Arc::new(client), settings));
    let origins = vec!["http://localhost:3000".to_string()];

    TestApp {
        router: build_router(state, &origins),
        calls,
    }
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

async fn save(app: &TestApp, user_id: &str, objetivo: &str) -> Value {
    let mut briefing: Value = serde_json::from_str(REPLY).unwrap();
    briefing["objetivo"] = json!(objetivo);
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/briefings",
            json!({"user_id": user_id, "briefing": briefing, "input_text": CONVERSATION}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "save failed: {body}");
    body
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let (status, body) = send(&app, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "briefing-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

// =============================================================================
// Generation
// =============================================================================

#[tokio::test]
async fn test_generate_end_to_end() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/generate-briefing",
            json!({"conversation": CONVERSATION, "user_id": "user-1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["objetivo"], "Criar logo novo");
    assert_eq!(body["orcamento"]["total"], 2000.0);
    assert_eq!(body["prazos"]["entrega"], "2 semanas");
    assert_eq!(body["texto_original"], CONVERSATION);
    assert_eq!(app.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_generate_tolerates_prose_around_json() {
    let app = setup_app(Script::Reply(format!("Claro! Aqui está:\n```json\n{}\n```", REPLY))).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/generate-briefing",
            json!({"conversation": CONVERSATION, "user_id": "user-1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["objetivo"], "Criar logo novo");
}

#[tokio::test]
async fn test_generate_rejects_blank_conversation_without_calling_model() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/generate-briefing",
            json!({"conversation": "   \n", "user_id": "user-1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid-input");
    assert_eq!(app.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generate_rejects_unparseable_body() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let request = Request::builder()
        .method("POST")
        .uri("/generate-briefing")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid-input");
}

#[tokio::test]
async fn test_generate_malformed_reply_is_bad_gateway() {
    let app = setup_app(Script::Reply("Desculpe, não entendi.".into())).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/generate-briefing",
            json!({"conversation": CONVERSATION, "user_id": "user-1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "malformed-response");
}

#[tokio::test]
async fn test_generate_schema_mismatch_is_bad_gateway() {
    let app = setup_app(Script::Reply(r#"{"objetivo": "Só isso"}"#.into())).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/generate-briefing",
            json!({"conversation": CONVERSATION, "user_id": "user-1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "schema-mismatch");
    assert!(body["error"]["message"].as_str().unwrap().contains("publico_alvo"));
}

#[tokio::test]
async fn test_generate_upstream_failure_is_bad_gateway() {
    let app = setup_app(Script::Fail(500)).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/generate-briefing",
            json!({"conversation": CONVERSATION, "user_id": "user-1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "upstream-failed");
}

#[tokio::test]
async fn test_generate_timeout_is_gateway_timeout() {
    let app = setup_app(Script::Hang).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/generate-briefing",
            json!({"conversation": CONVERSATION, "user_id": "user-1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], "upstream-timeout");
}

// =============================================================================
// Save / list / view / export / delete
// =============================================================================

#[tokio::test]
async fn test_save_and_view() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let saved = save(&app, "user-1", "Criar logo novo").await;
    let id = saved["id"].as_str().unwrap();
    assert_eq!(saved["title"], "Criar logo novo");
    assert_eq!(saved["user_id"], "user-1");

    let (status, body) = send(&app, test_request("GET", &format!("/briefings/user-1/{id}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["content"]["input_text"], CONVERSATION);
    assert_eq!(body["content"]["briefing_result"]["orcamento"]["total"], 2000.0);
    assert!(body["created_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_save_generated_briefing_uses_original_text() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let (_, generated) = send(
        &app,
        json_request(
            "POST",
            "/generate-briefing",
            json!({"conversation": CONVERSATION, "user_id": "user-1"}),
        ),
    )
    .await;

    let (status, saved) = send(
        &app,
        json_request("POST", "/briefings", json!({"user_id": "user-1", "briefing": generated})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["content"]["input_text"], CONVERSATION);
    assert!(saved["content"]["briefing_result"].get("texto_original").is_none());
}

#[tokio::test]
async fn test_save_rejects_invalid_briefing() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/briefings",
            json!({"user_id": "user-1", "briefing": {"objetivo": "x"}, "input_text": "oi"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid-input");

    let briefing: Value = serde_json::from_str(REPLY).unwrap();
    let (status, _) = send(
        &app,
        json_request("POST", "/briefings", json!({"user_id": "user-1", "briefing": briefing})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_is_paginated_newest_first() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    for i in 1..=7 {
        save(&app, "user-1", &format!("Briefing {i}")).await;
    }
    save(&app, "user-2", "De outro usuário").await;

    let (status, body) = send(&app, test_request("GET", "/briefings/user-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 6);
    assert_eq!(body["total"], 7);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["has_more"], true);

    let titles: Vec<&str> = body["briefings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 6);
    assert_eq!(titles[0], "Briefing 7");
    assert_eq!(titles[5], "Briefing 2");

    let (_, body) = send(&app, test_request("GET", "/briefings/user-1?page=2")).await;
    assert_eq!(body["has_more"], false);
    assert_eq!(body["briefings"][0]["title"], "Briefing 1");
    assert_eq!(body["briefings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_empty_user() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let (status, body) = send(&app, test_request("GET", "/briefings/nobody")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["briefings"], json!([]));
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn test_list_rejects_non_numeric_page_as_json_error() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let (status, body) = send(&app, test_request("GET", "/briefings/user-1?page=abc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid-input");
    assert!(body["error"]["message"].as_str().unwrap().contains("query"));
}

#[tokio::test]
async fn test_view_other_users_briefing_is_forbidden() {
    let app = setup_app(Script::Reply(REPLY.into())).await;
    let saved = save(&app, "owner", "Privado").await;
    let id = saved["id"].as_str().unwrap();

    let (status, body) = send(&app, test_request("GET", &format!("/briefings/intruder/{id}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");

    let (status, _) = send(&app, test_request("DELETE", &format!("/briefings/intruder/{id}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, test_request("GET", &format!("/briefings/owner/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_view_unknown_briefing_is_not_found() {
    let app = setup_app(Script::Reply(REPLY.into())).await;

    let (status, body) = send(
        &app,
        test_request("GET", "/briefings/user-1/5b1c3f0e-0000-4000-8000-000000000000"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not-found");

    let (status, _) = send(&app, test_request("GET", "/briefings/user-1/not-an-id")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_renders_plain_text() {
    let app = setup_app(Script::Reply(REPLY.into())).await;
    let saved = save(&app, "user-1", "Criar logo novo").await;
    let id = saved["id"].as_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(test_request("GET", &format!("/briefings/user-1/{id}/export")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("briefing.txt"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("Criar logo novo\n"));
    assert!(text.contains("R$ 2000.00"));
    assert!(text.contains(CONVERSATION));
}

#[tokio::test]
async fn test_delete_briefing() {
    let app = setup_app(Script::Reply(REPLY.into())).await;
    let saved = save(&app, "user-1", "Apagar").await;
    let id = saved["id"].as_str().unwrap();

    let (status, body) = send(&app, test_request("DELETE", &format!("/briefings/user-1/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, _) = send(&app, test_request("GET", &format!("/briefings/user-1/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, test_request("DELETE", &format!("/briefings/user-1/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
