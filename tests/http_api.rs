//! Integration tests for the HTTP API.
//!
//! Requests go through the full router (with its middleware layers) backed
//! by a scripted gateway.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::Router;
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use guided_consult::adapters::ai::{MockAIProvider, MockError, MockResponse};
use guided_consult::adapters::http::{app_router, ConsultationAppState};
use guided_consult::adapters::storage::InMemorySessionStore;
use guided_consult::application::{
    ConsultationService, DialogueController, DialogueSettings, HealthTipGenerator,
    SuggestionGenerator, TipBoard,
};
use guided_consult::config::ServerConfig;
use guided_consult::domain::consultation::{HeadingReportDetector, InterviewProfile, TurnLimit};

// =============================================================================
// Test Infrastructure
// =============================================================================

const REPORT: &str = "### 🩺 Pattern Differentiation\nLiver qi stagnation.\n";

fn app(provider: MockAIProvider) -> Router {
    let provider = Arc::new(provider);
    let profile = InterviewProfile::wellness();
    let controller = DialogueController::new(
        provider.clone(),
        SuggestionGenerator::new(provider.clone()),
        Arc::new(HeadingReportDetector::new(profile.report_headings.iter())),
        DialogueSettings {
            stream: false,
            ..DialogueSettings::default()
        },
    );
    let service = ConsultationService::new(
        Arc::new(InMemorySessionStore::new()),
        controller,
        profile,
        TurnLimit::UNLIMITED,
    );
    let tips = Arc::new(TipBoard::new(HealthTipGenerator::new(provider)));
    app_router(ConsultationAppState::new(service, tips), &ServerConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, http::HeaderMap, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}

async fn create(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/consultations", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

fn reply(text: &str) -> MockResponse {
    MockResponse::Success {
        content: text.to_string(),
        usage: guided_consult::ports::TokenUsage::new(10, 10),
        finish_reason: guided_consult::ports::FinishReason::Stop,
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn health_check_is_ok() {
    let app = app(MockAIProvider::new());
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn created_consultation_shows_greeting_and_intake_shortcuts() {
    let app = app(MockAIProvider::new());
    let (status, body) = send(&app, Method::POST, "/api/consultations", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["stage"], "intake");
    assert_eq!(body["turn_count"], 0);
    assert_eq!(body["turn_limit"], Value::Null);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["shortcuts"].as_array().unwrap().len(), 4);

    let id = body["id"].as_str().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/api/consultations/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], body["id"]);
}

#[tokio::test]
async fn full_interview_produces_downloadable_report() {
    let provider = MockAIProvider::new()
        .with_response("How long has it lasted?")
        .with_response("Days|Weeks|Months")
        .with_response(REPORT);
    let app = app(provider);
    let id = create(&app).await;

    let (status, turn) = send(
        &app,
        Method::POST,
        &format!("/api/consultations/{}/messages", id),
        Some(json!({"content": "I feel bloated"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(turn["session"]["stage"], "interviewing");
    assert_eq!(turn["session"]["suggestions"], json!(["Days", "Weeks", "Months"]));

    let (status, turn) = send(
        &app,
        Method::POST,
        &format!("/api/consultations/{}/shortcuts/finish", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(turn["report_ready"], true);
    assert_eq!(turn["session"]["stage"], "reported");
    assert_eq!(turn["session"]["report_available"], true);

    let (status, headers, bytes) = send_raw(
        &app,
        Method::GET,
        &format!("/api/consultations/{}/report", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, REPORT.as_bytes());
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "text/markdown; charset=utf-8"
    );
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("consultation-report.md"));
}

#[tokio::test]
async fn reset_returns_to_intake() {
    let app = app(MockAIProvider::new());
    let id = create(&app).await;
    send(
        &app,
        Method::POST,
        &format!("/api/consultations/{}/messages", id),
        Some(json!({"content": "Hair loss"})),
    )
    .await;

    let (status, body) = send(&app, Method::POST, &format!("/api/consultations/{}/reset", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "intake");
    assert_eq!(body["turn_count"], 0);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Caller errors
// =============================================================================

#[tokio::test]
async fn empty_message_is_bad_request() {
    let app = app(MockAIProvider::new());
    let id = create(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/consultations/{}/messages", id),
        Some(json!({"content": "   "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_FIELD");
}

#[tokio::test]
async fn unknown_consultation_is_not_found() {
    let app = app(MockAIProvider::new());
    let uri = format!("/api/consultations/{}", uuid::Uuid::new_v4());

    let (status, body) = send(&app, Method::GET, &uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn unknown_shortcut_is_not_found() {
    let app = app(MockAIProvider::new());
    let id = create(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/consultations/{}/shortcuts/nope", id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SHORTCUT_NOT_FOUND");
}

#[tokio::test]
async fn report_before_reporting_is_conflict() {
    let app = app(MockAIProvider::new());
    let id = create(&app).await;

    let (status, body) = send(&app, Method::GET, &format!("/api/consultations/{}/report", id), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "REPORT_NOT_READY");
}

#[tokio::test]
async fn gateway_failure_is_bad_gateway_then_retry_succeeds() {
    let provider = MockAIProvider::new()
        .with_error(MockError::Unavailable { message: "overloaded".to_string() })
        .with_response("Since when?");
    let app = app(provider);
    let id = create(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/consultations/{}/messages", id),
        Some(json!({"content": "Cold feet"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "AI_PROVIDER_ERROR");

    let (_, view) = send(&app, Method::GET, &format!("/api/consultations/{}", id), None).await;
    assert_eq!(view["awaiting_response"], true);
    let last = view["messages"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["kind"], "notice");

    let (status, turn) = send(&app, Method::POST, &format!("/api/consultations/{}/retry", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(turn["session"]["awaiting_response"], false);
    assert_eq!(turn["session"]["stage"], "interviewing");
}

#[tokio::test]
async fn turn_survives_client_disconnect() {
    let provider = MockAIProvider::new()
        .with_response("Since when?")
        .with_response("Days|Weeks")
        .with_delay(Duration::from_millis(100));
    let app = app(provider);
    let id = create(&app).await;

    let dropped = tokio::time::timeout(
        Duration::from_millis(20),
        send(
            &app,
            Method::POST,
            &format!("/api/consultations/{}/messages", id),
            Some(json!({"content": "Cold feet"})),
        ),
    )
    .await;
    assert!(dropped.is_err());

    tokio::time::sleep(Duration::from_millis(600)).await;
    let (status, view) = send(&app, Method::GET, &format!("/api/consultations/{}", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["awaiting_response"], false);
    let last = view["messages"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["content"], "Since when?");
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let app = app(MockAIProvider::new());
    let (status, _) = send(&app, Method::GET, "/api/consultations/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Tips
// =============================================================================

#[tokio::test]
async fn tip_refresh_replaces_current_tip() {
    let app = app(MockAIProvider::new().with_response("🍵 Sip warm ginger tea after meals."));

    let (status, current) = send(&app, Method::GET, "/api/tips/current", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["topic"], Value::Null);

    let (status, refreshed) = send(&app, Method::POST, "/api/tips/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["text"], "🍵 Sip warm ginger tea after meals.");

    let (_, current) = send(&app, Method::GET, "/api/tips/current", None).await;
    assert_eq!(current["text"], refreshed["text"]);
}
