//! Integration tests for the Hoover HTTP API.
//!
//! Each test builds its own router over an in-memory local index, so tests
//! are independent and need no network.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use hoover_api::create_router;
use hoover_api::handlers::HealthResponse;
use hoover_api::state::AppState;
use hoover_chat::{GreetedSet, TurnHandler, TurnSettings, VocabularyIndex};
use hoover_core::HooverConfig;
use hoover_search::LocalIndex;

// =============================================================================
// Helpers
// =============================================================================

const TEST_TOKEN: &str = "test-token-12345";

fn enriched(images: &[&str], path: &str, text: &str) -> String {
    json!({
        "/document/normalized_images/*/imageStoreUri": images,
        "/document": {
            "metadata_storage_path": path,
            "metadata_storage_sas_token": "sig=test"
        },
        "/document/finalText": text,
    })
    .to_string()
}

/// Router over a small corpus: two moon-landing scans and one MKULTRA memo.
fn make_app() -> axum::Router {
    let index = LocalIndex::in_memory().unwrap();
    index
        .add_document(
            "doc-1",
            &enriched(
                &["https://img/1a.png", "https://img/1b.png"],
                "https://store/1.pdf",
                "cover sheet[image: image1.tif]Apollo moon landing telemetry",
            ),
        )
        .unwrap();
    index
        .add_document(
            "doc-2",
            &enriched(
                &["https://img/2a.png"],
                "https://store/2.pdf",
                "Press briefing on the moon landing",
            ),
        )
        .unwrap();
    index
        .add_document(
            "doc-3",
            &enriched(
                &["https://img/3a.png"],
                "https://store/3.pdf",
                "MKULTRA subproject funding memo",
            ),
        )
        .unwrap();

    let vocabulary = Arc::new(VocabularyIndex::from_entries([(
        "MKULTRA",
        "CIA mind-control program",
    )]));
    let config = HooverConfig::default();
    let handler = TurnHandler::new(
        vocabulary,
        Arc::new(index),
        Arc::new(GreetedSet::with_seed(config.chat.pre_greeted.clone())),
        TurnSettings::from_config(&config),
    );

    create_router(AppState::new(config, handler, TEST_TOKEN))
}

fn authed_post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("authorization", format!("Bearer {}", TEST_TOKEN))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn message(text: &str) -> Value {
    json!({
        "type": "message",
        "text": text,
        "from": {"id": "user-1"},
        "recipient": {"id": "hoover-bot"},
    })
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_health_no_auth_required() {
    let resp = make_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.backend, "local");
    assert_eq!(health.vocabulary_terms, 1);
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_messages_requires_auth() {
    let req = Request::post("/api/messages")
        .header("content-type", "application/json")
        .body(Body::from(message("hello").to_string()))
        .unwrap();
    let resp = make_app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "Missing Authorization header");
}

#[tokio::test]
async fn test_messages_rejects_wrong_token() {
    let req = Request::post("/api/messages")
        .header("authorization", "Bearer wrong")
        .header("content-type", "application/json")
        .body(Body::from(message("hello").to_string()))
        .unwrap();
    let resp = make_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// POST /api/messages
// =============================================================================

#[tokio::test]
async fn test_small_talk_turn() {
    let resp = make_app()
        .oneshot(authed_post_json("/api/messages", message("hello there")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let activities = body_json(resp).await;
    let activities = activities.as_array().unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(
        activities[0]["text"],
        "Hello! Good to meet you. What are you interested in today?"
    );
}

#[tokio::test]
async fn test_search_turn_returns_carousel() {
    let resp = make_app()
        .oneshot(authed_post_json(
            "/api/messages",
            message("can you find me documents about the moon landing"),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let activities = body_json(resp).await;
    let activities = activities.as_array().unwrap();
    assert_eq!(activities.len(), 1);

    let reply = &activities[0];
    assert_eq!(
        reply["text"],
        "I found some documents about \"moon landing\" you may be interested in."
    );
    assert_eq!(reply["attachmentLayout"], "carousel");
    let attachments = reply["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 2);
    assert_eq!(
        attachments[0]["contentType"],
        "application/vnd.microsoft.card.adaptive"
    );
    assert_eq!(
        reply["suggestedActions"]["actions"][0]["value"],
        "https://jfk-demo.azurewebsites.net/#/search?term=moon%20landing"
    );

    // The two-page scan shows its second page.
    let images: Vec<&str> = attachments
        .iter()
        .map(|a| a["content"]["body"][0]["url"].as_str().unwrap())
        .collect();
    assert!(images.contains(&"https://img/1b.png"));
}

#[tokio::test]
async fn test_term_with_single_result_sends_definition_only() {
    let resp = make_app()
        .oneshot(authed_post_json("/api/messages", message("tell me about mkultra")))
        .await
        .unwrap();

    let activities = body_json(resp).await;
    let activities = activities.as_array().unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0]["text"], "MKULTRA: CIA mind-control program");
    assert_eq!(activities[0]["speak"], "CIA mind-control program");
}

#[tokio::test]
async fn test_no_match_turn() {
    let resp = make_app()
        .oneshot(authed_post_json("/api/messages", message("files on Zapruder")))
        .await
        .unwrap();

    let activities = body_json(resp).await;
    assert_eq!(
        activities[0]["text"],
        "I'm sorry, I can't find any documents matching \"Zapruder\""
    );
}

#[tokio::test]
async fn test_membership_turn_greets_once() {
    let app = make_app();
    let update = json!({
        "type": "conversationUpdate",
        "from": {"id": "channel"},
        "recipient": {"id": "hoover-bot"},
        "membersAdded": [{"id": "hoover-bot"}, {"id": "agent-99"}],
    });

    let resp = app
        .clone()
        .oneshot(authed_post_json("/api/messages", update.clone()))
        .await
        .unwrap();
    let first = body_json(resp).await;
    assert_eq!(first.as_array().unwrap().len(), 1);
    assert!(first[0]["text"]
        .as_str()
        .unwrap()
        .starts_with("Welcome, investigator!"));

    let resp = app
        .oneshot(authed_post_json("/api/messages", update))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn test_empty_message_is_bad_request() {
    let resp = make_app()
        .oneshot(authed_post_json("/api/messages", message("   ")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_malformed_turn_is_rejected() {
    let resp = make_app()
        .oneshot(authed_post_json("/api/messages", json!({"text": "no type or sender"})))
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_activity_type_is_ignored() {
    let resp = make_app()
        .oneshot(authed_post_json(
            "/api/messages",
            json!({"type": "typing", "from": {"id": "user-1"}}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}

// =============================================================================
// POST /api/messages/stream
// =============================================================================

#[tokio::test]
async fn test_stream_emits_activity_events() {
    let resp = make_app()
        .oneshot(authed_post_json(
            "/api/messages/stream",
            message("what does mkultra mean"),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let body = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(body.contains("event: activity"));
    assert!(body.contains("MKULTRA: CIA mind-control program"));
    assert!(body.contains("\"type\":\"typing\""));
}

#[tokio::test]
async fn test_stream_validates_before_streaming() {
    let resp = make_app()
        .oneshot(authed_post_json("/api/messages/stream", message("")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
