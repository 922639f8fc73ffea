//! End-to-end smoke tests for the full relayhubd stack.
//!
//! Each test spins up the complete application (mock Denkovi board, real
//! integration, real services, real axum router) and exercises the HTTP layer
//! via `tower::ServiceExt::oneshot`, no TCP port is bound.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mockito::{Matcher, Server, ServerGuard};
use relayhub_adapter_denkovi::{DenkoviConfig, DenkoviIntegration, RelayConfig};
use relayhub_adapter_http_axum::router;
use relayhub_adapter_http_axum::state::AppState;
use relayhub_app::ports::Integration;
use relayhub_app::services::entity_service::EntityService;
use relayhub_app::services::integration_service::IntegrationService;
use serde_json::{Value, json};
use tower::ServiceExt;

fn board(values: &[u8]) -> String {
    let outputs: Vec<_> = values.iter().map(|v| json!({ "Value": v })).collect();
    json!({ "CurrentState": { "Output": outputs } }).to_string()
}

/// Build a fully-wired router talking to the mock board.
async fn app(server: &mut ServerGuard) -> axum::Router {
    let _refresh = server
        .mock("GET", "/current_state.json")
        .match_query(Matcher::Exact("pw=admin".to_string()))
        .with_status(200)
        .with_body(board(&[0, 1, 0, 0]))
        .create_async()
        .await;

    let config = DenkoviConfig::new(server.url(), "admin")
        .with_relay(
            "1",
            RelayConfig {
                name: Some("Garage Door".to_string()),
                invert: false,
            },
        )
        .with_relay(
            "2",
            RelayConfig {
                name: Some("Heater".to_string()),
                invert: true,
            },
        );

    let mut integration = DenkoviIntegration::new(config);
    let discovered = integration
        .setup()
        .await
        .expect("mock board should answer");

    let entities = Arc::new(EntityService::new());
    for device in discovered {
        entities.register(device).await.unwrap();
    }
    let service = IntegrationService::new(Arc::new(integration), entities);
    router::build(AppState::new(service))
}

async fn send(app: &axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn entity_id_of(entities: &Value, slug: &str) -> String {
    entities
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["entity_id"] == slug)
        .and_then(|e| e["id"].as_str())
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let mut server = Server::new_async().await;
    let app = app(&mut server).await;

    let (status, _) = send(&app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_expose_configured_relays_as_switches() {
    let mut server = Server::new_async().await;
    let app = app(&mut server).await;

    let (status, entities) = send(&app, "GET", "/api/entities").await;

    assert_eq!(status, StatusCode::OK);
    let entities = entities.as_array().unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0]["entity_id"], "switch.garage_door");
    assert_eq!(entities[0]["state"], "off");
    assert_eq!(entities[0]["attributes"]["relay"], 1);
    // inverted relay reading `1` is off
    assert_eq!(entities[1]["entity_id"], "switch.heater");
    assert_eq!(entities[1]["state"], "off");
    assert_eq!(entities[1]["attributes"]["invert"], true);
}

#[tokio::test]
async fn should_list_the_board_as_a_device() {
    let mut server = Server::new_async().await;
    let app = app(&mut server).await;

    let (status, devices) = send(&app, "GET", "/api/devices").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(devices.as_array().unwrap().len(), 1);
    assert_eq!(devices[0]["name"], "Denkovi switch");
    assert_eq!(devices[0]["manufacturer"], "Denkovi");
}

// ---------------------------------------------------------------------------
// Service calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_turn_on_relay_through_api() {
    let mut server = Server::new_async().await;
    let app = app(&mut server).await;
    let command = server
        .mock("GET", "/current_state.json")
        .match_query(Matcher::Exact("pw=admin&Relay1=1".to_string()))
        .with_status(200)
        .with_body(board(&[1, 1, 0, 0]))
        .create_async()
        .await;

    let (_, entities) = send(&app, "GET", "/api/entities").await;
    let id = entity_id_of(&entities, "switch.garage_door");

    let (status, entity) = send(
        &app,
        "POST",
        &format!("/api/entities/{id}/services/turn_on"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(entity["state"], "on");
    command.assert_async().await;

    let (_, entity) = send(&app, "GET", &format!("/api/entities/{id}")).await;
    assert_eq!(entity["state"], "on");
}

#[tokio::test]
async fn should_send_inverted_payload_for_inverted_relay() {
    let mut server = Server::new_async().await;
    let app = app(&mut server).await;
    let command = server
        .mock("GET", "/current_state.json")
        .match_query(Matcher::Exact("pw=admin&Relay2=0".to_string()))
        .with_status(200)
        .with_body(board(&[0, 0, 0, 0]))
        .create_async()
        .await;

    let (_, entities) = send(&app, "GET", "/api/entities").await;
    let id = entity_id_of(&entities, "switch.heater");

    let (status, entity) = send(
        &app,
        "POST",
        &format!("/api/entities/{id}/services/turn_on"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(entity["state"], "on");
    command.assert_async().await;
}

#[tokio::test]
async fn should_mark_relay_unavailable_when_board_errors() {
    let mut server = Server::new_async().await;
    let app = app(&mut server).await;
    let _command = server
        .mock("GET", "/current_state.json")
        .match_query(Matcher::Exact("pw=admin&Relay1=1".to_string()))
        .with_status(500)
        .create_async()
        .await;

    let (_, entities) = send(&app, "GET", "/api/entities").await;
    let id = entity_id_of(&entities, "switch.garage_door");

    let (status, entity) = send(
        &app,
        "POST",
        &format!("/api/entities/{id}/services/turn_on"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(entity["state"], "unavailable");
}

#[tokio::test]
async fn should_reject_unsupported_service() {
    let mut server = Server::new_async().await;
    let app = app(&mut server).await;

    let (_, entities) = send(&app, "GET", "/api/entities").await;
    let id = entity_id_of(&entities, "switch.garage_door");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/entities/{id}/services/set_brightness"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("set_brightness"));
}
