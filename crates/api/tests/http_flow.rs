//! HTTP round-trip tests over the full stack: axum router, real SQLite
//! repositories on a tempfile database, and a scripted intent model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use calendai_api::{routes, state};
use calendai_core::events::ports::{
    EventStore, NotificationStore, OperationLogStore, UserDirectory,
};
use calendai_core::{IntentModel, PendingProposals};
use calendai_domain::{CalendaiError, PendingConfig, Result};
use calendai_infra::{
    DbManager, MokaPendingStore, SqliteEventStore, SqliteNotificationStore,
    SqliteOperationLogStore, SqliteUserDirectory,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

struct ScriptedModel(Mutex<VecDeque<String>>);

impl ScriptedModel {
    fn new(responses: Vec<&str>) -> Self {
        Self(Mutex::new(responses.into_iter().map(String::from).collect()))
    }
}

#[async_trait]
impl IntentModel for ScriptedModel {
    async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CalendaiError::Internal("no scripted response left".into()))
    }
}

fn build_app(responses: Vec<&str>) -> (Router, TempDir) {
    let temp = TempDir::new().unwrap();
    let db = Arc::new(DbManager::new(temp.path().join("test.db"), 4).unwrap());
    db.run_migrations().unwrap();
    {
        let conn = db.get_connection().unwrap();
        for (name, email) in [("Alice", "alice@example.com"), ("Bob", "bob@example.com")] {
            conn.execute(
                "INSERT INTO users (display_name, email, created_at, updated_at)
                 VALUES (?, ?, 0, 0)",
                rusqlite::params![name, email],
            )
            .unwrap();
        }
    }

    let events: Arc<dyn EventStore> = Arc::new(SqliteEventStore::new(db.pool()));
    let directory: Arc<dyn UserDirectory> = Arc::new(SqliteUserDirectory::new(db.pool()));
    let notifications: Arc<dyn NotificationStore> =
        Arc::new(SqliteNotificationStore::new(db.pool()));
    let operation_logs: Arc<dyn OperationLogStore> =
        Arc::new(SqliteOperationLogStore::new(db.pool()));
    let model: Arc<dyn IntentModel> = Arc::new(ScriptedModel::new(responses));
    let pending: Arc<dyn PendingProposals> =
        Arc::new(MokaPendingStore::new(&PendingConfig::default()));

    let (app_state, _reminders) =
        state::assemble(db, events, directory, notifications, operation_logs, model, pending);
    (routes::router(app_state), temp)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user_id: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id.to_string());
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value =
        if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

const CREATE_SYNC: &str = r#"{"action":"create","title":"Sync","type":"work",
    "start_time":"2024-06-10T10:00:00Z","end_time":"2024-06-10T11:00:00Z",
    "participant_keywords":["Bob"]}"#;

#[tokio::test]
async fn assistant_round_trip_creates_one_event_and_fans_out() {
    let (app, _temp) = build_app(vec![CREATE_SYNC]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/assistant/propose",
        Some(1),
        Some(json!({ "message": "sync with bob at 10" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["needs_confirm"], true);
    let token = body["data"]["confirm_token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/assistant/confirm",
        Some(1),
        Some(json!({ "confirm_token": token.as_str() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "success");
    let event_id = body["data"]["event"]["id"].as_i64().unwrap();

    // Exactly one event exists and Bob was invited.
    let (_, body) = send(&app, Method::GET, "/api/events", Some(1), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = send(&app, Method::GET, "/api/notifications", Some(2), None).await;
    let notifications = body["data"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "invitation");
    assert_eq!(notifications[0]["event_id"].as_i64().unwrap(), event_id);

    // The same token cannot apply twice.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/assistant/confirm",
        Some(1),
        Some(json!({ "confirm_token": token.as_str() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "error");
    let (_, body) = send(&app, Method::GET, "/api/events", Some(1), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn direct_crud_flow() {
    let (app, _temp) = build_app(vec![]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(1),
        Some(json!({
            "title": "Standup",
            "type": "work",
            "start_time": "2024-06-10T09:00:00Z",
            "end_time": "2024-06-10T09:30:00Z",
            "participant_ids": [2]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let event_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/events/{event_id}"),
        Some(1),
        Some(json!({ "title": "Standup (moved)", "end_time": "2024-06-10T10:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Standup (moved)");

    // Operation log recorded both mutations.
    let (_, body) = send(&app, Method::GET, "/api/operation-logs", Some(1), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) =
        send(&app, Method::DELETE, &format!("/api/events/{event_id}"), Some(1), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        send(&app, Method::GET, &format!("/api/events/{event_id}"), Some(1), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let (app, _temp) = build_app(vec![]);

    // Missing identity header.
    let (status, _) = send(&app, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Equal start/end on the direct path.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(1),
        Some(json!({
            "title": "Standup",
            "type": "work",
            "start_time": "2024-06-10T09:00:00Z",
            "end_time": "2024-06-10T09:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40001);

    // Unsupported type enum.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(1),
        Some(json!({
            "title": "Standup",
            "type": "meeting",
            "start_time": "2024-06-10T09:00:00Z",
            "end_time": "2024-06-10T09:30:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _temp) = build_app(vec![]);
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}
