//! HTTP routes for the assistant, event CRUD, notifications, and logs

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use calendai_domain::{
    ConfirmReply, Event, EventFilter, EventPatch, EventType, NewEvent, Notification,
    OperationLogEntry, ProposeReply,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{success, ApiError};
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/assistant/propose", post(propose))
        .route("/api/assistant/confirm", post(confirm))
        .route("/api/events", post(create_event).get(list_events))
        .route("/api/events/{id}", get(get_event).put(update_event).delete(delete_event))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/{id}/read", post(mark_notification_read))
        .route("/api/operation-logs", get(list_operation_logs))
        .with_state(state)
}

/// Caller identity; authentication itself is out of scope.
fn current_user(headers: &HeaderMap) -> Result<i64, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(|| ApiError::unauthorized("missing or invalid x-user-id header"))
}

async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.db.health_check()?;
    Ok(success(json!({ "status": "ok" })))
}

/* -------------------------------------------------------------------- */
/* Assistant                                                            */
/* -------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
struct ProposeRequest {
    message: String,
}

async fn propose(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ProposeRequest>,
) -> Result<Json<crate::error::Envelope<ProposeReply>>, ApiError> {
    let user_id = current_user(&headers)?;
    let reply = state.dialogue.propose(user_id, &req.message).await?;
    Ok(success(reply))
}

#[derive(Debug, Deserialize)]
struct ConfirmRequest {
    confirm_token: String,
    #[serde(default)]
    event_id: Option<i64>,
}

async fn confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<crate::error::Envelope<ConfirmReply>>, ApiError> {
    let user_id = current_user(&headers)?;
    let reply = state.dialogue.confirm(user_id, &req.confirm_token, req.event_id).await?;
    Ok(success(reply))
}

/* -------------------------------------------------------------------- */
/* Events                                                               */
/* -------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
struct CreateEventRequest {
    title: String,
    #[serde(rename = "type")]
    event_type: String,
    start_time: String,
    end_time: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    participant_ids: Vec<i64>,
}

fn parse_rfc3339(value: &str, field: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::bad_request(format!("{field} must be RFC3339")))
}

fn parse_event_type(value: &str) -> Result<EventType, ApiError> {
    EventType::parse(value)
        .ok_or_else(|| ApiError::bad_request("type must be work, life, or growth"))
}

async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<crate::error::Envelope<Event>>, ApiError> {
    let user_id = current_user(&headers)?;
    if req.title.trim().is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }
    let new = NewEvent {
        owner_id: user_id,
        title: req.title.trim().to_string(),
        event_type: parse_event_type(&req.event_type)?,
        start_time: parse_rfc3339(&req.start_time, "start_time")?,
        end_time: parse_rfc3339(&req.end_time, "end_time")?,
        location: req.location,
        description: req.description,
        participant_ids: req.participant_ids,
    };
    let event = state.executor.create(new).await?;
    Ok(success(event))
}

#[derive(Debug, Deserialize)]
struct ListEventsQuery {
    #[serde(rename = "type")]
    event_type: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<crate::error::Envelope<Vec<Event>>>, ApiError> {
    let user_id = current_user(&headers)?;
    let mut filter = EventFilter::default();
    if let Some(raw) = &query.event_type {
        filter.event_type = Some(parse_event_type(raw)?);
    }
    if let Some(raw) = &query.start {
        filter.start = Some(parse_rfc3339(raw, "start")?);
    }
    if let Some(raw) = &query.end {
        filter.end = Some(parse_rfc3339(raw, "end")?);
    }
    let events = state.executor.list_events(user_id, &filter).await?;
    Ok(success(events))
}

async fn get_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<Json<crate::error::Envelope<Event>>, ApiError> {
    let user_id = current_user(&headers)?;
    let event = state.executor.get_event(user_id, event_id).await?;
    Ok(success(event))
}

#[derive(Debug, Deserialize)]
struct UpdateEventRequest {
    title: Option<String>,
    #[serde(rename = "type")]
    event_type: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    location: Option<String>,
    description: Option<String>,
    participant_ids: Option<Vec<i64>>,
}

async fn update_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<crate::error::Envelope<Event>>, ApiError> {
    let user_id = current_user(&headers)?;

    let mut patch = EventPatch::default();
    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(ApiError::bad_request("title must not be empty"));
        }
        patch.title = Some(title.trim().to_string());
    }
    if let Some(raw) = req.event_type {
        patch.event_type = Some(parse_event_type(&raw)?);
    }
    if let Some(raw) = req.start_time {
        patch.start_time = Some(parse_rfc3339(&raw, "start_time")?);
    }
    if let Some(raw) = req.end_time {
        patch.end_time = Some(parse_rfc3339(&raw, "end_time")?);
    }
    patch.location = req.location;
    patch.description = req.description;

    let event = state.executor.update(user_id, event_id, patch, req.participant_ids).await?;
    Ok(success(event))
}

async fn delete_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = current_user(&headers)?;
    state.executor.delete(user_id, event_id).await?;
    Ok(success(json!({ "deleted": true })))
}

/* -------------------------------------------------------------------- */
/* Notifications & operation log                                        */
/* -------------------------------------------------------------------- */

async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<crate::error::Envelope<Vec<Notification>>>, ApiError> {
    let user_id = current_user(&headers)?;
    let notifications = state.notifications.list_for_user(user_id).await?;
    Ok(success(notifications))
}

async fn mark_notification_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(notification_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = current_user(&headers)?;
    state.notifications.mark_read(user_id, notification_id).await?;
    Ok(success(json!({ "read": true })))
}

#[derive(Debug, Deserialize)]
struct OperationLogQuery {
    limit: Option<usize>,
}

async fn list_operation_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OperationLogQuery>,
) -> Result<Json<crate::error::Envelope<Vec<OperationLogEntry>>>, ApiError> {
    let user_id = current_user(&headers)?;
    let limit = query.limit.unwrap_or(20);
    let entries = state.operation_logs.list_recent(user_id, limit).await?;
    Ok(success(entries))
}
