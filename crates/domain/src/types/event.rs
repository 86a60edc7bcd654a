//! Calendar event entities and their projections

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Work,
    Life,
    Growth,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Life => "life",
            Self::Growth => "growth",
        }
    }

    /// Parse a stored or user-supplied value; anything outside the enum is
    /// `None`, never an error.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "work" => Some(Self::Work),
            "life" => Some(Self::Life),
            "growth" => Some(Self::Growth),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar event entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Membership rows; never contains the owner
    pub participant_ids: Vec<i64>,
}

impl Event {
    /// Whether `user_id` may read this event (creator or participant).
    pub fn is_visible_to(&self, user_id: i64) -> bool {
        self.owner_id == user_id || self.participant_ids.contains(&user_id)
    }
}

/// Fields for inserting a new event
///
/// `participant_ids` is already deduplicated with the owner excluded; the
/// executor enforces that before the row set reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub owner_id: i64,
    pub title: String,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub participant_ids: Vec<i64>,
}

/// Partial field-update set; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub event_type: Option<EventType>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.event_type.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.location.is_none()
            && self.description.is_none()
    }
}

/// Lightweight projection surfaced when a reference is ambiguous, for the
/// user to pick from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvent {
    pub id: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
}

impl From<&Event> for CandidateEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location.clone(),
        }
    }
}

/// Query filters for event listing
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    /// Only events ending at or after this instant
    pub start: Option<DateTime<Utc>>,
    /// Only events starting at or before this instant
    pub end: Option<DateTime<Utc>>,
}

/// Point-in-time snapshot captured for the operation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub title: String,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub participant_ids: Vec<i64>,
}

impl From<&Event> for EventSnapshot {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            event_type: event.event_type,
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location.clone(),
            description: event.description.clone(),
            participant_ids: event.participant_ids.clone(),
        }
    }
}

/// Tagged operation-log payload, one variant per action kind.
///
/// Serialized to JSON at the repository boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationDetail {
    Created { title: String, event_type: EventType },
    Updated { before: EventSnapshot, after: EventSnapshot },
    Deleted { title: String },
}

impl OperationDetail {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Created { .. } => "create",
            Self::Updated { .. } => "update",
            Self::Deleted { .. } => "delete",
        }
    }
}

/// Operation log row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLogEntry {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub target_title: String,
    pub detail: OperationDetail,
    pub created_at: DateTime<Utc>,
}

/// Notification kinds fanned out by the executor and the reminder job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Invitation,
    Change,
    Reminder,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invitation => "invitation",
            Self::Change => "change",
            Self::Reminder => "reminder",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "invitation" => Some(Self::Invitation),
            "change" => Some(Self::Change),
            "reminder" => Some(Self::Reminder),
            _ => None,
        }
    }
}

/// User notification record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub content: String,
    pub event_id: i64,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Directory projection of a user, as returned by display-name search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub display_name: String,
    pub email: String,
}
