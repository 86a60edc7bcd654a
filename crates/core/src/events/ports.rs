//! Port interfaces for the event pipeline
//!
//! These traits define the boundaries between core business logic and
//! infrastructure implementations for event storage, the user directory,
//! notifications, and the operation log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use calendai_domain::{
    Event, EventFilter, EventPatch, NewEvent, Notification, NotificationKind, OperationDetail,
    OperationLogEntry, Result, User,
};

/// Operation-log payload handed to a transactional store call.
#[derive(Debug, Clone)]
pub struct NewOperationLog {
    pub user_id: i64,
    pub target_title: String,
    pub detail: OperationDetail,
}

/// Trait for event persistence and retrieval.
///
/// The mutating operations are transactional composites: the event row, its
/// membership rows, and the operation-log row commit or roll back together.
/// Keeping the transaction inside one adapter call is what makes the
/// all-or-nothing guarantee enforceable at this boundary.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Single event scoped to its owner; `None` when absent or foreign-owned.
    async fn find_owned(&self, owner_id: i64, event_id: i64) -> Result<Option<Event>>;

    /// Single event regardless of ownership (read-path access checks happen
    /// in the executor).
    async fn find_by_id(&self, event_id: i64) -> Result<Option<Event>>;

    /// Owner-scoped candidate search. `window` restricts to events whose
    /// interval overlaps it (`start < window.1 AND end >= window.0`); every
    /// keyword must substring-match title or description. Ordered by start
    /// time descending, capped at `limit`.
    async fn search_candidates(
        &self,
        owner_id: i64,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<Event>>;

    /// Events the user owns or participates in, filtered, ordered by start
    /// time ascending.
    async fn list_visible(&self, user_id: i64, filter: &EventFilter) -> Result<Vec<Event>>;

    /// Events starting inside `[from, until]`, any owner. Used by the
    /// reminder sweep.
    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>>;

    /// Insert the event, its membership rows, and the log entry in one
    /// transaction; returns the stored event.
    async fn insert_event(&self, event: NewEvent, log: NewOperationLog) -> Result<Event>;

    /// Apply the patch, optionally replace the full membership set, and
    /// write the log entry in one transaction; returns the reloaded event.
    async fn update_event(
        &self,
        event_id: i64,
        patch: EventPatch,
        participant_ids: Option<Vec<i64>>,
        log: NewOperationLog,
    ) -> Result<Event>;

    /// Delete membership rows then the event row and write the log entry in
    /// one transaction.
    async fn delete_event(&self, event_id: i64, log: NewOperationLog) -> Result<()>;
}

/// Trait for user-directory lookups.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Case-insensitive substring search on display name, capped at `limit`.
    async fn search_by_name(&self, keyword: &str, limit: usize) -> Result<Vec<User>>;

    /// Single directory entry by id.
    async fn get(&self, user_id: i64) -> Result<Option<User>>;
}

/// Trait for the notification sink and its read surface.
///
/// Writes are advisory: the executor never lets an append failure roll back
/// or surface from a calendar mutation.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn append(
        &self,
        user_id: i64,
        kind: NotificationKind,
        content: &str,
        event_id: i64,
    ) -> Result<()>;

    /// Whether a reminder for `(event_id, user_id)` was already written.
    async fn reminder_exists(&self, event_id: i64, user_id: i64) -> Result<bool>;

    /// A user's notifications, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>>;

    /// Mark one of the user's notifications read.
    async fn mark_read(&self, user_id: i64, notification_id: i64) -> Result<()>;
}

/// Trait for reading the operation log (appends ride the event-store
/// transactions).
#[async_trait]
pub trait OperationLogStore: Send + Sync {
    /// A user's recent entries, newest first, capped at `limit`.
    async fn list_recent(&self, user_id: i64, limit: usize) -> Result<Vec<OperationLogEntry>>;
}
