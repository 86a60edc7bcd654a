//! In-memory mock implementations of the core ports
//!
//! Deterministic stand-ins for the SQLite adapters, letting the dialogue
//! and executor flows run without a database. The event store counts every
//! call so tests can assert that rejected proposals never touch it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use calendai_core::events::ports::{
    EventStore, NewOperationLog, NotificationStore, UserDirectory,
};
use calendai_core::{IntentModel, PendingProposals};
use chrono::{DateTime, Utc};
use calendai_domain::{
    CalendaiError, Event, EventFilter, EventPatch, NewEvent, Notification, NotificationKind,
    Proposal, Result, User,
};
use uuid::Uuid;

/// In-memory `EventStore` with a call counter.
#[derive(Default)]
pub struct MockEventStore {
    events: Mutex<Vec<Event>>,
    logs: Mutex<Vec<NewOperationLog>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
}

impl MockEventStore {
    /// Seed one stored event and return its id.
    pub fn seed(&self, mut event: Event) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        event.id = id;
        self.events.lock().unwrap().push(event);
        id
    }

    /// Number of port calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn logged_operations(&self) -> Vec<NewOperationLog> {
        self.logs.lock().unwrap().clone()
    }

    pub fn get(&self, event_id: i64) -> Option<Event> {
        self.events.lock().unwrap().iter().find(|e| e.id == event_id).cloned()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn matches_keywords(event: &Event, keywords: &[String]) -> bool {
    keywords.iter().all(|keyword| {
        let needle = keyword.to_lowercase();
        event.title.to_lowercase().contains(&needle)
            || event.description.to_lowercase().contains(&needle)
    })
}

#[async_trait]
impl EventStore for MockEventStore {
    async fn find_owned(&self, owner_id: i64, event_id: i64) -> Result<Option<Event>> {
        self.touch();
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == event_id && e.owner_id == owner_id)
            .cloned())
    }

    async fn find_by_id(&self, event_id: i64) -> Result<Option<Event>> {
        self.touch();
        Ok(self.events.lock().unwrap().iter().find(|e| e.id == event_id).cloned())
    }

    async fn search_candidates(
        &self,
        owner_id: i64,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<Event>> {
        self.touch();
        let mut matches: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .filter(|e| {
                window.map_or(true, |(day_start, day_end)| {
                    e.start_time < day_end && e.end_time >= day_start
                })
            })
            .filter(|e| matches_keywords(e, keywords))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn list_visible(&self, user_id: i64, filter: &EventFilter) -> Result<Vec<Event>> {
        self.touch();
        let mut matches: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.is_visible_to(user_id))
            .filter(|e| filter.event_type.map_or(true, |t| e.event_type == t))
            .filter(|e| filter.start.map_or(true, |start| e.end_time >= start))
            .filter(|e| filter.end.map_or(true, |end| e.start_time <= end))
            .cloned()
            .collect();
        matches.sort_by_key(|e| e.start_time);
        Ok(matches)
    }

    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        self.touch();
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.start_time >= from && e.start_time <= until)
            .cloned()
            .collect())
    }

    async fn insert_event(&self, new: NewEvent, log: NewOperationLog) -> Result<Event> {
        self.touch();
        let now = Utc::now();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let event = Event {
            id,
            owner_id: new.owner_id,
            title: new.title,
            event_type: new.event_type,
            start_time: new.start_time,
            end_time: new.end_time,
            location: new.location,
            description: new.description,
            created_at: now,
            updated_at: now,
            participant_ids: new.participant_ids,
        };
        self.events.lock().unwrap().push(event.clone());
        self.logs.lock().unwrap().push(log);
        Ok(event)
    }

    async fn update_event(
        &self,
        event_id: i64,
        patch: EventPatch,
        participant_ids: Option<Vec<i64>>,
        log: NewOperationLog,
    ) -> Result<Event> {
        self.touch();
        let mut events = self.events.lock().unwrap();
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| CalendaiError::NotFound(format!("event {event_id}")))?;
        if let Some(title) = patch.title {
            event.title = title;
        }
        if let Some(event_type) = patch.event_type {
            event.event_type = event_type;
        }
        if let Some(start) = patch.start_time {
            event.start_time = start;
        }
        if let Some(end) = patch.end_time {
            event.end_time = end;
        }
        if let Some(location) = patch.location {
            event.location = location;
        }
        if let Some(description) = patch.description {
            event.description = description;
        }
        if let Some(ids) = participant_ids {
            event.participant_ids = ids;
        }
        event.updated_at = Utc::now();
        let updated = event.clone();
        self.logs.lock().unwrap().push(log);
        Ok(updated)
    }

    async fn delete_event(&self, event_id: i64, log: NewOperationLog) -> Result<()> {
        self.touch();
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Err(CalendaiError::NotFound(format!("event {event_id}")));
        }
        self.logs.lock().unwrap().push(log);
        Ok(())
    }
}

/// Fixed-content `UserDirectory`.
pub struct InMemoryDirectory {
    users: Vec<User>,
}

impl InMemoryDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn search_by_name(&self, keyword: &str, limit: usize) -> Result<Vec<User>> {
        let needle = keyword.to_lowercase();
        Ok(self
            .users
            .iter()
            .filter(|user| user.display_name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.users.iter().find(|user| user.id == user_id).cloned())
    }
}

/// Recording `NotificationStore`; optionally fails every append.
#[derive(Default)]
pub struct RecordingNotificationStore {
    notifications: Mutex<Vec<Notification>>,
    next_id: AtomicI64,
    fail_appends: bool,
}

impl RecordingNotificationStore {
    pub fn failing() -> Self {
        Self { fail_appends: true, ..Self::default() }
    }

    pub fn appended(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for RecordingNotificationStore {
    async fn append(
        &self,
        user_id: i64,
        kind: NotificationKind,
        content: &str,
        event_id: i64,
    ) -> Result<()> {
        if self.fail_appends {
            return Err(CalendaiError::Database("notification store offline".into()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.notifications.lock().unwrap().push(Notification {
            id,
            user_id,
            kind,
            content: content.to_string(),
            event_id,
            is_read: false,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn reminder_exists(&self, event_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.notifications.lock().unwrap().iter().any(|n| {
            n.kind == NotificationKind::Reminder && n.event_id == event_id && n.user_id == user_id
        }))
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        let mut list: Vec<Notification> = self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        list.reverse();
        Ok(list)
    }

    async fn mark_read(&self, user_id: i64, notification_id: i64) -> Result<()> {
        let mut notifications = self.notifications.lock().unwrap();
        match notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(())
            }
            None => Err(CalendaiError::NotFound(format!("notification {notification_id}"))),
        }
    }
}

/// `PendingProposals` backed by a plain map, for flows that do not need the
/// moka TTL behavior.
#[derive(Default)]
pub struct MemoryPendingStore {
    entries: Mutex<HashMap<String, Proposal>>,
}

impl PendingProposals for MemoryPendingStore {
    fn store(&self, proposal: Proposal) -> String {
        let token = Uuid::new_v4().to_string();
        self.entries.lock().unwrap().insert(token.clone(), proposal);
        token
    }

    fn consume(&self, token: &str) -> Option<Proposal> {
        self.entries.lock().unwrap().remove(token)
    }
}

/// `IntentModel` returning a scripted sequence of responses.
pub struct ScriptedIntentModel {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedIntentModel {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
        }
    }
}

#[async_trait]
impl IntentModel for ScriptedIntentModel {
    async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CalendaiError::Internal("no scripted model response left".into()))
    }
}
