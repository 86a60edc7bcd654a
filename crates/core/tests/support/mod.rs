//! Shared test harness for core integration tests

pub mod repositories;

use std::sync::Arc;

use calendai_core::{
    CandidateMatcher, DialogueService, ExecutorService, ParticipantResolver, ProposalNormalizer,
};
use calendai_domain::User;

use chrono::{DateTime, Utc};
use calendai_domain::{Event, EventType};

use repositories::{
    InMemoryDirectory, MemoryPendingStore, MockEventStore, RecordingNotificationStore,
    ScriptedIntentModel,
};

/// Event fixture; `MockEventStore::seed` assigns the id.
pub fn event(owner_id: i64, title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
    Event {
        id: 0,
        owner_id,
        title: title.to_string(),
        event_type: EventType::Work,
        start_time: start,
        end_time: end,
        location: String::new(),
        description: String::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        participant_ids: Vec::new(),
    }
}

/// Directory fixture.
pub fn user(id: i64, name: &str) -> calendai_domain::User {
    calendai_domain::User {
        id,
        display_name: name.to_string(),
        email: format!("user{id}@example.com"),
    }
}

/// Everything a dialogue-flow test needs, wired the way the api binary
/// wires it.
pub struct TestHarness {
    pub store: Arc<MockEventStore>,
    pub notifications: Arc<RecordingNotificationStore>,
    pub pending: Arc<MemoryPendingStore>,
    pub executor: Arc<ExecutorService>,
    pub service: DialogueService,
}

/// Build a harness around a fixed user directory and a scripted sequence of
/// model responses.
pub fn harness(users: Vec<User>, responses: Vec<&str>) -> TestHarness {
    let store = Arc::new(MockEventStore::default());
    let directory = Arc::new(InMemoryDirectory::new(users));
    let notifications = Arc::new(RecordingNotificationStore::default());
    let pending = Arc::new(MemoryPendingStore::default());

    let executor = Arc::new(ExecutorService::new(
        store.clone(),
        directory.clone(),
        notifications.clone(),
    ));
    let service = DialogueService::new(
        Arc::new(ScriptedIntentModel::new(responses)),
        ProposalNormalizer::new(ParticipantResolver::new(directory)),
        CandidateMatcher::new(store.clone()),
        pending.clone(),
        executor.clone(),
    );

    TestHarness { store, notifications, pending, executor, service }
}
