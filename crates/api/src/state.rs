//! Service construction and shared request state

use std::sync::Arc;

use calendai_core::events::ports::{
    EventStore, NotificationStore, OperationLogStore, UserDirectory,
};
use calendai_core::{
    CandidateMatcher, DialogueService, ExecutorService, IntentModel, ParticipantResolver,
    PendingProposals, ProposalNormalizer, ReminderService,
};
use calendai_domain::{Config, Result};
use calendai_infra::{
    ChatClient, DbManager, MokaPendingStore, SqliteEventStore, SqliteNotificationStore,
    SqliteOperationLogStore, SqliteUserDirectory,
};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub dialogue: Arc<DialogueService>,
    pub executor: Arc<ExecutorService>,
    pub notifications: Arc<dyn NotificationStore>,
    pub operation_logs: Arc<dyn OperationLogStore>,
    pub db: Arc<DbManager>,
}

/// Build the full production state from configuration: pool + migrations,
/// SQLite adapters, chat client, moka pending store.
pub fn build_state(config: &Config) -> Result<(AppState, Arc<ReminderService>)> {
    let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
    db.run_migrations()?;

    let events: Arc<dyn EventStore> = Arc::new(SqliteEventStore::new(db.pool()));
    let directory: Arc<dyn UserDirectory> = Arc::new(SqliteUserDirectory::new(db.pool()));
    let notifications: Arc<dyn NotificationStore> =
        Arc::new(SqliteNotificationStore::new(db.pool()));
    let operation_logs: Arc<dyn OperationLogStore> =
        Arc::new(SqliteOperationLogStore::new(db.pool()));
    let model: Arc<dyn IntentModel> = Arc::new(ChatClient::new(&config.model)?);
    let pending: Arc<dyn PendingProposals> = Arc::new(MokaPendingStore::new(&config.pending));

    Ok(assemble(db, events, directory, notifications, operation_logs, model, pending))
}

/// Wire services from already-built ports. Tests use this to swap in a
/// scripted model or a different pending store.
#[allow(clippy::too_many_arguments)]
pub fn assemble(
    db: Arc<DbManager>,
    events: Arc<dyn EventStore>,
    directory: Arc<dyn UserDirectory>,
    notifications: Arc<dyn NotificationStore>,
    operation_logs: Arc<dyn OperationLogStore>,
    model: Arc<dyn IntentModel>,
    pending: Arc<dyn PendingProposals>,
) -> (AppState, Arc<ReminderService>) {
    let executor = Arc::new(ExecutorService::new(
        events.clone(),
        directory.clone(),
        notifications.clone(),
    ));
    let dialogue = Arc::new(DialogueService::new(
        model,
        ProposalNormalizer::new(ParticipantResolver::new(directory)),
        CandidateMatcher::new(events.clone()),
        pending,
        executor.clone(),
    ));
    let reminders = Arc::new(ReminderService::new(events, notifications.clone()));

    (AppState { dialogue, executor, notifications, operation_logs, db }, reminders)
}
