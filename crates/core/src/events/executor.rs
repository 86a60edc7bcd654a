//! Action executor - applies confirmed proposals to the event store
//!
//! One state machine per action. Validation and target disambiguation
//! complete before any mutation begins; the mutation itself runs inside a
//! single store transaction; notification fan-out happens after commit and
//! is advisory (failures are logged and swallowed, never surfaced).

use std::sync::Arc;

use calendai_domain::{
    CalendaiError, Event, EventFilter, EventPatch, EventSnapshot, EventType, NewEvent,
    NotificationKind, OperationDetail, Proposal, Result,
};
use tracing::{instrument, warn};

use super::matcher::CandidateMatcher;
use super::ports::{EventStore, NewOperationLog, NotificationStore, UserDirectory};

/// Applies create/update/delete actions against the event store.
///
/// Callable independently of the dialogue orchestrator: the direct CRUD
/// surface goes through the same methods.
pub struct ExecutorService {
    events: Arc<dyn EventStore>,
    directory: Arc<dyn UserDirectory>,
    notifications: Arc<dyn NotificationStore>,
    matcher: CandidateMatcher,
}

impl ExecutorService {
    pub fn new(
        events: Arc<dyn EventStore>,
        directory: Arc<dyn UserDirectory>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        let matcher = CandidateMatcher::new(events.clone());
        Self { events, directory, notifications, matcher }
    }

    /* ---------------------------------------------------------------- */
    /* Create                                                           */
    /* ---------------------------------------------------------------- */

    /// Create from a confirmed proposal. Missing title or times reject with
    /// a validation error before any store access.
    #[instrument(skip(self, proposal))]
    pub async fn create_from_proposal(&self, owner_id: i64, proposal: &Proposal) -> Result<Event> {
        let (Some(start), Some(end)) = (proposal.start_time, proposal.end_time) else {
            return Err(CalendaiError::Validation(
                "an event needs both a start and an end time".into(),
            ));
        };
        let title = proposal.title.trim();
        if title.is_empty() {
            return Err(CalendaiError::Validation("an event needs a title".into()));
        }

        self.create(NewEvent {
            owner_id,
            title: title.to_string(),
            event_type: proposal.event_type.unwrap_or(EventType::Work),
            start_time: start,
            end_time: end,
            location: proposal.location.clone(),
            description: proposal.description.clone(),
            participant_ids: proposal.participant_ids.clone(),
        })
        .await
    }

    /// Direct-path create. The event row, membership rows, and log entry
    /// share one transaction; invitations fan out after commit.
    #[instrument(skip(self, new), fields(owner_id = new.owner_id))]
    pub async fn create(&self, mut new: NewEvent) -> Result<Event> {
        if new.end_time <= new.start_time {
            return Err(CalendaiError::Validation("end time must be after start time".into()));
        }
        // Self-invitation is silently dropped, not an error.
        new.participant_ids = dedup_excluding(new.participant_ids, new.owner_id);

        let log = NewOperationLog {
            user_id: new.owner_id,
            target_title: new.title.clone(),
            detail: OperationDetail::Created {
                title: new.title.clone(),
                event_type: new.event_type,
            },
        };
        let event = self.events.insert_event(new, log).await?;

        let content = self.invitation_content(&event).await;
        self.fan_out(&event, &event.participant_ids, NotificationKind::Invitation, &content)
            .await;
        Ok(event)
    }

    /* ---------------------------------------------------------------- */
    /* Update                                                           */
    /* ---------------------------------------------------------------- */

    /// Update from a confirmed proposal, resolving the target through the
    /// disambiguation policy. A proposal with nothing to locate the target
    /// by is rejected before any store read.
    #[instrument(skip(self, proposal))]
    pub async fn update_from_proposal(&self, owner_id: i64, proposal: &Proposal) -> Result<Event> {
        if !proposal.has_target_hint() {
            return Err(CalendaiError::Validation(
                "updating an event needs its original time, a keyword, or its id".into(),
            ));
        }
        let target = self.matcher.select_single(owner_id, proposal).await?;

        let mut patch = EventPatch::default();
        let title = proposal.title.trim();
        if !title.is_empty() {
            patch.title = Some(title.to_string());
        }
        if let Some(event_type) = proposal.event_type {
            patch.event_type = Some(event_type);
        }
        if !proposal.location.trim().is_empty() {
            patch.location = Some(proposal.location.trim().to_string());
        }
        if !proposal.description.trim().is_empty() {
            patch.description = Some(proposal.description.trim().to_string());
        }
        patch.start_time = proposal.start_time;
        patch.end_time = proposal.end_time;

        // `Some` even when it resolved to nothing: the participant list was
        // specified, so the full membership set is replaced.
        let participants =
            proposal.participant_keywords.is_some().then(|| proposal.participant_ids.clone());

        self.apply_update(owner_id, target, patch, participants).await
    }

    /// Direct-path update by explicit id.
    #[instrument(skip(self, patch, participant_ids))]
    pub async fn update(
        &self,
        owner_id: i64,
        event_id: i64,
        patch: EventPatch,
        participant_ids: Option<Vec<i64>>,
    ) -> Result<Event> {
        let target = self
            .events
            .find_owned(owner_id, event_id)
            .await?
            .ok_or_else(|| CalendaiError::NotFound(format!("event {event_id}")))?;
        self.apply_update(owner_id, target, patch, participant_ids).await
    }

    async fn apply_update(
        &self,
        owner_id: i64,
        target: Event,
        patch: EventPatch,
        participant_ids: Option<Vec<i64>>,
    ) -> Result<Event> {
        // A one-sided time change keeps the stored other side; the merged
        // interval must still be valid before anything is written.
        let start = patch.start_time.unwrap_or(target.start_time);
        let end = patch.end_time.unwrap_or(target.end_time);
        if end <= start {
            return Err(CalendaiError::Validation("end time must be after start time".into()));
        }

        let participant_ids =
            participant_ids.map(|ids| dedup_excluding(ids, target.owner_id));

        if patch.is_empty() && participant_ids.is_none() {
            // Nothing changed: no transaction, no log entry.
            return Ok(target);
        }

        let before = EventSnapshot::from(&target);
        let mut after = before.clone();
        if let Some(title) = &patch.title {
            after.title = title.clone();
        }
        if let Some(event_type) = patch.event_type {
            after.event_type = event_type;
        }
        if let Some(location) = &patch.location {
            after.location = location.clone();
        }
        if let Some(description) = &patch.description {
            after.description = description.clone();
        }
        after.start_time = start;
        after.end_time = end;
        if let Some(ids) = &participant_ids {
            after.participant_ids = ids.clone();
        }

        let log = NewOperationLog {
            user_id: owner_id,
            target_title: target.title.clone(),
            detail: OperationDetail::Updated { before, after },
        };
        let updated = self.events.update_event(target.id, patch, participant_ids, log).await?;

        let content = format!("The event '{}' you participate in has been updated", updated.title);
        let recipients = updated.participant_ids.clone();
        self.fan_out(&updated, &recipients, NotificationKind::Change, &content).await;
        Ok(updated)
    }

    /* ---------------------------------------------------------------- */
    /* Delete                                                           */
    /* ---------------------------------------------------------------- */

    /// Delete from a confirmed proposal; resolves and authorizes like
    /// update.
    #[instrument(skip(self, proposal))]
    pub async fn delete_from_proposal(&self, owner_id: i64, proposal: &Proposal) -> Result<Event> {
        if !proposal.has_target_hint() {
            return Err(CalendaiError::Validation(
                "deleting an event needs its original time, a keyword, or its id".into(),
            ));
        }
        let target = self.matcher.select_single(owner_id, proposal).await?;
        self.remove(owner_id, target).await
    }

    /// Direct-path delete by explicit id.
    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: i64, event_id: i64) -> Result<Event> {
        let target = self
            .events
            .find_owned(owner_id, event_id)
            .await?
            .ok_or_else(|| CalendaiError::NotFound(format!("event {event_id}")))?;
        self.remove(owner_id, target).await
    }

    async fn remove(&self, owner_id: i64, target: Event) -> Result<Event> {
        // Recipients must be captured before deletion; the rows are gone
        // afterwards.
        let recipients = target.participant_ids.clone();
        let log = NewOperationLog {
            user_id: owner_id,
            target_title: target.title.clone(),
            detail: OperationDetail::Deleted { title: target.title.clone() },
        };
        self.events.delete_event(target.id, log).await?;

        let content = format!("The event '{}' you participated in was removed", target.title);
        self.fan_out(&target, &recipients, NotificationKind::Change, &content).await;
        Ok(target)
    }

    /* ---------------------------------------------------------------- */
    /* Reads                                                            */
    /* ---------------------------------------------------------------- */

    /// Single event with access check: creator or participant may read,
    /// anyone else sees not-found.
    pub async fn get_event(&self, viewer_id: i64, event_id: i64) -> Result<Event> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| CalendaiError::NotFound(format!("event {event_id}")))?;
        if !event.is_visible_to(viewer_id) {
            return Err(CalendaiError::NotFound(format!("event {event_id}")));
        }
        Ok(event)
    }

    /// Events the user owns or participates in, filtered.
    pub async fn list_events(&self, user_id: i64, filter: &EventFilter) -> Result<Vec<Event>> {
        self.events.list_visible(user_id, filter).await
    }

    /* ---------------------------------------------------------------- */
    /* Notification fan-out                                             */
    /* ---------------------------------------------------------------- */

    async fn invitation_content(&self, event: &Event) -> String {
        let inviter = self
            .directory
            .get(event.owner_id)
            .await
            .ok()
            .flatten()
            .map(|user| user.display_name)
            .unwrap_or_else(|| "Someone".to_string());
        format!("{inviter} invited you to '{}'", event.title)
    }

    /// Best-effort fan-out to every recipient except the owner. Runs after
    /// the transaction committed; an append failure is logged and swallowed
    /// because the calendar mutation is the source of truth and the
    /// notification is advisory.
    async fn fan_out(
        &self,
        event: &Event,
        recipients: &[i64],
        kind: NotificationKind,
        content: &str,
    ) {
        for &user_id in recipients {
            if user_id == event.owner_id {
                continue;
            }
            if let Err(err) = self.notifications.append(user_id, kind, content, event.id).await {
                warn!(
                    user_id,
                    event_id = event.id,
                    kind = kind.as_str(),
                    error = %err,
                    "notification append failed"
                );
            }
        }
    }
}

/// Deduplicate preserving order, dropping the owner id.
fn dedup_excluding(ids: Vec<i64>, owner_id: i64) -> Vec<i64> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if id != owner_id && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
