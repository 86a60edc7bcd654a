//! Candidate-event search and disambiguation
//!
//! Locates the stored event a vague reference ("the meeting with Lisa")
//! points to, and applies the disambiguation policy the executor relies on.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use calendai_domain::constants::MAX_CANDIDATE_EVENTS;
use calendai_domain::{CalendaiError, Event, Proposal, Result};
use tracing::{debug, instrument};

use super::ports::EventStore;

/// The UTC calendar day containing `target`: start-of-day inclusive,
/// start-of-next-day exclusive.
pub fn day_window(target: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let day_start = target
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| target.naive_utc())
        .and_utc();
    (day_start, day_start + Duration::days(1))
}

/// Searches the event store for events matching a proposal's target hints.
#[derive(Clone)]
pub struct CandidateMatcher {
    events: Arc<dyn EventStore>,
}

impl CandidateMatcher {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// Resolution priority, short-circuiting at the first applicable rule:
    /// explicit id → single owner-scoped lookup; otherwise a filtered query
    /// over day window and keywords, newest start first, capped at five.
    #[instrument(skip(self, proposal))]
    pub async fn find_candidates(&self, owner_id: i64, proposal: &Proposal) -> Result<Vec<Event>> {
        if let Some(event_id) = proposal.target_event_id {
            let event = self
                .events
                .find_owned(owner_id, event_id)
                .await?
                .ok_or_else(|| CalendaiError::NotFound(format!("event {event_id}")))?;
            return Ok(vec![event]);
        }

        let window = proposal.target_time.map(day_window);
        let keywords: &[String] =
            proposal.target_keywords.as_deref().unwrap_or(&[]);

        let matches = self
            .events
            .search_candidates(owner_id, window, keywords, MAX_CANDIDATE_EVENTS)
            .await?;
        debug!(count = matches.len(), "candidate search complete");
        Ok(matches)
    }

    /// Disambiguation policy: zero candidates → not found; exactly one →
    /// auto-select; more than one without an explicit id → ambiguous
    /// (recoverable, drives a `need_confirm` response).
    pub async fn select_single(&self, owner_id: i64, proposal: &Proposal) -> Result<Event> {
        let mut candidates = self.find_candidates(owner_id, proposal).await?;
        match candidates.len() {
            0 => Err(CalendaiError::NotFound("no matching event".into())),
            1 => Ok(candidates.remove(0)),
            _ if proposal.target_event_id.is_none() => Err(CalendaiError::AmbiguousTarget(
                format!("{} events match", candidates.len()),
            )),
            _ => Ok(candidates.remove(0)),
        }
    }
}
