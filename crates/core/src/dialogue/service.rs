//! Dialogue orchestrator - request-level control flow
//!
//! Drives the two request shapes: a fresh message (normalize, decide whether
//! confirmation is required, attach candidates, park the proposal) and a
//! confirmation (consume the token, dispatch to the executor, translate the
//! outcome into a user-facing status).

use std::sync::Arc;

use chrono::Utc;
use calendai_domain::constants::MAX_MESSAGE_LENGTH;
use calendai_domain::{
    CalendaiError, CandidateEvent, ConfirmReply, ConfirmStatus, Event, Proposal, ProposalAction,
    ProposeReply, Result,
};
use tracing::{info, instrument};

use crate::events::matcher::CandidateMatcher;
use crate::events::executor::ExecutorService;
use crate::pending::PendingProposals;

use super::normalizer::ProposalNormalizer;
use super::ports::IntentModel;
use super::prompt;

const NOT_FOUND_PROMPT: &str =
    "No matching event was found — add a time, a keyword, or the event id.";
const EXPIRED_PROMPT: &str =
    "This confirmation has expired — please repeat your request.";
const AMBIGUOUS_PROMPT: &str =
    "Several events match — please confirm again with a specific event id.";

/// Request-level orchestration over the dialogue pipeline.
pub struct DialogueService {
    model: Arc<dyn IntentModel>,
    normalizer: ProposalNormalizer,
    matcher: CandidateMatcher,
    pending: Arc<dyn PendingProposals>,
    executor: Arc<ExecutorService>,
}

impl DialogueService {
    pub fn new(
        model: Arc<dyn IntentModel>,
        normalizer: ProposalNormalizer,
        matcher: CandidateMatcher,
        pending: Arc<dyn PendingProposals>,
        executor: Arc<ExecutorService>,
    ) -> Self {
        Self { model, normalizer, matcher, pending, executor }
    }

    /// Handle a fresh user message. Returns a confirmation prompt with a
    /// token (and candidates for reference actions), or a terminal reply
    /// when no confirmable intent was recognized.
    #[instrument(skip(self, message))]
    pub async fn propose(&self, owner_id: i64, message: &str) -> Result<ProposeReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CalendaiError::InvalidInput("message must not be empty".into()));
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(CalendaiError::InvalidInput(format!(
                "message exceeds {MAX_MESSAGE_LENGTH} characters"
            )));
        }

        let response = self
            .model
            .generate(prompt::SYSTEM_PROMPT, &prompt::user_prompt(Utc::now(), message))
            .await?;
        let normalized = self.normalizer.normalize(&response).await;
        info!(intent = normalized.intent.as_str(), needs_confirm = normalized.needs_confirm,
            "message normalized");

        let Some(mut proposal) = normalized.proposal else {
            return Ok(ProposeReply::terminal(normalized.intent, normalized.prompt));
        };

        let mut candidates: Vec<Event> = Vec::new();
        if proposal.action.references_existing() {
            candidates = match self.matcher.find_candidates(owner_id, &proposal).await {
                Ok(found) => found,
                Err(CalendaiError::NotFound(_)) => {
                    return Ok(ProposeReply::terminal(normalized.intent, NOT_FOUND_PROMPT));
                }
                Err(other) => return Err(other),
            };
            if candidates.is_empty() && proposal.target_event_id.is_none() {
                return Ok(ProposeReply::terminal(normalized.intent, NOT_FOUND_PROMPT));
            }
            // A lone match is auto-selected and surfaced so the client can
            // display what will be affected.
            if candidates.len() == 1 && proposal.target_event_id.is_none() {
                proposal.target_event_id = Some(candidates[0].id);
            }
        }

        let token = self.pending.store(proposal.clone());
        Ok(ProposeReply {
            intent: normalized.intent,
            needs_confirm: true,
            prompt: normalized.prompt,
            proposal: Some(proposal),
            candidates: candidates.iter().map(CandidateEvent::from).collect(),
            confirm_token: Some(token),
        })
    }

    /// Handle a confirmation. The token is consumed up front, so a retried
    /// or duplicated confirmation can never apply the proposal twice.
    #[instrument(skip(self))]
    pub async fn confirm(
        &self,
        owner_id: i64,
        token: &str,
        explicit_target_id: Option<i64>,
    ) -> Result<ConfirmReply> {
        let Some(mut proposal) = self.pending.consume(token) else {
            return Ok(error_reply(ProposalAction::Unknown, EXPIRED_PROMPT));
        };

        // An explicit client-supplied id fills the gap, never overrides a
        // target the proposal already resolved.
        if proposal.target_event_id.is_none() {
            proposal.target_event_id = explicit_target_id;
        }

        match proposal.action {
            ProposalAction::Create => {
                match self.executor.create_from_proposal(owner_id, &proposal).await {
                    Ok(event) => {
                        let result = format!(
                            "Created event: {} {}-{}",
                            event.title,
                            event.start_time.format("%Y-%m-%d %H:%M"),
                            event.end_time.format("%H:%M"),
                        );
                        Ok(success_reply(ProposalAction::Create, result, Some(event)))
                    }
                    Err(err) => self.reply_for_error(ProposalAction::Create, owner_id, &proposal, err).await,
                }
            }
            ProposalAction::Update => {
                match self.executor.update_from_proposal(owner_id, &proposal).await {
                    Ok(event) => {
                        let result = format!("Updated event: {}", event.title);
                        Ok(success_reply(ProposalAction::Update, result, Some(event)))
                    }
                    Err(err) => self.reply_for_error(ProposalAction::Update, owner_id, &proposal, err).await,
                }
            }
            ProposalAction::Delete => {
                match self.executor.delete_from_proposal(owner_id, &proposal).await {
                    Ok(event) => {
                        let result = format!("Deleted event: {}", event.title);
                        Ok(success_reply(ProposalAction::Delete, result, None))
                    }
                    Err(err) => self.reply_for_error(ProposalAction::Delete, owner_id, &proposal, err).await,
                }
            }
            ProposalAction::Unknown => Ok(error_reply(ProposalAction::Unknown, "Unsupported intent")),
        }
    }

    /// Fold recoverable executor outcomes into a reply; propagate the rest.
    async fn reply_for_error(
        &self,
        intent: ProposalAction,
        owner_id: i64,
        proposal: &Proposal,
        err: CalendaiError,
    ) -> Result<ConfirmReply> {
        match err {
            CalendaiError::AmbiguousTarget(_) => {
                let candidates = self
                    .matcher
                    .find_candidates(owner_id, proposal)
                    .await
                    .unwrap_or_default();
                Ok(ConfirmReply {
                    status: ConfirmStatus::NeedConfirm,
                    intent,
                    result: AMBIGUOUS_PROMPT.into(),
                    event: None,
                    candidates: candidates.iter().map(CandidateEvent::from).collect(),
                })
            }
            CalendaiError::Validation(msg) => Ok(error_reply(intent, &msg)),
            CalendaiError::NotFound(_) => Ok(error_reply(intent, NOT_FOUND_PROMPT)),
            other => Err(other),
        }
    }
}

fn success_reply(intent: ProposalAction, result: String, event: Option<Event>) -> ConfirmReply {
    ConfirmReply { status: ConfirmStatus::Success, intent, result, event, candidates: Vec::new() }
}

fn error_reply(intent: ProposalAction, result: &str) -> ConfirmReply {
    ConfirmReply {
        status: ConfirmStatus::Error,
        intent,
        result: result.into(),
        event: None,
        candidates: Vec::new(),
    }
}
