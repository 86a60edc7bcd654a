//! Request-level reply shapes for the dialogue pipeline

use serde::{Deserialize, Serialize};

use super::event::{CandidateEvent, Event};
use super::proposal::{Proposal, ProposalAction};

/// Reply to a propose request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposeReply {
    pub intent: ProposalAction,
    pub needs_confirm: bool,
    /// Human-readable confirmation prompt or outcome text
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Proposal>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub candidates: Vec<CandidateEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_token: Option<String>,
}

impl ProposeReply {
    /// A terminal reply that needs no confirmation round-trip.
    pub fn terminal(intent: ProposalAction, prompt: impl Into<String>) -> Self {
        Self {
            intent,
            needs_confirm: false,
            prompt: prompt.into(),
            proposal: None,
            candidates: Vec::new(),
            confirm_token: None,
        }
    }
}

/// Terminal status of a confirm request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmStatus {
    Success,
    NeedConfirm,
    Error,
}

/// Reply to a confirm request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmReply {
    pub status: ConfirmStatus,
    pub intent: ProposalAction,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub candidates: Vec<CandidateEvent>,
}
