//! Structured intent extracted from model output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::EventType;

/// Action requested by a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalAction {
    Create,
    Update,
    Delete,
    Unknown,
}

impl ProposalAction {
    /// Case-normalize a raw action value; anything outside the supported set
    /// collapses to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this action mutates the store by referencing an existing event.
    pub fn references_existing(self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }
}

/// The structured intent extracted from free text.
///
/// Ownership transfers along the pipeline: normalizer → pending store →
/// executor. The store's consume operation removes its copy at the moment of
/// retrieval, so no component retains a second live copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub action: ProposalAction,
    pub title: String,
    pub event_type: Option<EventType>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: String,
    pub description: String,
    /// `Some` means the participant list was specified, even if it resolved
    /// to nothing; on update that requests full membership replacement.
    pub participant_keywords: Option<Vec<String>>,
    /// Resolved user ids; may be empty even when keywords are present.
    pub participant_ids: Vec<i64>,
    /// Explicit id of an existing event, when the user named one directly.
    pub target_event_id: Option<i64>,
    pub target_time: Option<DateTime<Utc>>,
    pub target_keywords: Option<Vec<String>>,
}

impl Proposal {
    /// A proposal that carries no usable intent.
    pub fn unknown() -> Self {
        Self {
            action: ProposalAction::Unknown,
            title: String::new(),
            event_type: None,
            start_time: None,
            end_time: None,
            location: String::new(),
            description: String::new(),
            participant_keywords: None,
            participant_ids: Vec::new(),
            target_event_id: None,
            target_time: None,
            target_keywords: None,
        }
    }

    /// Whether an update/delete proposal carries anything to locate its
    /// target with. Checked before any store access.
    pub fn has_target_hint(&self) -> bool {
        self.target_event_id.is_some()
            || self.target_time.is_some()
            || self.target_keywords.as_ref().is_some_and(|k| !k.is_empty())
    }
}

impl Default for Proposal {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parse_collapses_unsupported_values() {
        assert_eq!(ProposalAction::parse(" Create "), ProposalAction::Create);
        assert_eq!(ProposalAction::parse("DELETE"), ProposalAction::Delete);
        assert_eq!(ProposalAction::parse("reschedule"), ProposalAction::Unknown);
        assert_eq!(ProposalAction::parse(""), ProposalAction::Unknown);
    }

    #[test]
    fn target_hint_requires_at_least_one_locator() {
        let mut proposal = Proposal::unknown();
        proposal.action = ProposalAction::Delete;
        assert!(!proposal.has_target_hint());

        proposal.target_keywords = Some(vec![]);
        assert!(!proposal.has_target_hint());

        proposal.target_keywords = Some(vec!["standup".into()]);
        assert!(proposal.has_target_hint());
    }
}
