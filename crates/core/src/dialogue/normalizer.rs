//! Text → proposal normalization
//!
//! Turns raw model output into a validated, typed [`Proposal`]. Malformed
//! individual fields become absent values; only a payload that cannot be
//! decoded at all collapses to an `Unknown` intent, and even that is a
//! recovered outcome asking the user to rephrase, never a propagated error.

use chrono::{DateTime, Utc};
use calendai_domain::{EventType, Proposal, ProposalAction};
use serde::Deserialize;

use crate::events::participants::ParticipantResolver;

const REPHRASE_PROMPT: &str = "I couldn't parse that — please try rephrasing.";
const UNSUPPORTED_PROMPT: &str =
    "I can only create, update, or delete calendar events right now.";
const CREATE_MISSING_PROMPT: &str =
    "Creating an event needs a title and a time range — please add them.";
const TARGET_MISSING_PROMPT: &str =
    "I need the original event's time, a keyword, or its id to locate it.";

/// Raw payload shape the model is instructed to emit. Every scalar arrives
/// as a string; typed values are derived leniently afterwards.
#[derive(Debug, Default, Deserialize)]
struct RawIntentPayload {
    #[serde(default)]
    action: String,
    #[serde(default)]
    title: String,
    #[serde(default, rename = "type")]
    event_type: String,
    #[serde(default)]
    start_time: String,
    #[serde(default)]
    end_time: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    participant_keywords: Vec<String>,
    #[serde(default)]
    event_id: String,
    #[serde(default)]
    target_time: String,
    #[serde(default)]
    target_keywords: Vec<String>,
}

/// Outcome of normalizing one model response.
#[derive(Debug, Clone)]
pub struct NormalizedIntent {
    pub intent: ProposalAction,
    pub needs_confirm: bool,
    /// Confirmation prompt when `needs_confirm`, outcome text otherwise.
    pub prompt: String,
    /// Present exactly when `needs_confirm` is true.
    pub proposal: Option<Proposal>,
}

impl NormalizedIntent {
    fn terminal(intent: ProposalAction, prompt: &str) -> Self {
        Self { intent, needs_confirm: false, prompt: prompt.into(), proposal: None }
    }
}

/// Turns raw model text into a validated proposal with resolved participants.
#[derive(Clone)]
pub struct ProposalNormalizer {
    resolver: ParticipantResolver,
}

impl ProposalNormalizer {
    pub fn new(resolver: ParticipantResolver) -> Self {
        Self { resolver }
    }

    /// Normalize one model response. Participant resolution runs as part of
    /// normalization so the proposal leaves here execution-ready.
    pub async fn normalize(&self, model_text: &str) -> NormalizedIntent {
        let Some(payload) = decode_payload(model_text) else {
            return NormalizedIntent::terminal(ProposalAction::Unknown, REPHRASE_PROMPT);
        };

        let mut proposal = build_proposal(payload);
        if let Some(keywords) = proposal.participant_keywords.clone() {
            proposal.participant_ids = self.resolver.resolve(&keywords).await;
        }
        classify(proposal)
    }
}

fn decode_payload(content: &str) -> Option<RawIntentPayload> {
    let raw = strip_code_fences(content);
    if raw.is_empty() {
        return None;
    }
    serde_json::from_str(raw).ok()
}

/// Strip a fenced code block and an optional `json` language tag.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a single fixed date-time format; malformed or empty becomes `None`,
/// never an error for the whole proposal.
fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Trim element-wise, drop empties, deduplicate preserving order; an empty
/// result becomes an absent list.
fn normalize_keywords(input: Vec<String>) -> Option<Vec<String>> {
    let mut output: Vec<String> = Vec::new();
    for item in input {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !output.iter().any(|existing| existing == trimmed) {
            output.push(trimmed.to_string());
        }
    }
    if output.is_empty() {
        None
    } else {
        Some(output)
    }
}

fn parse_event_id(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<u64>().ok().and_then(|id| i64::try_from(id).ok())
}

fn build_proposal(payload: RawIntentPayload) -> Proposal {
    Proposal {
        action: ProposalAction::parse(&payload.action),
        title: payload.title.trim().to_string(),
        event_type: EventType::parse(&payload.event_type),
        start_time: parse_time(&payload.start_time),
        end_time: parse_time(&payload.end_time),
        location: payload.location.trim().to_string(),
        description: payload.description.trim().to_string(),
        participant_keywords: normalize_keywords(payload.participant_keywords),
        participant_ids: Vec::new(),
        target_event_id: parse_event_id(&payload.event_id),
        target_time: parse_time(&payload.target_time),
        target_keywords: normalize_keywords(payload.target_keywords),
    }
}

/// Decide whether the proposal is confirmable and build the user-facing
/// prompt for it. Validity pre-checks here only gate the confirmation
/// round-trip; execution re-validates before any mutation.
fn classify(proposal: Proposal) -> NormalizedIntent {
    match proposal.action {
        ProposalAction::Create => {
            let (Some(start), Some(end)) = (proposal.start_time, proposal.end_time) else {
                return NormalizedIntent::terminal(ProposalAction::Create, CREATE_MISSING_PROMPT);
            };
            if proposal.title.is_empty() {
                return NormalizedIntent::terminal(ProposalAction::Create, CREATE_MISSING_PROMPT);
            }
            let mut text = format!(
                "Recognized new event: {} {}-{}",
                proposal.title,
                start.format("%Y-%m-%d %H:%M"),
                end.format("%H:%M"),
            );
            if !proposal.location.is_empty() {
                text.push_str(&format!(" (location: {})", proposal.location));
            }
            text.push_str(". Confirm to create?");
            NormalizedIntent {
                intent: ProposalAction::Create,
                needs_confirm: true,
                prompt: text,
                proposal: Some(proposal),
            }
        }
        ProposalAction::Update => {
            if !proposal.has_target_hint() {
                return NormalizedIntent::terminal(ProposalAction::Update, TARGET_MISSING_PROMPT);
            }
            let mut text = String::from("Recognized an update request");
            if !proposal.title.is_empty() {
                text.push_str(&format!(", new title: {}", proposal.title));
            }
            if let Some(start) = proposal.start_time {
                text.push_str(&format!(", new start: {}", start.to_rfc3339()));
            }
            if let Some(end) = proposal.end_time {
                text.push_str(&format!(", new end: {}", end.to_rfc3339()));
            }
            text.push_str(". Confirm to update?");
            NormalizedIntent {
                intent: ProposalAction::Update,
                needs_confirm: true,
                prompt: text,
                proposal: Some(proposal),
            }
        }
        ProposalAction::Delete => {
            if !proposal.has_target_hint() {
                return NormalizedIntent::terminal(ProposalAction::Delete, TARGET_MISSING_PROMPT);
            }
            NormalizedIntent {
                intent: ProposalAction::Delete,
                needs_confirm: true,
                prompt: "Recognized a delete request. Confirm to delete?".into(),
                proposal: Some(proposal),
            }
        }
        ProposalAction::Unknown => {
            NormalizedIntent::terminal(ProposalAction::Unknown, UNSUPPORTED_PROMPT)
        }
    }
}
