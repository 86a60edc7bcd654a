//! Prompts for the intent model

use chrono::{DateTime, SecondsFormat, Utc};

/// System prompt constraining the model to the fixed JSON payload the
/// normalizer decodes.
pub const SYSTEM_PROMPT: &str = "\
You are a smart calendar assistant. Identify the user's intent and output JSON.
If there is no end time, default to one hour after the start time; if there is no start time, default to one hour before the end time.
Output only JSON, with no explanation or markdown.
JSON fields:
action: \"create\" | \"update\" | \"delete\" | \"unknown\"
title: event title
type: \"work\" | \"life\" | \"growth\"
start_time: RFC3339
end_time: RFC3339
location: location
description: description
participant_keywords: array of participant name keywords
event_id: set when the user named a specific event id
target_time: time of the event to update or delete (RFC3339)
target_keywords: array of keywords matching the event to update or delete
Leave missing fields as empty strings or empty arrays.";

/// User prompt carrying the current time so relative dates ("tomorrow at 3")
/// resolve against it.
pub fn user_prompt(now: DateTime<Utc>, message: &str) -> String {
    format!(
        "Current time: {}\nUser input: {}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
        message
    )
}
