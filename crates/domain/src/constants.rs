//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

/// Maximum candidate events returned for an ambiguous reference.
pub const MAX_CANDIDATE_EVENTS: usize = 5;

/// Maximum directory matches considered per participant keyword.
pub const MAX_MATCHES_PER_KEYWORD: usize = 3;

/// How far ahead the reminder job looks for upcoming events.
pub const REMINDER_LOOKAHEAD_MINUTES: i64 = 15;

/// Default TTL for pending proposals awaiting confirmation.
pub const DEFAULT_PENDING_TTL_SECONDS: u64 = 600;

/// Default max entries held in the pending-proposal store.
pub const DEFAULT_PENDING_MAX_CAPACITY: u64 = 10_000;

/// Upper bound on user message length accepted by the chat entry point.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Upper bound on operation-log entries returned per page.
pub const MAX_OPERATION_LOG_PAGE: usize = 50;
