//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Calendai
///
/// Recoverable, user-correctable outcomes (`Validation`, `AmbiguousTarget`,
/// `NotFound`) are surfaced to the caller as structured prompts; the rest map
/// to a generic internal error at the transport boundary.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CalendaiError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Multiple stored events match the reference and no explicit id was
    /// given. Drives a `need_confirm` response, never an error page.
    #[error("Ambiguous target: {0}")]
    AmbiguousTarget(String),

    /// Also covers unauthorized access: a foreign-owned event is reported
    /// exactly like a missing one so existence never leaks.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Calendai operations
pub type Result<T> = std::result::Result<T, CalendaiError>;
