//! # Calendai Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The dialogue pipeline (normalizer, prompts, orchestrator)
//! - The action executor and its candidate/participant resolution
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `calendai-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod dialogue;
pub mod events;
pub mod pending;

// Re-export specific items to avoid ambiguity
pub use dialogue::normalizer::{NormalizedIntent, ProposalNormalizer};
pub use dialogue::ports::IntentModel;
pub use dialogue::DialogueService;
pub use events::executor::ExecutorService;
pub use events::matcher::CandidateMatcher;
pub use events::participants::ParticipantResolver;
pub use events::ports::{
    EventStore, NewOperationLog, NotificationStore, OperationLogStore, UserDirectory,
};
pub use events::reminders::ReminderService;
pub use pending::PendingProposals;
