//! Event pipeline: executor, candidate matching, participant resolution,
//! reminders, and the ports they depend on.

pub mod executor;
pub mod matcher;
pub mod participants;
pub mod ports;
pub mod reminders;

pub use executor::ExecutorService;
pub use matcher::CandidateMatcher;
pub use participants::ParticipantResolver;
pub use reminders::ReminderService;
