//! Domain types and models

pub mod dialogue;
pub mod event;
pub mod proposal;

pub use dialogue::{ConfirmReply, ConfirmStatus, ProposeReply};
pub use event::{
    CandidateEvent, Event, EventFilter, EventPatch, EventSnapshot, EventType, NewEvent,
    Notification, NotificationKind, OperationDetail, OperationLogEntry, User,
};
pub use proposal::{Proposal, ProposalAction};
