//! # Calendai API
//!
//! Thin HTTP surface over the core services: the assistant propose/confirm
//! operations, the direct event CRUD, notification and operation-log reads,
//! and a health route. Authentication is out of scope; callers identify the
//! user with an `x-user-id` header.

pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
