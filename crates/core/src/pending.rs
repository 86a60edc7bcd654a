//! Pending-proposal store port
//!
//! Bridges the propose and confirm requests: a proposal that requires user
//! confirmation is parked here under an opaque token until the matching
//! confirmation arrives.

use calendai_domain::Proposal;

/// Consume-once store for proposals awaiting confirmation.
///
/// The store is the only shared mutable state in the core and must be safe
/// under concurrent `store`/`consume` from arbitrarily many requests.
/// `consume` is an atomic check-and-delete: a token yields its proposal at
/// most once, and a second consume, an unknown token, or an expired one are
/// indistinguishable misses.
pub trait PendingProposals: Send + Sync {
    /// Park a proposal and return a fresh, unpredictable token for it.
    /// Concurrent stores never collide in token space.
    fn store(&self, proposal: Proposal) -> String;

    /// Atomically retrieve and remove the proposal for `token`.
    fn consume(&self, token: &str) -> Option<Proposal>;
}
