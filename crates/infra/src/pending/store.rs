//! Pending-proposal caching with moka
//!
//! Consume-once store bridging the propose and confirm requests. Entries
//! carry a TTL so a stale token stops being confirmable, and capacity is
//! bounded so abandoned proposals cannot grow memory without limit.

use std::time::Duration;

use calendai_core::PendingProposals;
use calendai_domain::{PendingConfig, Proposal};
use moka::sync::Cache;
use tracing::{debug, info};
use uuid::Uuid;

/// In-memory consume-once store for proposals awaiting confirmation.
pub struct MokaPendingStore {
    entries: Cache<String, Proposal>,
}

impl MokaPendingStore {
    pub fn new(config: &PendingConfig) -> Self {
        let entries = Cache::builder()
            .time_to_live(Duration::from_secs(config.ttl_seconds))
            .max_capacity(config.max_capacity)
            .build();
        info!(
            ttl_seconds = config.ttl_seconds,
            max_capacity = config.max_capacity,
            "pending-proposal store initialised"
        );
        Self { entries }
    }

    /// Number of live entries (runs pending maintenance first).
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PendingProposals for MokaPendingStore {
    fn store(&self, proposal: Proposal) -> String {
        let token = Uuid::new_v4().to_string();
        self.entries.insert(token.clone(), proposal);
        debug!(token = %token, "proposal parked for confirmation");
        token
    }

    fn consume(&self, token: &str) -> Option<Proposal> {
        // Atomic remove-and-return: two racing confirmations cannot both
        // observe the entry.
        self.entries.remove(token)
    }
}
