//! Participant resolution from free-text keywords

use std::sync::Arc;

use calendai_domain::constants::MAX_MATCHES_PER_KEYWORD;
use tracing::warn;

use super::ports::UserDirectory;

/// Maps free-text participant keywords to known user identities via fuzzy
/// directory lookup.
#[derive(Clone)]
pub struct ParticipantResolver {
    directory: Arc<dyn UserDirectory>,
}

impl ParticipantResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve keywords to user ids: at most three matches per keyword,
    /// union-deduplicated across keywords in first-seen order. Resolution is
    /// best-effort — a keyword that matches nothing contributes no ids, and
    /// a failed lookup is treated the same way.
    pub async fn resolve(&self, keywords: &[String]) -> Vec<i64> {
        let mut ids = Vec::new();
        for keyword in keywords {
            let users = match self.directory.search_by_name(keyword, MAX_MATCHES_PER_KEYWORD).await
            {
                Ok(users) => users,
                Err(err) => {
                    warn!(keyword = %keyword, error = %err, "participant lookup failed");
                    continue;
                }
            };
            for user in users {
                if !ids.contains(&user.id) {
                    ids.push(user.id);
                }
            }
        }
        ids
    }
}
