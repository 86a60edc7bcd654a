//! Port interface for the language-model collaborator

use async_trait::async_trait;
use calendai_domain::Result;

/// Black-box text generation behind the intent pipeline.
///
/// The implementation owns its own timeout; a call never blocks a request
/// indefinitely.
#[async_trait]
pub trait IntentModel: Send + Sync {
    /// Generate a completion for the given system and user prompts.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}
