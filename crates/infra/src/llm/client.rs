//! Chat-completions API client for intent extraction

use std::time::Duration;

use async_trait::async_trait;
use calendai_core::IntentModel;
use calendai_domain::{CalendaiError, ModelConfig, Result};
use tracing::{debug, instrument};

use crate::errors::InfraError;

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Chat-completions client implementing the intent-model port.
///
/// Constructed once at service start; configuration problems surface as a
/// constructor error rather than a first-request failure.
pub struct ChatClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(CalendaiError::Config("model id not configured".into()));
        }
        if config.api_key.trim().is_empty() {
            return Err(CalendaiError::Config("model api key not configured".into()));
        }
        if config.base_url.trim().is_empty() {
            return Err(CalendaiError::Config("model base url not configured".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .map_err(InfraError::from)?;
        let api_url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            http,
            api_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl IntentModel for ChatClient {
    #[instrument(skip(self, system_prompt, user_prompt))]
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".into(), content: system_prompt.into() },
                ChatMessage { role: "user".into(), content: user_prompt.into() },
            ],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(InfraError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendaiError::Network(format!(
                "chat completion failed with HTTP {}",
                status.as_u16()
            )));
        }

        let body: ChatCompletionResponse =
            response.json().await.map_err(InfraError::from)?;
        if let Some(usage) = &body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion received"
            );
        }

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        if content.is_empty() {
            return Err(CalendaiError::Network("chat completion returned no content".into()));
        }
        Ok(content)
    }
}
