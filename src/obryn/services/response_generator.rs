use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::obryn::models::MessageRole;
use crate::settings::models::dev_settings::{DevSettingsModel, ResponseLength};

/// A hung request must not leave the exchange pending forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One prior turn, as the chat endpoint expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub content: String,
}

/// Request body for the chat completion endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub message: String,
    pub is_learning: bool,
    /// Language id for learning conversations, "auto" otherwise.
    pub language: String,
    pub custom_system_prompt: String,
    pub response_length: ResponseLength,
    pub no_restrictions: bool,
    pub conversation_history: Vec<HistoryEntry>,
}

impl GenerateRequest {
    pub fn new(
        message: String,
        is_learning: bool,
        language: Option<&str>,
        settings: &DevSettingsModel,
        conversation_history: Vec<HistoryEntry>,
    ) -> Self {
        Self {
            message,
            is_learning,
            language: language.unwrap_or("auto").to_string(),
            custom_system_prompt: settings.custom_system_prompt.clone(),
            response_length: settings.response_length,
            no_restrictions: settings.no_restrictions,
            conversation_history,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat endpoint returned status {0}")]
    Status(StatusCode),
}

/// External service turning a user message plus context into assistant text.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GeneratorError>;
}

/// HTTP relay to the hosted chat completion endpoint.
pub struct HttpResponseGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpResponseGenerator {
    pub fn new(api_base: &str) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", api_base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ResponseGenerator for HttpResponseGenerator {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GeneratorError> {
        debug!(endpoint = %self.endpoint, history_len = request.conversation_history.len(), "Calling chat endpoint");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::Status(status));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }
}
