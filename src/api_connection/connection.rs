use async_trait::async_trait;
use dotenv::dotenv;
use reqwest::Client;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::endpoints::{ChatCompletionRequest, ChatCompletionResponse, Provider};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),

    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("Upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },

    #[error("No response choices received from API")]
    NoChoices,

    #[error("Upstream model returned an empty reply")]
    EmptyReply,
}

impl ApiConnectionError {
    /// Short machine-readable tag surfaced to callers so they can tell a
    /// retryable empty reply from a transport failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiConnectionError::MissingApiKey(_) => "missing_api_key",
            ApiConnectionError::NetworkError(_) => "network",
            ApiConnectionError::Timeout(_) => "timeout",
            ApiConnectionError::SerializationError(_) => "serialization",
            ApiConnectionError::ApiError { .. } => "api_error",
            ApiConnectionError::NoChoices => "no_choices",
            ApiConnectionError::EmptyReply => "empty_reply",
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiConnectionError::Timeout(err)
        } else {
            ApiConnectionError::NetworkError(err)
        }
    }
}

/// Anything that can turn a chat-completion request into the reply text.
#[async_trait]
pub trait CompletionClient: Send + Sync + fmt::Debug {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<String, ApiConnectionError>;
}

impl Provider {
    /// Reads the key from `api_key_env_var_name` once; an unset or blank
    /// variable is an error.
    pub fn from_env(
        api_base: &str,
        api_key_env_var_name: &str,
        timeout: Duration,
    ) -> Result<Self, ApiConnectionError> {
        dotenv().ok();
        let api_key = env::var(api_key_env_var_name)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ApiConnectionError::MissingApiKey(api_key_env_var_name.to_string()))?;
        Self::new(api_base, api_key, timeout)
    }

    pub fn new(
        api_base: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, ApiConnectionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiConnectionError::NetworkError)?;
        Ok(Self::OpenAiCompatible {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    pub fn api_base(&self) -> &str {
        match self {
            Provider::OpenAiCompatible { api_base, .. } => api_base,
        }
    }

    pub async fn call_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        match self {
            Provider::OpenAiCompatible {
                api_base,
                api_key,
                http,
            } => {
                let url = format!("{}/chat/completions", api_base);
                debug!(url = %url, model = %request.model, "Calling chat completion endpoint");

                let response = http
                    .post(&url)
                    .bearer_auth(api_key)
                    .header("Content-Type", "application/json")
                    .json(request)
                    .send()
                    .await?;

                if response.status().is_success() {
                    let body = response.text().await?;
                    let chat_response = serde_json::from_str::<ChatCompletionResponse>(&body)
                        .inspect_err(|e| {
                            warn!(error = %e, body_chars = body.len(), "Upstream body is not a chat completion")
                        })?;
                    Ok(chat_response)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}

#[async_trait]
impl CompletionClient for Provider {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<String, ApiConnectionError> {
        let response = self.call_chat_completion(&request).await?;
        if response.choices.is_empty() {
            return Err(ApiConnectionError::NoChoices);
        }
        let content = response
            .first_content()
            .filter(|content| !content.trim().is_empty())
            .ok_or(ApiConnectionError::EmptyReply)?;
        info!(
            model = response.model.as_deref().unwrap_or(&request.model),
            chars = content.len(),
            "Received completion"
        );
        Ok(content.to_string())
    }
}
