//! Scripted completion client for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::connection::{ApiConnectionError, CompletionClient};
use super::endpoints::ChatCompletionRequest;

#[derive(Debug)]
enum Reply {
    Text(String),
    EmptyReply,
    ApiError { status: u16, body: String },
}

/// Returns the same reply for every request and remembers what it was sent.
#[derive(Debug)]
pub struct FakeClient {
    reply: Reply,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl FakeClient {
    fn with(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::with(Reply::Text(text.into()))
    }

    pub fn empty_reply() -> Self {
        Self::with(Reply::EmptyReply)
    }

    pub fn api_error(status: u16, body: impl Into<String>) -> Self {
        Self::with(Reply::ApiError {
            status,
            body: body.into(),
        })
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for FakeClient {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<String, ApiConnectionError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::EmptyReply => Err(ApiConnectionError::EmptyReply),
            Reply::ApiError { status, body } => Err(ApiConnectionError::ApiError {
                status: reqwest::StatusCode::from_u16(*status)
                    .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
                error_body: body.clone(),
            }),
        }
    }
}
