use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

use crate::api_connection::ApiConnectionError;
use crate::sanitizer::SanitizationError;
use crate::schema_validator::ValidationError;

pub const NO_MESSAGE: &str = "No message provided";

/// Every way a recipe request can fail. Each variant maps to one JSON error
/// body; nothing escapes the handler as a bare fault.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("{message}")]
    Client {
        message: String,
        details: Option<String>,
    },

    #[error("Upstream model request failed: {0}")]
    Upstream(#[from] ApiConnectionError),

    #[error("{source}")]
    Sanitization {
        source: SanitizationError,
        raw_response: String,
        cleaned_response: Option<String>,
    },

    #[error("{source}")]
    Validation {
        source: ValidationError,
        raw_response: String,
        cleaned_response: String,
    },

    #[error("{message}")]
    Unexpected { message: String, kind: String },
}

impl RecipeError {
    pub fn missing_input() -> Self {
        RecipeError::Client {
            message: NO_MESSAGE.to_string(),
            details: None,
        }
    }

    pub fn invalid_body(details: impl Into<String>) -> Self {
        RecipeError::Client {
            message: "Invalid request body".to_string(),
            details: Some(details.into()),
        }
    }

    pub fn unexpected(message: impl Into<String>, kind: impl Into<String>) -> Self {
        RecipeError::Unexpected {
            message: message.into(),
            kind: kind.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RecipeError::Client { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            RecipeError::Client { message, details } => match details {
                Some(details) => json!({ "error": message, "details": details }),
                None => json!({ "error": message }),
            },
            RecipeError::Upstream(err) => {
                let mut body = json!({
                    "error": "Upstream model request failed",
                    "kind": err.kind(),
                    "details": err.to_string(),
                });
                if let ApiConnectionError::ApiError { status, .. } = err {
                    body["status"] = json!(status.as_u16());
                }
                body
            }
            RecipeError::Sanitization {
                source,
                raw_response,
                cleaned_response,
            } => {
                let (error, details) = match source {
                    SanitizationError::EmptyAfterCleaning => {
                        ("Empty response after cleaning", source.reason().to_string())
                    }
                    SanitizationError::InvalidJson { details } => {
                        ("Invalid JSON response from API", details.clone())
                    }
                };
                let mut body = json!({
                    "error": error,
                    "details": details,
                    "raw_response": raw_response,
                });
                if let Some(cleaned) = cleaned_response {
                    body["cleaned_response"] = json!(cleaned);
                }
                body
            }
            RecipeError::Validation {
                source,
                raw_response,
                cleaned_response,
            } => {
                let details = match source {
                    ValidationError::NotAnObject => "expected a JSON object".to_string(),
                    ValidationError::MissingFields { missing } => missing.join(", "),
                };
                json!({
                    "error": source.to_string(),
                    "details": details,
                    "raw_response": raw_response,
                    "cleaned_response": cleaned_response,
                })
            }
            RecipeError::Unexpected { message, kind } => json!({ "error": message, "type": kind }),
        }
    }
}

impl IntoResponse for RecipeError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
