use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api_connection::{ApiConnectionError, ChatCompletionRequest, CompletionClient};
use crate::config::GeneratorConfig;
use crate::error::RecipeError;
use crate::prompt_builder::{build_messages, extract_message};
use crate::recipe::GenerateRequest;
use crate::sanitizer::{parse_cleaned, Sanitizer};
use crate::schema_validator::validate_recipe;

/// Handles one recipe request end to end: validate input, prompt the model,
/// clean its reply and check the recipe keys.
///
/// Holds no per-request state, so one instance is shared by every request.
#[derive(Debug, Clone)]
pub struct RecipeGenerator {
    config: Arc<GeneratorConfig>,
    client: Arc<dyn CompletionClient>,
    sanitizer: Sanitizer,
}

impl RecipeGenerator {
    pub fn new(config: GeneratorConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            config: Arc::new(config),
            client,
            sanitizer: Sanitizer::default(),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    fn completion_request(&self, message: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model_id.clone(),
            messages: build_messages(message, self.config.prompt_mode),
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            top_p: self.config.top_p,
            stream: false,
        }
    }

    /// Returns the cleaned JSON text exactly as it will be sent to the caller.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String, RecipeError> {
        let message = extract_message(request)?;
        debug!(mode = ?self.config.prompt_mode, chars = message.len(), "Building prompt");

        let raw = self.client.complete(self.completion_request(&message)).await?;
        if raw.trim().is_empty() {
            return Err(ApiConnectionError::EmptyReply.into());
        }

        let cleaned = self.sanitizer.clean(&raw).map_err(|source| {
            warn!(reason = source.reason(), error = %source, raw = %raw, "Sanitizer rejected model reply");
            RecipeError::Sanitization {
                source,
                raw_response: raw.clone(),
                cleaned_response: None,
            }
        })?;

        let parsed = parse_cleaned(&cleaned).map_err(|source| {
            warn!(error = %source, raw = %raw, cleaned = %cleaned, "Invalid JSON response");
            RecipeError::Sanitization {
                source,
                raw_response: raw.clone(),
                cleaned_response: Some(cleaned.clone()),
            }
        })?;

        validate_recipe(&parsed, &self.config.required_fields).map_err(|source| {
            warn!(error = %source, cleaned = %cleaned, "Recipe failed validation");
            RecipeError::Validation {
                source,
                raw_response: raw.clone(),
                cleaned_response: cleaned.clone(),
            }
        })?;

        info!(
            name = parsed.get("name").and_then(|n| n.as_str()).unwrap_or_default(),
            "Generated recipe"
        );
        Ok(cleaned)
    }
}
