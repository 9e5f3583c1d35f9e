use crate::api_connection::endpoints::ChatMessage;
use crate::config::PromptMode;
use crate::error::RecipeError;
use crate::recipe::GenerateRequest;

pub const CHEF_SYSTEM_PROMPT: &str =
    "You are a professional chef who creates recipes. Always respond with valid JSON.";

const SCHEMA_INSTRUCTIONS: &str = r#"Important: Your response must be a valid JSON object with this exact structure:
{
    "id": "string",
    "name": "string",
    "ingredients": [{"name": "string", "quantity": "string"}],
    "instructions": ["string"],
    "cookingTime": "string",
    "servings": number,
    "imageUrl": "string"
}
Respond with the JSON object only."#;

/// Pulls the message out of a request body.
///
/// A non-empty `message` wins. Otherwise a non-empty `ingredients` list is
/// joined with commas. Anything else is missing input.
pub fn extract_message(request: &GenerateRequest) -> Result<String, RecipeError> {
    if let Some(message) = request.message.as_deref().filter(|m| !m.is_empty()) {
        return Ok(message.to_string());
    }
    let ingredients: Vec<&str> = request
        .ingredients
        .iter()
        .flatten()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();
    if ingredients.is_empty() {
        return Err(RecipeError::missing_input());
    }
    Ok(format!(
        "Generate a recipe using these ingredients: {}",
        ingredients.join(", ")
    ))
}

/// Builds the chat messages sent upstream. The message text is always kept
/// verbatim as a substring of the prompt.
pub fn build_messages(message: &str, mode: PromptMode) -> Vec<ChatMessage> {
    match mode {
        PromptMode::Verbatim => vec![
            ChatMessage::system(CHEF_SYSTEM_PROMPT),
            ChatMessage::user(message),
        ],
        PromptMode::Templated => vec![ChatMessage::user(format!(
            "{}\n\n{}",
            message, SCHEMA_INSTRUCTIONS
        ))],
    }
}
