use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Response JSON is not an object")]
    NotAnObject,

    #[error("Missing required fields: {}", .missing.join(", "))]
    MissingFields { missing: Vec<String> },
}

/// Checks that `value` is an object holding every key in `required`.
///
/// Only key presence is checked. Nested shapes and value types are trusted as
/// the model produced them, so `"servings": "two"` passes.
pub fn validate_recipe<S: AsRef<str>>(value: &Value, required: &[S]) -> Result<(), ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;
    let missing: Vec<String> = required
        .iter()
        .map(|field| AsRef::<str>::as_ref(field))
        .filter(|field| !object.contains_key(*field))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields { missing })
    }
}
