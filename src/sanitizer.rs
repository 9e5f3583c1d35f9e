//! Turns free-form model output into JSON text.
//!
//! Cleaning is an ordered list of text transforms. Later transforms assume the
//! earlier ones already ran, so new steps go at the end.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SanitizationError {
    #[error("Response was empty after cleaning")]
    EmptyAfterCleaning,

    #[error("Invalid JSON response from API: {details}")]
    InvalidJson { details: String },
}

impl SanitizationError {
    pub fn reason(&self) -> &'static str {
        match self {
            SanitizationError::EmptyAfterCleaning => "empty_after_cleaning",
            SanitizationError::InvalidJson { .. } => "invalid_json",
        }
    }
}

pub type Transform = fn(&str) -> Result<String, SanitizationError>;

#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub name: &'static str,
    pub apply: Transform,
}

static REASONING_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<think>.*?</think>|<thinking>.*?</thinking>|<reasoning>.*?</reasoning>")
        .expect("reasoning pattern is valid")
});

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)\r?\n?[ \t]*```")
        .expect("fence pattern is valid")
});

fn trim(text: &str) -> Result<String, SanitizationError> {
    Ok(text.trim().to_string())
}

/// Drops every `<think>…</think>` span. A closing marker with no opener
/// (the opener was part of the prompt template) drops everything before it.
fn strip_reasoning(text: &str) -> Result<String, SanitizationError> {
    let stripped = REASONING_SPAN.replace_all(text, "");
    let tail = ["</think>", "</thinking>", "</reasoning>"]
        .iter()
        .filter_map(|marker| stripped.rfind(marker).map(|at| at + marker.len()))
        .max()
        .map(|end| &stripped[end..]);
    Ok(tail.unwrap_or(stripped.as_ref()).to_string())
}

/// Keeps only what sits inside the first fenced block. An opener without a
/// closer (truncated output) or a lone closer is removed on its own.
fn strip_code_fences(text: &str) -> Result<String, SanitizationError> {
    if let Some(inner) = FENCED_BLOCK.captures(text).and_then(|c| c.get(1)) {
        return Ok(inner.as_str().to_string());
    }
    let mut body = text;
    if body.starts_with("```") {
        body = body.find('\n').map(|nl| &body[nl + 1..]).unwrap_or("");
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    Ok(body.to_string())
}

/// `\_` is not a JSON escape. Escaped backslashes (`\\_`) are left alone.
fn normalize_escapes(text: &str) -> Result<String, SanitizationError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('_') => out.push('_'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}

/// Removes a comma whose next non-whitespace character closes an object or
/// array. Commas inside string literals are untouched.
fn remove_trailing_commas(text: &str) -> Result<String, SanitizationError> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let closes = chars[i + 1..]
                    .iter()
                    .find(|n| !n.is_whitespace())
                    .is_some_and(|n| *n == '}' || *n == ']');
                if !closes {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// The cleaning pipeline. [`Sanitizer::default`] is the standard order.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    steps: Vec<Step>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            steps: vec![
                Step { name: "trim", apply: trim },
                Step { name: "strip_reasoning", apply: strip_reasoning },
                Step { name: "strip_code_fences", apply: strip_code_fences },
                Step { name: "retrim", apply: trim },
                Step { name: "normalize_escapes", apply: normalize_escapes },
                Step { name: "remove_trailing_commas", apply: remove_trailing_commas },
            ],
        }
    }
}

impl Sanitizer {
    pub fn with_step(mut self, name: &'static str, apply: Transform) -> Self {
        self.steps.push(Step { name, apply });
        self
    }

    pub fn steps(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|s| s.name)
    }

    /// Runs every step in order. Fails instead of handing an empty string to
    /// the parser.
    pub fn clean(&self, raw: &str) -> Result<String, SanitizationError> {
        let mut text = raw.to_string();
        for step in &self.steps {
            let next = (step.apply)(&text)?;
            if next != text {
                debug!(step = step.name, before = text.len(), after = next.len(), "sanitizer step changed text");
            }
            text = next;
        }
        if text.trim().is_empty() {
            return Err(SanitizationError::EmptyAfterCleaning);
        }
        Ok(text)
    }
}

static DEFAULT_SANITIZER: LazyLock<Sanitizer> = LazyLock::new(Sanitizer::default);

pub fn clean_json_response(raw: &str) -> Result<String, SanitizationError> {
    DEFAULT_SANITIZER.clean(raw)
}

pub fn parse_cleaned(cleaned: &str) -> Result<Value, SanitizationError> {
    serde_json::from_str(cleaned).map_err(|e| SanitizationError::InvalidJson {
        details: e.to_string(),
    })
}
