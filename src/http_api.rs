//! HTTP surface: `POST /generate` (and its `/predict` alias) plus a health check.

use std::any::Any;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::RecipeError;
use crate::generator::RecipeGenerator;
use crate::recipe::GenerateRequest;

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Cleaned model output, a JSON document encoded as a string.
    pub response: String,
}

/// An absent body counts as a request with no message. Anything that is not a
/// JSON object is a bad body.
fn parse_body(body: &[u8]) -> Result<GenerateRequest, RecipeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateRequest::default());
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| RecipeError::invalid_body(e.to_string()))?;
    if !value.is_object() {
        return Err(RecipeError::invalid_body("request body must be a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| RecipeError::invalid_body(e.to_string()))
}

async fn generate(
    State(generator): State<RecipeGenerator>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, RecipeError> {
    let request = parse_body(&body)?;
    let response = generator.generate(&request).await.inspect_err(|e| {
        error!(status = e.status().as_u16(), error = %e, "Recipe request failed");
    })?;
    Ok(Json(GenerateResponse { response }))
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "recipe-gen",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };
    error!(panic = %message, "Handler panicked");
    RecipeError::unexpected(message, "panic").into_response()
}

pub fn router(generator: RecipeGenerator) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/predict", post(generate))
        .route("/health", get(health))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(generator)
}
