use axum::body::Body;
use axum::http::{Request, StatusCode};
use dotenv::dotenv;
use http_body_util::BodyExt;
use recipe_gen::api_connection::{
    ApiConnectionError, ChatCompletionRequest, ChatMessage, CompletionClient, FakeClient, Provider,
};
use recipe_gen::config::{GeneratorConfig, PromptMode};
use recipe_gen::http_api::router;
use recipe_gen::recipe::Recipe;
use recipe_gen::RecipeGenerator;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const TEST_API_KEY_ENV_VAR: &str = "GROQ_API_KEY";

const RECIPE_JSON: &str = r#"{
  "id": "tbs-1",
  "name": "Tomato Basil Pasta",
  "ingredients": [{"name": "tomato", "quantity": "3"}, {"name": "basil", "quantity": "1 bunch"}],
  "instructions": ["Boil pasta", "Toss with tomato and basil"],
  "cookingTime": "20 minutes",
  "servings": 2,
  "imageUrl": "https://example.com/pasta.jpg"
}"#;

fn app_with(client: Arc<FakeClient>, config: GeneratorConfig) -> axum::Router {
    router(RecipeGenerator::new(config, client))
}

async fn post(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn well_formed_reply_is_returned_verbatim() {
    let client = Arc::new(FakeClient::replying(RECIPE_JSON));
    let app = app_with(client.clone(), GeneratorConfig::default());

    let (status, body) = post(app, "/generate", r#"{"message": "tomato, basil"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], RECIPE_JSON);
    let recipe: Recipe = serde_json::from_str(body["response"].as_str().unwrap()).unwrap();
    assert_eq!(recipe.servings, 2);

    let sent = client.requests();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].messages[0].content.contains("tomato, basil"));
}

#[tokio::test]
async fn predict_alias_and_ingredient_list_body() {
    let client = Arc::new(FakeClient::replying(RECIPE_JSON));
    let app = app_with(client.clone(), GeneratorConfig::default());

    let (status, _) = post(app, "/predict", r#"{"ingredients": ["egg", "rice"]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert!(client.requests()[0].messages[0]
        .content
        .contains("Generate a recipe using these ingredients: egg, rice"));
}

#[tokio::test]
async fn missing_message_is_400() {
    let client = Arc::new(FakeClient::replying(RECIPE_JSON));
    let (status, body) = post(app_with(client.clone(), GeneratorConfig::default()), "/generate", "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No message provided"}));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn malformed_body_is_400_json() {
    let client = Arc::new(FakeClient::replying(RECIPE_JSON));
    let (status, body) = post(app_with(client, GeneratorConfig::default()), "/generate", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn empty_upstream_reply_is_500_without_raw_text() {
    let client = Arc::new(FakeClient::replying(""));
    let (status, body) = post(
        app_with(client, GeneratorConfig::default()),
        "/generate",
        r#"{"message": "soup"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "empty_reply");
    assert!(body.get("raw_response").is_none());
}

#[tokio::test]
async fn provider_status_error_is_distinguished() {
    let client = Arc::new(FakeClient::api_error(503, "overloaded"));
    let (status, body) = post(
        app_with(client, GeneratorConfig::default()),
        "/generate",
        r#"{"message": "soup"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "api_error");
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn messy_reply_is_cleaned_before_returning() {
    let reply = "<think>\nThe user wants pasta.\n</think>\n```json\n{\"id\": \"p\", \"name\": \"snake\\_case pasta\", \"ingredients\": [], \"instructions\": [\"Cook\",], \"cookingTime\": \"10m\", \"servings\": 1,}\n```";
    let client = Arc::new(FakeClient::replying(reply));
    let (status, body) = post(
        app_with(client, GeneratorConfig::default()),
        "/generate",
        r#"{"message": "pasta"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let recipe: Value = serde_json::from_str(body["response"].as_str().unwrap()).unwrap();
    assert_eq!(recipe["name"], "snake_case pasta");
    assert_eq!(recipe["instructions"], json!(["Cook"]));
}

#[tokio::test]
async fn unparseable_reply_reports_details_and_raw_text() {
    let client = Arc::new(FakeClient::replying("I'm sorry, here's a recipe: tomato soup."));
    let (status, body) = post(
        app_with(client, GeneratorConfig::default()),
        "/generate",
        r#"{"message": "soup"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Invalid JSON response from API");
    assert!(body["details"].as_str().is_some_and(|d| !d.is_empty()));
    assert_eq!(body["raw_response"], "I'm sorry, here's a recipe: tomato soup.");
}

#[tokio::test]
async fn missing_fields_are_all_listed() {
    let client = Arc::new(FakeClient::replying(r#"{"id": "1", "name": "Soup"}"#));
    let config = GeneratorConfig::default()
        .with_image_url_required(true)
        .with_prompt_mode(PromptMode::Verbatim);
    let (status, body) = post(app_with(client, config), "/generate", r#"{"message": "soup"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Missing required fields: ingredients, instructions, cookingTime, servings, imageUrl"
    );
    assert_eq!(body["raw_response"], r#"{"id": "1", "name": "Soup"}"#);
}

#[tokio::test]
async fn health_reports_ok() {
    let client = Arc::new(FakeClient::replying(RECIPE_JSON));
    let response = app_with(client, GeneratorConfig::default())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let client = Arc::new(FakeClient::replying(RECIPE_JSON));
    let response = app_with(client, GeneratorConfig::default())
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/generate")
                .header("origin", "http://localhost:5173")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let allow = response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|v| v.to_str().ok());
    assert_eq!(allow, Some("*"));
}

#[test]
fn missing_api_key_error() {
    dotenv().ok();
    let result = Provider::from_env(
        "https://api.groq.com/openai/v1",
        "THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ",
        Duration::from_secs(5),
    );
    assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
}

#[tokio::test]
#[ignore]
async fn live_provider_returns_text() {
    dotenv().ok();
    if env::var(TEST_API_KEY_ENV_VAR).is_err() {
        println!("Skipping live_provider_returns_text: {} not set.", TEST_API_KEY_ENV_VAR);
        return;
    }

    let provider = Provider::from_env(
        "https://api.groq.com/openai/v1",
        TEST_API_KEY_ENV_VAR,
        Duration::from_secs(60),
    )
    .unwrap();
    let request = ChatCompletionRequest {
        model: GeneratorConfig::default().model_id,
        messages: vec![ChatMessage::user("What is the capital of France? Respond concisely.")],
        temperature: Some(0.6),
        max_tokens: Some(500),
        top_p: None,
        stream: false,
    };

    let reply = provider.complete(request).await;
    assert!(reply.is_ok(), "API call failed: {:?}", reply.err());
    assert!(reply.unwrap().to_lowercase().contains("paris"));
}
