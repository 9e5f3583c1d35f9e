use serde::{Deserialize, Serialize};

/// Inbound body of `POST /generate`.
///
/// `message` is free text. Older clients send `ingredients` instead, which is
/// folded into a message by [`crate::prompt_builder::extract_message`].
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct GenerateRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<String>,
}

/// The recipe shape the model is asked to produce.
///
/// The handler never deserializes into this type: it returns the model's JSON
/// text and only checks key presence. Clients read the `response` string
/// with it.
///
/// ```
/// use recipe_gen::recipe::Recipe;
///
/// let response = r#"{"id":"1","name":"Soup","ingredients":[{"name":"tomato","quantity":"2"}],
///     "instructions":["Simmer"],"cookingTime":"20 minutes","servings":2}"#;
/// let recipe: Recipe = serde_json::from_str(response).unwrap();
/// assert_eq!(recipe.servings, 2);
/// assert!(recipe.image_url.is_none());
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<String>,
    pub cooking_time: String,
    pub servings: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Top-level keys every recipe must carry.
pub const BASE_REQUIRED_FIELDS: &[&str] = &[
    "id",
    "name",
    "ingredients",
    "instructions",
    "cookingTime",
    "servings",
];

pub const IMAGE_URL_FIELD: &str = "imageUrl";
