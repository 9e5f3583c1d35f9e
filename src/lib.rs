pub mod api_connection;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod http_api;
pub mod prompt_builder;
pub mod recipe;
pub mod sanitizer;
pub mod schema_validator;

pub use error::RecipeError;
pub use generator::RecipeGenerator;
