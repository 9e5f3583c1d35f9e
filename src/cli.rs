use clap::Parser;

use crate::api_connection::endpoints::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::config::PromptMode;

#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP service that turns ingredients into recipe JSON via an LLM", long_about = None)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Name of the environment variable holding the upstream API key
    #[arg(long, default_value = "GROQ_API_KEY")]
    pub api_key_env: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "LLM_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Upstream model identifier
    #[arg(short, long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = 0.6)]
    pub temperature: f32,

    /// Upper bound on generated tokens
    #[arg(long, env = "LLM_MAX_TOKENS", default_value_t = 4096)]
    pub max_tokens: u32,

    /// Nucleus sampling
    #[arg(long, env = "LLM_TOP_P", default_value_t = 0.95)]
    pub top_p: f32,

    #[arg(long, env = "PROMPT_MODE", value_enum, default_value_t = PromptMode::Templated)]
    pub prompt_mode: PromptMode,

    /// Treat `imageUrl` as a required recipe field
    #[arg(long, env = "REQUIRE_IMAGE_URL")]
    pub require_image_url: bool,

    /// Upstream request timeout in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
