//! Process-wide configuration, built once at startup and shared read-only.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::api_connection::endpoints::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::cli::Cli;
use crate::recipe::{BASE_REQUIRED_FIELDS, IMAGE_URL_FIELD};

/// How the caller's message is turned into the upstream prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PromptMode {
    /// Message sent as-is under a system instruction asking for JSON.
    Verbatim,
    /// Message embedded in a template that spells out the recipe schema.
    Templated,
}

/// Everything the recipe handler needs besides the upstream client.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub prompt_mode: PromptMode,
    pub required_fields: Vec<String>,
    pub model_id: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
}

impl GeneratorConfig {
    pub fn required_fields_for(require_image_url: bool) -> Vec<String> {
        let mut fields: Vec<String> = BASE_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect();
        if require_image_url {
            fields.push(IMAGE_URL_FIELD.to_string());
        }
        fields
    }

    pub fn with_prompt_mode(mut self, prompt_mode: PromptMode) -> Self {
        self.prompt_mode = prompt_mode;
        self
    }

    pub fn with_image_url_required(mut self, required: bool) -> Self {
        self.required_fields = Self::required_fields_for(required);
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            prompt_mode: PromptMode::Templated,
            required_fields: Self::required_fields_for(false),
            model_id: DEFAULT_MODEL.to_string(),
            temperature: 0.6,
            max_tokens: 4096,
            top_p: Some(0.95),
        }
    }
}

/// Listener and upstream connection settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub api_base: String,
    pub api_key_env: String,
    pub upstream_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            upstream_timeout: Duration::from_secs(60),
        }
    }
}

pub fn from_cli(cli: &Cli) -> Result<(ServerConfig, GeneratorConfig)> {
    if !(0.0..=2.0).contains(&cli.temperature) {
        anyhow::bail!("temperature must be within 0.0..=2.0, got {}", cli.temperature);
    }
    if cli.max_tokens == 0 {
        anyhow::bail!("max-tokens must be positive");
    }
    if cli.timeout_secs == 0 {
        anyhow::bail!("timeout-secs must be positive");
    }
    let ip: IpAddr = cli
        .host
        .parse()
        .with_context(|| format!("Invalid listen host '{}'", cli.host))?;
    let addr = SocketAddr::from((ip, cli.port));

    let server = ServerConfig {
        addr,
        api_base: cli.api_base.clone(),
        api_key_env: cli.api_key_env.clone(),
        upstream_timeout: Duration::from_secs(cli.timeout_secs),
    };
    let generator = GeneratorConfig {
        prompt_mode: cli.prompt_mode,
        required_fields: GeneratorConfig::required_fields_for(cli.require_image_url),
        model_id: cli.model.clone(),
        temperature: cli.temperature,
        max_tokens: cli.max_tokens,
        top_p: Some(cli.top_p),
    };
    Ok((server, generator))
}
