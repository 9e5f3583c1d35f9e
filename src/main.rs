use std::sync::Arc;

use anyhow::{Context, Result};
use recipe_gen::api_connection::Provider;
use recipe_gen::cli::parse_args;
use recipe_gen::config;
use recipe_gen::http_api::router;
use recipe_gen::RecipeGenerator;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env before reading flags and keys

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli_args = parse_args();
    let (server_config, generator_config) = config::from_cli(&cli_args)?;

    let provider = Provider::from_env(
        &server_config.api_base,
        &server_config.api_key_env,
        server_config.upstream_timeout,
    )
    .with_context(|| format!("Upstream provider needs {} to be set", server_config.api_key_env))?;

    info!(
        api_base = provider.api_base(),
        model = %generator_config.model_id,
        mode = ?generator_config.prompt_mode,
        required = %generator_config.required_fields.join(","),
        "Upstream model configured"
    );

    let generator = RecipeGenerator::new(generator_config, Arc::new(provider));
    let app = router(generator);

    let listener = tokio::net::TcpListener::bind(server_config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", server_config.addr))?;
    info!("Listening on {}", server_config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}
