use std::sync::Arc;

use anyhow::Context;
use brevity_llm::LLMClient;
use dotenvy::dotenv;
use engine_service::{app_module::AppState, app_router::build_application, config::EngineConfig};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = EngineConfig::from_env().context("Failed to load engine configuration")?;

    let subscriber_builder = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_level(true)
        .with_span_events(FmtSpan::CLOSE);

    if config.is_dev() {
        tracing::subscriber::set_global_default(
            subscriber_builder
                .compact()
                .pretty()
                .with_ansi(true)
                .finish(),
        )
        .context("setting dev subscriber failed")?;
    } else {
        tracing::subscriber::set_global_default(
            subscriber_builder.json().with_ansi(false).finish(),
        )
        .context("setting prod subscriber failed")?;
    }

    let client = LLMClient::new(config.provider.clone(), Some(config.llm.clone()))
        .context("Failed to create LLM client")?;
    tracing::info!(
        "Using {} model {}",
        config.provider.provider,
        config
            .provider
            .model
            .as_deref()
            .unwrap_or_else(|| config.provider.provider.default_model())
    );

    let state = AppState::new(Arc::new(client), &config);
    let app = build_application(state, config.request_timeout());

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("unable to bind {}", config.bind_address))?;

    tracing::info!("Server started, listening on {}", config.bind_address);
    axum::serve(listener, app)
        .await
        .context("unable to start server")?;

    Ok(())
}
