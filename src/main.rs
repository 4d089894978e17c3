//! Cybersecurity AI Assistant
//!
//! Entry point: `serve` starts the chat page, `ask` answers one question.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cyber_assistant::answer::{CyberAssistant, PromptConfig};
use cyber_assistant::chat::ChatPresenter;
use cyber_assistant::config::{
    AppConfig, Cli, Command, validate_max_tokens, validate_temperature,
};
use cyber_assistant::llm::{LlmSettings, build_driver};
use cyber_assistant::server;
use cyber_assistant::session::ScrollbackStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before clap reads env-backed flags
    dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = Arc::new(AppConfig::from_cli(&cli).context("Configuration error")?);

    // Credentials are resolved exactly once, here.
    let settings = LlmSettings::from_config(&config.model)?;
    settings.require_api_key()?;

    info!(
        name: "llm.config.loaded",
        provider = settings.provider.label(),
        base_url = %settings.base_url,
        model = %settings.model,
        "LLM configuration loaded"
    );

    let assistant = CyberAssistant::new(build_driver(settings), PromptConfig::from(&config.model));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let presenter = ChatPresenter::new(assistant, ScrollbackStore::new());
            server::start_server(config, presenter).await
        }
        Command::Ask {
            question,
            temperature,
            max_tokens,
        } => {
            if let Some(t) = temperature {
                validate_temperature(t)?;
            }
            if let Some(n) = max_tokens {
                validate_max_tokens(n)?;
            }
            let answer = assistant.answer(&question, temperature, max_tokens).await?;
            println!("{answer}");
            Ok(())
        }
    }
}

/// Initialize tracing (M-LOG-STRUCTURED).
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
