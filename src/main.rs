//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: configuration, conversation and types
//! - Sandbox: the permitted library roots
//! - Infrastructure: model client, tools, terminal, interrupt signal
//! - Application: logging, prompt assembly and the conversation controller

mod application;
mod domain;
mod infrastructure;
mod sandbox;
mod strings;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::application::controller::ConversationController;
use crate::application::logging::init_logging;
use crate::application::prompt::build_initial_prompt;
use crate::domain::config::AppConfig;
use crate::infrastructure::interrupt::AbortSignal;
use crate::infrastructure::llm::Client as LlmClient;
use crate::infrastructure::terminal::TerminalOperator;
use crate::infrastructure::tools::search_imdb::SearchImdbTool;
use crate::infrastructure::tools::{ToolExecutor, ToolRegistry};
use crate::sandbox::PathSandbox;
use crate::strings::{logs, messages};

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Organize media files into a Jellyfin library with a tool-using model.
#[derive(Debug, Parser)]
#[command(name = "reelsort", version, about)]
struct Cli {
    /// Config file (default: ./reelsort.yaml, then the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path of the media to organize; asked for when omitted
    #[arg(short, long)]
    input: Option<String>,

    /// Model name, overriding the config
    #[arg(short, long)]
    model: Option<String>,

    /// Start with operator input instead of the rendered prompt
    #[arg(long)]
    no_initial_prompt: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 1. Configuration
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        config.agent.model = Some(model);
    }

    // 2. Logging
    let _guard = init_logging(&config.logging)?;
    match &config.source {
        Some(path) => tracing::info!("{}", logs::config_loaded(&path.display().to_string())),
        None => tracing::info!("{}", logs::CONFIG_DEFAULTS),
    }

    // 3. Sandbox and tools
    let sandbox = Arc::new(
        PathSandbox::from_config(&config.library).context("Invalid library configuration")?,
    );
    for (kind, root) in sandbox.roots() {
        tracing::info!("{}", logs::sandbox_root(kind.as_str(), &root.display().to_string()));
    }

    let lookup_http = reqwest::Client::builder()
        .timeout(LOOKUP_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;
    let registry = Arc::new(
        ToolRegistry::standard(sandbox.clone(), SearchImdbTool::new(lookup_http))
            .context("Invalid tool registry")?,
    );
    tracing::info!("{}", logs::tools_registered(&registry.names().join(", ")));

    // 4. Model
    let llm = LlmClient::from_agent_config(&config.agent).context("Invalid agent configuration")?;
    tracing::info!("{}", logs::provider_ready(llm.provider().as_str(), llm.model()));

    // 5. Initial prompt
    let mut operator = TerminalOperator::stdio()?;
    let initial_prompt = if cli.no_initial_prompt {
        None
    } else {
        let input = match cli.input {
            Some(input) => Some(input),
            None => operator
                .ask(messages::ASK_INPUT_PATH)
                .await?
                .filter(|s| !s.trim().is_empty()),
        };
        let Some(input) = input else {
            println!("{}", messages::NO_INPUT_PATH);
            return Ok(());
        };
        Some(build_initial_prompt(&config.prompt, &sandbox, input.trim())?)
    };

    // 6. Interrupts
    let abort = AbortSignal::new();
    let signal = abort.clone();
    tokio::spawn(async move {
        loop {
            match tokio::signal::ctrl_c().await {
                Ok(()) => signal.trigger(),
                Err(e) => {
                    tracing::error!("{}", logs::signal_listen_fail(&e.to_string()));
                    break;
                }
            }
        }
    });

    // 7. Conversation loop
    println!("{}", messages::INTRO);
    let mut controller =
        ConversationController::new(Arc::new(llm), ToolExecutor::new(registry), operator, abort);
    controller.run(initial_prompt).await?;

    tracing::info!(turns = controller.conversation().len(), "{}", logs::SHUTDOWN);
    Ok(())
}
