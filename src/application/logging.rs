//! # Logging Setup
//!
//! Installs the global `tracing` subscriber: an `EnvFilter`, a non-blocking file layer that
//! starts empty each session, and an optional stderr console layer (stdout belongs to the
//! operator transcript).

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::config::LoggingConfig;
use crate::strings::logs;

/// `RUST_LOG` wins over the configured directive.
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// The returned guard flushes the file writer on drop; keep it alive for the session.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.directory).with_context(|| {
        format!("Failed to create log directory {}", config.directory.display())
    })?;

    // Clear previous session log
    let log_path = config.directory.join(&config.file);
    if log_path.exists() {
        fs::remove_file(&log_path)
            .with_context(|| format!("Failed to clear log file {}", log_path.display()))?;
    }

    let file_appender = tracing_appender::rolling::never(&config.directory, &config.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let console_layer = config
        .console
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        started = %chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        log = %log_path.display(),
        "{}",
        logs::SESSION_START
    );

    Ok(guard)
}
