/// Structured logging setup using tracing
///
/// CRITICAL: Writes to stderr ONLY (never stdout) so the JSON printed by the CLI stays parseable.
/// Auto-detects format: human-readable with ANSI colors when stderr is a terminal,
/// structured JSON when piped/redirected.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::Mutex;
use tracing_subscriber::{
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use crate::config::Config;

/// Initialize tracing subscriber with stderr output
///
/// Format auto-detection:
/// - Terminal: human-readable with ANSI colors
/// - Pipe/redirect: structured JSON
///
/// Log level from config.log_level (default: info)
/// RUST_LOG env var can override at runtime
///
/// When config.log_file is set, events are also appended to that file as JSON.
pub fn init_logging(config: &Config) {
    // Build env filter from config, with RUST_LOG override
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let (log_file, open_error) = match config.log_file.as_deref() {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (Some(file), None),
            Err(e) => (None, Some(e)),
        },
        None => (None, None),
    };
    let file_layer = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .json()
    });

    // Auto-detect format based on stderr terminal status
    let stderr_is_terminal = std::io::stderr().is_terminal();

    if stderr_is_terminal {
        // Human-readable format with ANSI colors for terminal
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
            )
            .init();
    } else {
        // Structured JSON format for pipes/redirects
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
            )
            .init();
    }

    if let Some(e) = open_error {
        tracing::warn!(
            path = config.log_file.as_deref().unwrap_or_default(),
            error = %e,
            "Could not open log file, logging to stderr only"
        );
    }
}
