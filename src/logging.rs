//! # Tracing Module
//!
//! Environment-aware console logging using the tracing ecosystem. Designed
//! for containerized applications where logs should go to stdout/stderr.
//!
//! Hosts embedding the crate typically install their own subscriber; this
//! initializer is for binaries and tests that want sensible defaults with
//! one call. Initialization is idempotent, and an already-installed global
//! subscriber is left in place.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console logging with environment-based level defaults
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let use_ansi = IsTerminal::is_terminal(&std::io::stdout());

        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(use_ansi)
            .with_filter(EnvFilter::new(&log_level));

        let subscriber = tracing_subscriber::registry().with(console_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                ansi_colors = use_ansi,
                "Console logging initialized"
            );
        }
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("ENDPOINT_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment variables or environment defaults
fn get_log_level(environment: &str) -> String {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        return level.to_lowercase();
    }

    if let Ok(level) = std::env::var("RUST_LOG") {
        return level.to_lowercase();
    }

    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_detection() {
        std::env::set_var("ENDPOINT_ENV", "test");
        assert_eq!(get_environment(), "test");
        std::env::remove_var("ENDPOINT_ENV");
    }

    #[test]
    fn test_log_level_mapping() {
        std::env::remove_var("LOG_LEVEL");
        std::env::remove_var("RUST_LOG");

        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");

        std::env::set_var("LOG_LEVEL", "WARN");
        assert_eq!(get_log_level("production"), "warn");
        std::env::remove_var("LOG_LEVEL");
    }
}
