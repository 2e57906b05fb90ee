//! Logging configuration and initialization
//!
//! Structured logging with tracing: compact console output for development,
//! JSON for log aggregation, and an optional non-blocking log file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Enable console output (default: true)
    pub console_enabled: bool,
    /// Enable file logging (default: false)
    pub file_enabled: bool,
    /// Path for the log file (default: `gesture_board.log` in the working directory)
    pub file_path: Option<PathBuf>,
    /// Use JSON format for console logs (default: false)
    pub json_format: bool,
    /// Default log level filter (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_enabled: false,
            file_path: None,
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Resolve the log file path
    pub fn resolved_file_path(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("gesture_board.log"))
    }
}

/// Initialize the logging system with the given configuration
///
/// Returns a guard that must be kept alive for the duration of the program
/// so that file logging is flushed.
///
/// # Environment Variables
///
/// - `GESTURE_BOARD_LOG`: log level filter (e.g. "debug", "info,gesture_board=trace")
/// - `GESTURE_BOARD_LOG_FORMAT`: set to "json" for JSON output
///
/// Records emitted through the `log` facade (camera, detector) are picked up
/// by the same subscriber.
pub fn init_logging(
    config: &LogConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_env("GESTURE_BOARD_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let use_json = std::env::var("GESTURE_BOARD_LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(config.json_format);

    let mut file_guard: Option<WorkerGuard> = None;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.file_enabled {
        let log_path = config.resolved_file_path();
        let file = std::fs::File::create(&log_path)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        file_guard = Some(guard);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        if config.console_enabled {
            let console_layer = fmt::layer().with_target(true).compact();
            subscriber.with(file_layer).with(console_layer).try_init()?;
        } else {
            subscriber.with(file_layer).try_init()?;
        }

        eprintln!("Logging to file: {}", log_path.display());
    } else if config.console_enabled {
        if use_json {
            let json_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);
            subscriber.with(json_layer).try_init()?;
        } else {
            let console_layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact();
            subscriber.with(console_layer).try_init()?;
        }
    } else {
        subscriber.try_init()?;
    }

    tracing::info!(
        target: "gesture_board",
        version = env!("CARGO_PKG_VERSION"),
        json_format = use_json,
        file_enabled = config.file_enabled,
        "Logging initialized"
    );

    Ok(file_guard)
}

pub use tracing_appender::non_blocking::WorkerGuard as LogGuard;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert!(config.console_enabled);
        assert!(!config.file_enabled);
        assert!(!config.json_format);
        assert_eq!(config.default_level, "info");
        assert_eq!(config.resolved_file_path(), PathBuf::from("gesture_board.log"));
    }

    #[test]
    fn test_log_config_partial_json() {
        let config: LogConfig = serde_json::from_str(r#"{ "default_level": "debug" }"#).unwrap();
        assert_eq!(config.default_level, "debug");
        assert!(config.console_enabled);
    }
}
