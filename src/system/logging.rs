//! Logging system initialization.

use crate::config::Config;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber from configuration.
///
/// Returns a `WorkerGuard` that must be kept alive for the duration of the
/// program so buffered log writes are flushed on shutdown.
///
/// # Panics
/// * If the log file cannot be opened
/// * If a global subscriber was already installed
pub fn init_logging(config: &Config) -> tracing_appender::non_blocking::WorkerGuard {
    let writer: Box<dyn std::io::Write + Send + Sync> = match &config.log_file {
        Some(log_file) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .expect("Failed to open log file");
            Box::new(file)
        }
        None => Box::new(std::io::stdout()),
    };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = EnvFilter::new(config.log_level.clone());

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(config.log_file.is_none());

    if config.log_format == "json" {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }

    guard
}
