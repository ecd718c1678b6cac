use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// `RUST_LOG` when set and parseable, otherwise the configured default directive
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter))
}

/// Console output on stderr plus JSON lines in a daily-rolling file under
/// `config.directory`.
pub fn init_logging(config: &LoggingConfig) {
    let _ = fs::create_dir_all(&config.directory);

    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_name);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(file_layer)
        .with(console_layer)
        .init();

    // Flushes on drop; the subscriber lives for the whole process
    std::mem::forget(guard);
}
