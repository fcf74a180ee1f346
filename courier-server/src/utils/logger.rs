//! Logging Infrastructure
//!
//! Structured logging setup for development and production. Console output
//! always; optional daily-rotating file output in JSON for ingestion.

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console-only logging
pub fn init_logger(level: &str) -> anyhow::Result<()> {
    init_logger_with_file(level, false, None)
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - log level filter (e.g. "info", "debug"), overridable via
///   `RUST_LOG`
/// * `json_format` - JSON console output (true for production)
/// * `log_dir` - optional directory for daily-rotating JSON file logs
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "courier.log");
            Some(
                fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_ansi(false)
                    .boxed(),
            )
        }
        None => None,
    };

    subscriber.with(console_layer).with(file_layer).try_init()?;
    Ok(())
}
