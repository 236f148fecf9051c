use crate::{
    config::LoggingConfig,
    error::{MapError, Result},
};
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Initialize structured logging.
///
/// `RUST_LOG` wins over the configured level when it is set. Installing a
/// second global subscriber is reported as an error rather than a panic.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    config.validate()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let fmt_layer = match config.format.as_str() {
        "json" => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .json()
            .boxed(),
        "pretty" => fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .pretty()
            .boxed(),
        _ => fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr)
            .compact()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| MapError::ConfigError(format!("Failed to install subscriber: {}", e)))?;

    info!(
        level = %config.level,
        format = %config.format,
        "Structured logging initialized"
    );
    Ok(())
}
