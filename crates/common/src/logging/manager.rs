//! Logging initialization.

use tracing::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    filter::Directive,
    fmt::{layer, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

use super::types::LoggerConfig;

/// Crates that are too chatty at the default level.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn"];

/// Builds the filter: `default_level` unless overridden via `RUST_LOG`.
pub(crate) fn build_filter(config: &LoggerConfig) -> EnvFilter {
    let mut filt = EnvFilter::builder()
        .with_default_directive(config.default_level.into())
        .from_env_lossy();
    for directive in QUIET_TARGETS.iter().filter_map(|d| d.parse::<Directive>().ok()) {
        filt = filt.add_directive(directive);
    }
    filt
}

/// Initializes the logging subsystem with the provided config.
///
/// Fails if a global subscriber is already installed.
pub fn try_init(config: LoggerConfig) -> Result<(), TryInitError> {
    let filt = build_filter(&config);

    let writer = if config.stdout_config.use_stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    // Configure console logging with JSON or compact format
    let stdout_sub = if config.stdout_config.json_format {
        layer()
            .json()
            .with_writer(writer)
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    } else {
        layer()
            .compact()
            .with_writer(writer)
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    };

    // Build optional file logging layer
    let file_layer = config.file_logging_config.as_ref().map(|file_config| {
        let file_appender = RollingFileAppender::new(
            file_config.rotation.clone(),
            &file_config.directory,
            &file_config.file_name_prefix,
        );

        if file_config.json_format {
            layer()
                .json()
                .with_writer(file_appender)
                .with_ansi(false) // No color codes in files
                .with_filter(filt.clone())
                .boxed()
        } else {
            layer()
                .compact()
                .with_writer(file_appender)
                .with_ansi(false) // No color codes in files
                .with_filter(filt.clone())
                .boxed()
        }
    });

    tracing_subscriber::registry()
        .with(stdout_sub)
        .with(file_layer)
        .try_init()?;

    debug!(service_name = %config.service_name, "logging initialized");
    Ok(())
}

/// Initializes logging, ignoring a subscriber that is already installed.
pub fn init(config: LoggerConfig) {
    if let Err(err) = try_init(config) {
        eprintln!("logging already initialized: {err}");
    }
}
