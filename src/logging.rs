//! Structured logging configuration
//!
//! Provides:
//! - Pretty, compact or JSON console output on stderr
//! - Daily rolling log files via `tracing-appender`
//! - `RUST_LOG` taking precedence over the configured level
//!
//! Stdout is reserved for the report.

use crate::config::LoggingConfig;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

const LOG_FILE_NAME: &str = "realtime-cost.log";

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Initialize the logging system.
///
/// The returned guard flushes file output when dropped and must be held for the whole run.
/// Calling this twice is harmless: the second subscriber is discarded.
pub fn init_logging(config: &LoggingConfig, log_dir: &Path) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match config.output.as_str() {
        "file" | "both" => {
            let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer: BoxedLayer<_> = if config.format == "json" {
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_current_span(true)
                    .with_span_list(true)
                    .boxed()
            } else {
                fmt::layer().with_writer(non_blocking).with_ansi(false).boxed()
            };
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    let console_layer = match config.output.as_str() {
        "file" => None,
        _ => Some(console_layer(&config.format)),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}

fn console_layer<S>(format: &str) -> BoxedLayer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    match format {
        "json" => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        "compact" => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        _ => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .pretty()
            .boxed(),
    }
}

/// Identifier attached to the span of one analysis run.
pub fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}
