//! Tracing subscriber bootstrap
//!
//! Logs go to stderr so stdout carries only the answer. `RUST_LOG` takes
//! precedence over the configured level.

use crate::utils::toml_config::LoggingConfig;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// Returns the file writer guard when a log file is configured; keep it alive
/// for the lifetime of the process so buffered lines are flushed.
pub fn init_tracing(
    config: &LoggingConfig,
    verbose: bool,
) -> Result<Option<WorkerGuard>, io::Error> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scout={level},warn")));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(&config.format)];

    let guard = match &config.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            std::fs::create_dir_all(directory)?;
            let file_name = path
                .file_name()
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "logging.file has no file name")
                })?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))?;

    Ok(guard)
}

fn console_layer(format: &str) -> BoxedLayer {
    match format {
        "json" => fmt::layer().json().with_writer(io::stderr).boxed(),
        "compact" => fmt::layer().compact().with_writer(io::stderr).boxed(),
        _ => fmt::layer().with_writer(io::stderr).boxed(),
    }
}
