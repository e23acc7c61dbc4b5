//! Logging setup
//!
//! The terminal belongs to the TUI, so logs go to a daily rolling file under
//! the configured log directory. Filtering follows `CLARIFIND_LOG`, then
//! `RUST_LOG`, then `clarifind=info`.

use std::error::Error;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_ENV: &str = "CLARIFIND_LOG";
const DEFAULT_DIRECTIVE: &str = "clarifind=info";
const LOG_FILE_PREFIX: &str = "clarifind.log";

/// Flushes buffered log lines when dropped; keep it alive for the whole run.
pub struct TelemetryGuard {
    _worker: WorkerGuard,
}

/// The filter directive in effect for the given environment lookup.
pub fn filter_directive(lookup: impl Fn(&str) -> Option<String>) -> String {
    [LOG_ENV, "RUST_LOG"]
        .iter()
        .filter_map(|key| lookup(*key))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

pub fn init_telemetry(log_dir: &Path) -> Result<TelemetryGuard, Box<dyn Error + Send + Sync>> {
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let directive = filter_directive(|key| std::env::var(key).ok());
    let filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    Registry::default()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .try_init()?;

    Ok(TelemetryGuard { _worker: guard })
}
