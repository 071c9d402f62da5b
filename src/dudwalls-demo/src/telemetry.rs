//! Demo logging: request traces as JSON lines on disk, progress on stderr
//!
//! The client crate only emits `tracing` events; this module decides where
//! they go. Files rotate daily or at 10MB and are kept as numbered backups.

use anyhow::{Context, Result};
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const DEFAULT_FILTER: &str = "dudwalls_demo=info,dudwalls_rs=debug";
const LOG_FILE: &str = "dudwalls-demo.log";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;
const MAX_BACKUPS: usize = 9;

/// Rolling appender for `<log_dir>/dudwalls-demo.log`, creating the directory
pub fn file_appender(log_dir: &Path) -> Result<RollingFileAppender<RollingConditionBasic>> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("cannot create log directory {}", log_dir.display()))?;

    let appender = RollingFileAppender::new(
        log_dir.join(LOG_FILE),
        RollingConditionBasic::new().daily().max_size(MAX_LOG_BYTES),
        MAX_BACKUPS,
    )
    .with_context(|| format!("cannot open log file in {}", log_dir.display()))?;

    Ok(appender)
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the default filter. Keep the returned guard alive
/// until [`shutdown_telemetry`], or buffered file lines are lost.
pub fn init_telemetry(log_dir: &Path) -> Result<WorkerGuard> {
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender(log_dir)?);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Span close events carry the timing of each batch insert
    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_target(true);

    let console_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::debug!(log_dir = %log_dir.display(), "Logging to file");

    Ok(guard)
}

/// Flush buffered file output by dropping the writer guard
pub fn shutdown_telemetry(guard: WorkerGuard) {
    tracing::debug!("Flushing logs");
    drop(guard);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_appender_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let log_dir = tmp.path().join("nested").join("logs");

        let mut appender = file_appender(&log_dir).unwrap();
        appender.write_all(b"{\"msg\":\"hello\"}\n").unwrap();
        appender.flush().unwrap();

        let contents = std::fs::read_to_string(log_dir.join(LOG_FILE)).unwrap();
        assert!(contents.contains("hello"));
    }
}
