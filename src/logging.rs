//! Logging setup.
//!
//! The TUI owns the terminal, so logs go to `<data_dir>/typecycle/logs/typecycle.log`
//! with daily rotation.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "typecycle.log";

/// Keeps the non-blocking writer alive; pending lines flush on drop.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// Install the file subscriber. `RUST_LOG` overrides `level`.
pub fn init(data_dir: &Path, level: &str) -> std::io::Result<LoggingGuard> {
    let dir = log_dir(data_dir);
    std::fs::create_dir_all(&dir)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    // A subscriber may already be set (tests, embedding); keep the existing one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();

    tracing::info!(log_dir = %dir.display(), level, "Logging initialized");

    Ok(LoggingGuard { _guard: guard })
}

/// Log to the test harness's captured output.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
