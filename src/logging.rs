//! File-backed tracing setup for the simulator.
//!
//! Diagnostics go to a log file rather than stderr so they cannot corrupt
//! the terminal UI. `SERPNAV_LOG` selects the filter, `SERPNAV_LOG_DIR`
//! the directory, defaulting to the platform cache directory.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "serpnav.log";
const FILTER_ENV: &str = "SERPNAV_LOG";
const DIR_ENV: &str = "SERPNAV_LOG_DIR";

/// Install the global subscriber. The returned guard flushes the writer on
/// drop and must be held for the life of the process.
pub(crate) fn init() -> WorkerGuard {
    let dir = log_dir();
    let _ = fs::create_dir_all(&dir);
    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    guard
}

fn log_dir() -> PathBuf {
    if let Some(dir) = env::var_os(DIR_ENV)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    ProjectDirs::from("io", "serpnav", "serpnav")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
