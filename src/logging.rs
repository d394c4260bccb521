//! Debug logging. The terminal belongs to the TUI, so events only ever go to
//! a file, and only in builds with the `debug-log` feature.

use std::path::PathBuf;

pub const LOG_FILE_NAME: &str = "ollama-chat-debug.log";
/// Overrides where the debug log is written.
pub const LOG_PATH_ENV: &str = "OLLAMA_CHAT_LOG";

#[cfg_attr(not(feature = "debug-log"), allow(dead_code))]
fn resolve_log_path() -> PathBuf {
    std::env::var_os(LOG_PATH_ENV).map_or_else(|| PathBuf::from(LOG_FILE_NAME), PathBuf::from)
}

#[cfg(feature = "debug-log")]
mod inner {
    use super::resolve_log_path;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::OnceLock;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    pub type LogGuard = tracing_appender::non_blocking::WorkerGuard;

    static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

    pub fn init() -> Option<LogGuard> {
        let log_path = resolve_log_path();

        let file = match fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Failed to open log file {}: {e}", log_path.display());
                return None;
            }
        };

        let (non_blocking, guard) = tracing_appender::non_blocking(file);

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("ollama_chat=debug,warn"));

        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        );

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("Failed to set tracing subscriber");
            return None;
        }

        LOG_PATH.set(log_path).ok();
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "debug logging initialized");

        Some(guard)
    }

    pub fn log_file_path() -> Option<&'static PathBuf> {
        LOG_PATH.get()
    }
}

#[cfg(not(feature = "debug-log"))]
mod inner {
    use std::path::PathBuf;

    pub type LogGuard = ();

    #[inline(always)]
    pub const fn init() -> Option<LogGuard> {
        None
    }

    #[inline(always)]
    pub const fn log_file_path() -> Option<&'static PathBuf> {
        None
    }
}

pub use inner::*;
