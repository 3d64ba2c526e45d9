//! Logging configuration using the tracing ecosystem.
//!
//! Log output goes to a daily-rotated file so it never draws over the
//! terminal UI. The level is taken from `RUST_LOG` when set.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log filter if `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "halalnest=info,warn";

/// Initialize the logging system.
///
/// Logs are written under the platform's local data directory, e.g.
/// `~/.local/share/halalnest/logs/` on Linux. Use `RUST_LOG=halalnest=debug`
/// for request-level detail.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "halalnest.log");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "HalalNest starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

/// The `halalnest/logs` directory under the local data directory.
fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("halalnest").join("logs"))
}

/// Where log files are stored, for display in the help screen.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}

/// Log application shutdown.
pub fn shutdown() {
    tracing::info!("HalalNest shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_has_expected_structure() {
        let dir = get_log_directory().unwrap();
        assert!(dir.ends_with("halalnest/logs"));
    }

    #[test]
    fn test_log_directory_public_function() {
        assert!(log_directory().is_some_and(|d| d.ends_with("halalnest/logs")));
    }
}
