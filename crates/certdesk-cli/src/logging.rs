//! Logging bootstrap.
//!
//! Writes to a daily-rotated file under `${CERTDESK_HOME}/logs`; the level is
//! controlled by the `CERTDESK_LOG` env var (defaults to `info`). File-only so
//! command output stays clean.

use certdesk_core::config::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initializes file logging. Returns the guard that flushes buffered log
/// lines on drop; keep it alive for the process lifetime.
///
/// Returns `None` (and logs nothing) when the logs directory can't be
/// created — logging must never block a command from running.
pub fn init() -> Option<WorkerGuard> {
    let logs_dir = paths::logs_dir();
    if std::fs::create_dir_all(&logs_dir).is_err() {
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logs_dir, "certdesk.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_env("CERTDESK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok();

    Some(guard)
}
