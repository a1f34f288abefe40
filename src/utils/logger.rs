//! Logging initialization.
//!
//! Logs go to a timestamped file under `logs/` next to the executable, with
//! a non-blocking writer; if the log directory cannot be created, logging
//! falls back to stderr rather than being dropped.
//!
//! The level is controlled by `RUST_LOG` (default `info`).

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system. Call once, before anything else.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = open_log_file();
    match log_file {
        Some((file, path)) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .init();

            // Keep the non-blocking writer alive for the program lifetime
            std::mem::forget(guard);

            tracing::info!("logging initialized, writing to {}", path.display());
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();

            tracing::warn!("log directory unavailable, logging to stderr");
        }
    }
}

/// Create `logs/clawgate.<timestamp>.log` beside the executable.
fn open_log_file() -> Option<(fs::File, PathBuf)> {
    let log_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"));

    fs::create_dir_all(&log_dir).ok()?;

    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let path = log_dir.join(format!("clawgate.{timestamp}.log"));
    let file = fs::File::create(&path).ok()?;
    Some((file, path))
}
