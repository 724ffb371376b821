// Logging module - tracing subscriber setup
//
// Stdout always gets human-readable output. When file logging is enabled, a
// second layer writes JSON lines to a rolling file through a non-blocking
// writer so request handling never waits on disk.

use crate::config::{LogRotation, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for a configured level
///
/// Precedence: RUST_LOG env var > config file > default "info"
pub fn default_filter(level: &str) -> String {
    format!("inference_router={level},axum=info")
}

/// Install the global subscriber
///
/// The returned guard must be kept alive for the duration of the program to
/// ensure buffered file logs flush.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.level).into());

    let mut guard = None;
    let file_layer = if config.file_enabled {
        match std::fs::create_dir_all(&config.file_dir) {
            Ok(()) => {
                let (non_blocking, worker_guard) =
                    tracing_appender::non_blocking(file_appender(config));
                guard = Some(worker_guard);
                Some(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
            }
            Err(e) => {
                // Subscriber is not up yet, so stderr is the only channel
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.file_dir, e
                );
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

fn file_appender(config: &LoggingConfig) -> RollingFileAppender {
    match config.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&config.file_dir, &config.file_prefix)
        }
        LogRotation::Daily => {
            tracing_appender::rolling::daily(&config.file_dir, &config.file_prefix)
        }
        LogRotation::Never => {
            tracing_appender::rolling::never(&config.file_dir, &config.file_prefix)
        }
    }
}
