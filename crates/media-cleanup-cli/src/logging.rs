use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_LOG_FILE: &str = "./logs/media-cleanup.log";

/// Console plus file logging. `TRACING_LEVEL` takes an env-filter directive,
/// `LOG_FILE_PATH` names the log file. The returned guard flushes the file
/// writer when dropped.
pub fn init_logger() -> WorkerGuard {
    let directive = env::var("TRACING_LEVEL").unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
    let (filter, rejected) = match EnvFilter::try_new(&directive) {
        Ok(filter) => (filter, false),
        Err(_) => (EnvFilter::new(DEFAULT_LEVEL), true),
    };

    let log_file = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (dir, file_name) = split_log_path(Path::new(&log_file));
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, &file_name));

    let console = fmt::layer()
        .compact()
        .with_writer(std::io::stdout)
        .with_target(false)
        .without_time();
    let file = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    if rejected {
        warn!(
            "Ignoring TRACING_LEVEL={:?}, falling back to {}",
            directive, DEFAULT_LEVEL
        );
    }
    debug!("Logging to {}", dir.join(&file_name).display());

    guard
}

/// Directory and file name for the appender. A bare name lands in the
/// working directory; a path without a file name gets the default one.
fn split_log_path(path: &Path) -> (PathBuf, String) {
    let file_name = match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => name.to_string(),
        None => {
            return (path.to_path_buf(), default_file_name());
        }
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (dir, file_name)
}

fn default_file_name() -> String {
    Path::new(DEFAULT_LOG_FILE)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("media-cleanup.log")
        .to_string()
}
