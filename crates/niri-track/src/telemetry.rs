use std::io::IsTerminal;
use std::path::Path;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

pub const LOG_FILE_ENV: &str = "NIRI_TRACK_LOG";
pub const DEBUG_ENV: &str = "NIRI_DEBUG";

#[derive(Debug)]
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

impl TelemetryGuard {
    fn disabled() -> Self {
        Self { _guard: None }
    }
}

/// Default filter for a `NIRI_DEBUG` value.
pub fn level_for(niri_debug: Option<&str>) -> &'static str {
    match niri_debug.map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "info") => "info",
        Some("debug") => "debug",
        _ => "warn",
    }
}

pub fn default_level() -> &'static str {
    level_for(std::env::var(DEBUG_ENV).ok().as_deref())
}

/// Logs to stderr, or to `$NIRI_TRACK_LOG` when set.
pub fn init_tracing(default_level: &str) -> TelemetryGuard {
    init_with(default_level, log_file_path_from_env())
}

/// Logs to `path`, falling back to `$NIRI_TRACK_LOG`. For processes whose
/// stdout and stderr belong to someone else.
pub fn init_file_tracing(default_level: &str, path: &Path) -> TelemetryGuard {
    let path = log_file_path_from_env().unwrap_or_else(|| path.to_path_buf());
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    init_with(default_level, Some(path))
}

fn init_with(default_level: &str, log_file: Option<PathBuf>) -> TelemetryGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (writer, guard, ansi) = match log_file {
        Some(path) => match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                (BoxMakeWriter::new(non_blocking), Some(guard), false)
            }
            Err(err) => {
                eprintln!(
                    "Warning: failed to open log file {}: {}",
                    path.display(),
                    err
                );
                (BoxMakeWriter::new(std::io::stderr), None, std::io::stderr().is_terminal())
            }
        },
        None => (BoxMakeWriter::new(std::io::stderr), None, std::io::stderr().is_terminal()),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer);

    if subscriber.try_init().is_err() {
        return TelemetryGuard::disabled();
    }

    TelemetryGuard { _guard: guard }
}

fn log_file_path_from_env() -> Option<PathBuf> {
    std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
