//! Structured JSONL logging to file plus human-readable stderr output.
//!
//! - **JSONL to file** (~/.pasteboard/logs/pasteboard.jsonl)
//! - **Compact to stderr** for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! // MUST keep guard alive for duration of program
//! let _guard = pasteboard::logging::init();
//!
//! tracing::info!(event_type = "panel", action = "show", "Panel shown");
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "pasteboard.jsonl";

/// Keeps the file writer's worker alive; flushes the log when dropped.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the JSONL file layer and the stderr layer.
///
/// Hold on to the returned guard until exit. Without a writable log file only
/// stderr logging is set up.
pub fn init() -> LoggingGuard {
    let path = log_path();
    let (writer, file_guard) = match open_log_file(&path) {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let json_layer = writer.map(|writer| {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_current_span(false)
            .with_span_events(FmtSpan::NONE)
    });

    let stderr_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false);

    // RUST_LOG wins over the built-in default
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(stderr_layer)
        .init();

    tracing::info!(
        event_type = "lifecycle",
        log_file = %path.display(),
        file_logging = file_guard.is_some(),
        "Pasteboard logging ready"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

fn open_log_file(path: &Path) -> Option<File> {
    let dir = path.parent()?;
    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("pasteboard: cannot create {}: {}", dir.display(), e);
        return None;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| eprintln!("pasteboard: cannot open {}: {}", path.display(), e))
        .ok()
}

/// `~/.pasteboard/logs`, or a temp dir when there is no home
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".pasteboard").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("pasteboard-logs"))
}

/// Where the JSONL log is written
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

/// Truncate text for log fields so clipboard contents don't flood the log.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
