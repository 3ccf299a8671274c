use std::panic::Location;

use thiserror::Error;
use tracing::{error, info, warn, Level};

/// Error severity for panel display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational
    Warning,  // recoverable
    Error,    // operation failed
    Critical, // item or panel unusable
}

impl ErrorSeverity {
    /// Log level an error of this severity is reported at
    pub fn level(self) -> Level {
        match self {
            ErrorSeverity::Info => Level::INFO,
            ErrorSeverity::Warning => Level::WARN,
            ErrorSeverity::Error | ErrorSeverity::Critical => Level::ERROR,
        }
    }
}

/// Domain-specific errors for the pasteboard panel
#[derive(Error, Debug)]
pub enum PasteboardError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No clipboard item with serial {0}")]
    UnknownItem(i64),

    #[error("Clipboard access failed: {0}")]
    Clipboard(String),

    #[error("Bad config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PasteboardError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidArgument(_) => ErrorSeverity::Critical,
            Self::Clipboard(_) => ErrorSeverity::Error,
            Self::Config(_) | Self::UnknownItem(_) => ErrorSeverity::Warning,
            Self::Io(_) => ErrorSeverity::Error,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidArgument(msg) => format!("Invalid input: {}", msg),
            Self::UnknownItem(_) => "That item is no longer in the pasteboard".to_string(),
            Self::Clipboard(msg) => format!("Could not access the clipboard: {}", msg),
            Self::Config(msg) => format!("Settings file problem: {}", msg),
            Self::Io(e) => format!("I/O problem: {}", e),
        }
    }
}

impl PasteboardError {
    /// Log this error at the level its severity calls for.
    #[track_caller]
    pub fn report(&self, context: &str) {
        self.report_at(self.severity().level(), context, Location::caller());
    }

    fn report_at(&self, level: Level, context: &str, caller: &Location<'_>) {
        let severity = self.severity();
        let user_message = self.user_message();
        match level {
            Level::ERROR => error!(
                error = %self,
                ?severity,
                %user_message,
                at = %caller,
                "{}",
                context
            ),
            Level::WARN => warn!(
                error = %self,
                ?severity,
                %user_message,
                at = %caller,
                "{}",
                context
            ),
            _ => info!(
                error = %self,
                ?severity,
                %user_message,
                at = %caller,
                "{}",
                context
            ),
        }
    }
}

impl From<arboard::Error> for PasteboardError {
    fn from(err: arboard::Error) -> Self {
        Self::Clipboard(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PasteboardError>;

/// Log-and-continue for panel actions.
///
/// Click and button handlers have no caller to hand an error back to, so they
/// log it with the call site and carry on.
///
/// ```ignore
/// use pasteboard::error::ResultExt;
///
/// store.copy_to_clipboard(serial).log_err();
/// store.remove(serial).warn_on_err(); // item may already be gone
/// ```
pub trait ResultExt<T> {
    /// Log at the error's own severity; `None` on failure.
    fn log_err(self) -> Option<T>;
    /// Log at most at warn level, for failures that are expected; `None` on failure.
    fn warn_on_err(self) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        let caller = Location::caller();
        self.map_err(|e| e.report_at(e.severity().level(), "Panel action failed", caller))
            .ok()
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        let caller = Location::caller();
        self.map_err(|e| {
            let level = e.severity().level().max(Level::WARN);
            e.report_at(level, "Panel action skipped", caller)
        })
        .ok()
    }
}
