//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

use crate::main_loop::{Priority, PRIORITY_REDRAW};

/// Quiet period before a search filter is applied (ms)
pub const DEFAULT_SEARCH_DELAY_MS: u64 = 250;

/// Search runs just ahead of redraws
pub const DEFAULT_SEARCH_PRIORITY: Priority = PRIORITY_REDRAW - 5;

/// Maximum number of items kept in history
pub const DEFAULT_HISTORY_MAX_ITEMS: usize = 100;

/// Max text length for history entries (bytes)
pub const DEFAULT_HISTORY_MAX_TEXT_LENGTH: usize = 100_000;

/// Clipboard polling interval (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Shortest poll interval honoured; smaller values are raised to this (ms)
pub const MIN_POLL_INTERVAL_MS: u64 = 50;

/// Height the panel requests from the host when embedded
pub const DEFAULT_PANEL_HEIGHT_REQUEST: u32 = 400;

/// Size of the panel when running standalone
pub const DEFAULT_STANDALONE_WIDTH: u32 = 1016;
pub const DEFAULT_STANDALONE_HEIGHT: u32 = 504;
