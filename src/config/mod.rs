//! Configuration module - panel settings
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_SEARCH_DELAY_MS, DEFAULT_SEARCH_PRIORITY};

pub use types::{Config, HistoryConfig, PanelConfig, SearchConfig};

pub use loader::{default_config_path, load_config, read_config};

#[cfg(test)]
pub use defaults::{
    DEFAULT_HISTORY_MAX_ITEMS, DEFAULT_HISTORY_MAX_TEXT_LENGTH, DEFAULT_PANEL_HEIGHT_REQUEST,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_STANDALONE_HEIGHT, DEFAULT_STANDALONE_WIDTH,
    MIN_POLL_INTERVAL_MS,
};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
