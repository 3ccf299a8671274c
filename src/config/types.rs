//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::defaults::*;
use crate::main_loop::Priority;

// ============================================
// SEARCH CONFIG
// ============================================

/// Debounced search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Quiet period before the filter is applied (default: 250)
    #[serde(default = "default_search_delay_ms")]
    pub delay_ms: u64,
    /// Main-loop priority of the search timeout (default: redraw - 5)
    #[serde(default = "default_search_priority")]
    pub priority: Priority,
}

fn default_search_delay_ms() -> u64 {
    DEFAULT_SEARCH_DELAY_MS
}
fn default_search_priority() -> Priority {
    DEFAULT_SEARCH_PRIORITY
}

impl SearchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            delay_ms: DEFAULT_SEARCH_DELAY_MS,
            priority: DEFAULT_SEARCH_PRIORITY,
        }
    }
}

// ============================================
// HISTORY CONFIG
// ============================================

/// Clipboard history limits and polling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Items kept before the oldest is dropped (default: 100)
    #[serde(default = "default_history_max_items")]
    pub max_items: usize,
    /// Longer text is not recorded (default: 100000 bytes)
    #[serde(default = "default_history_max_text_length")]
    pub max_text_length: usize,
    /// Clipboard polling interval (default: 500)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_history_max_items() -> usize {
    DEFAULT_HISTORY_MAX_ITEMS
}
fn default_history_max_text_length() -> usize {
    DEFAULT_HISTORY_MAX_TEXT_LENGTH
}
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl HistoryConfig {
    /// Never shorter than `MIN_POLL_INTERVAL_MS`, so a zero never busy-loops.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            max_items: DEFAULT_HISTORY_MAX_ITEMS,
            max_text_length: DEFAULT_HISTORY_MAX_TEXT_LENGTH,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

// ============================================
// PANEL CONFIG
// ============================================

/// Panel geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelConfig {
    /// Height requested from the host when embedded (default: 400)
    #[serde(default = "default_panel_height_request")]
    pub height_request: u32,
    /// Standalone window width (default: 1016)
    #[serde(default = "default_standalone_width")]
    pub standalone_width: u32,
    /// Standalone window height (default: 504)
    #[serde(default = "default_standalone_height")]
    pub standalone_height: u32,
}

fn default_panel_height_request() -> u32 {
    DEFAULT_PANEL_HEIGHT_REQUEST
}
fn default_standalone_width() -> u32 {
    DEFAULT_STANDALONE_WIDTH
}
fn default_standalone_height() -> u32 {
    DEFAULT_STANDALONE_HEIGHT
}

impl Default for PanelConfig {
    fn default() -> Self {
        PanelConfig {
            height_request: DEFAULT_PANEL_HEIGHT_REQUEST,
            standalone_width: DEFAULT_STANDALONE_WIDTH,
            standalone_height: DEFAULT_STANDALONE_HEIGHT,
        }
    }
}

// ============================================
// MAIN CONFIG
// ============================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub panel: PanelConfig,
}
