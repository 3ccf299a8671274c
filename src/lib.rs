//! Pasteboard - clipboard history panel for a desktop shell
//!
//! Lists previously copied text, filters it as the user types (debounced),
//! copies an entry back to the clipboard, and clears history. The panel logic
//! runs on a single-threaded [`main_loop::MainLoop`]; the system clipboard is
//! polled on a background thread and fed in over a channel.

pub mod config;
pub mod error;
pub mod item;
pub mod logging;
pub mod main_loop;
pub mod monitor;
pub mod panel;
pub mod search;
pub mod signal;
pub mod stdin_commands;
pub mod store;
pub mod view;

pub use error::{PasteboardError, Result};
pub use item::ClipboardItem;
pub use panel::{HostEvent, PanelMode, Pasteboard};
pub use search::{SearchDispatcher, SearchRequest};
pub use store::ClipboardStore;
pub use view::{ClipboardListView, ClipboardView};
