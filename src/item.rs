//! A single pasteboard entry and its two affordances.
//!
//! The item shows its text with two buttons:
//! - **remove**: always present, but fully transparent until the pointer is
//!   over the item
//! - **action** ("Copy"): hidden outright until the owning list decides this
//!   item should expose it
//!
//! Hover and action visibility are independent. Neither button does anything
//! by itself; clicks are emitted as `remove_clicked` / `action_clicked` for the
//! owner to act on.

use std::cell::{Cell, OnceCell};
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{PasteboardError, Result};
use crate::signal::Signal;

/// Remove-button opacity while the pointer is outside the item
pub const OPACITY_TRANSPARENT: u8 = 0x00;
/// Remove-button opacity while the pointer is over the item
pub const OPACITY_OPAQUE: u8 = 0xff;

/// Label on the action button
pub const ACTION_LABEL: &str = "Copy";

/// Style pseudo-class applied on pointer crossing
pub const HOVER_PSEUDO_CLASS: &str = "hover";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverState {
    Idle,
    Hovered,
}

#[cfg(test)]
thread_local! {
    static FILTER_KEY_COMPUTATIONS: Cell<usize> = const { Cell::new(0) };
}

fn compute_filter_key(contents: &str) -> String {
    #[cfg(test)]
    FILTER_KEY_COMPUTATIONS.with(|count| count.set(count.get() + 1));
    contents.to_lowercase()
}

pub struct ClipboardItem {
    contents: String,
    filter_key: OnceCell<String>,
    serial: i64,
    mtime: Cell<Option<DateTime<Utc>>>,
    hover: Cell<HoverState>,
    remove_opacity: Cell<u8>,
    action_visible: Cell<bool>,
    pseudo_class: Cell<Option<&'static str>>,
    pub remove_clicked: Signal<()>,
    pub action_clicked: Signal<()>,
}

impl ClipboardItem {
    /// Create an item. `contents` is required; any serial, including 0, is
    /// accepted.
    pub fn new(contents: Option<String>, serial: i64) -> Result<Self> {
        let contents = contents.ok_or_else(|| {
            PasteboardError::InvalidArgument("clipboard item contents must not be null".into())
        })?;

        debug!(serial, len = contents.len(), "Clipboard item created");

        Ok(Self {
            contents,
            filter_key: OnceCell::new(),
            serial,
            mtime: Cell::new(None),
            hover: Cell::new(HoverState::Idle),
            remove_opacity: Cell::new(OPACITY_TRANSPARENT),
            action_visible: Cell::new(false),
            pseudo_class: Cell::new(None),
            remove_clicked: Signal::new("remove-clicked"),
            action_clicked: Signal::new("action-clicked"),
        })
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Lowercased contents used for filtering, computed on first use.
    pub fn filter_key(&self) -> &str {
        self.filter_key.get_or_init(|| compute_filter_key(&self.contents))
    }

    pub fn serial(&self) -> i64 {
        self.serial
    }

    pub fn mtime(&self) -> Option<DateTime<Utc>> {
        self.mtime.get()
    }

    pub fn set_mtime(&self, mtime: DateTime<Utc>) {
        self.mtime.set(Some(mtime));
    }

    pub fn matches(&self, lowered_filter: &str) -> bool {
        self.filter_key().contains(lowered_filter)
    }

    // -- action affordance --------------------------------------------------

    pub fn show_action(&self) {
        self.action_visible.set(true);
    }

    pub fn hide_action(&self) {
        self.action_visible.set(false);
    }

    pub fn is_action_visible(&self) -> bool {
        self.action_visible.get()
    }

    // -- hover / remove affordance ------------------------------------------

    pub fn on_pointer_enter(&self) {
        self.pseudo_class.set(Some(HOVER_PSEUDO_CLASS));
        self.hover.set(HoverState::Hovered);
        self.remove_opacity.set(OPACITY_OPAQUE);
    }

    pub fn on_pointer_leave(&self) {
        // Leave re-applies the hover pseudo-class rather than clearing it
        self.pseudo_class.set(Some(HOVER_PSEUDO_CLASS));
        self.hover.set(HoverState::Idle);
        self.remove_opacity.set(OPACITY_TRANSPARENT);
    }

    pub fn hover_state(&self) -> HoverState {
        self.hover.get()
    }

    pub fn remove_opacity(&self) -> u8 {
        self.remove_opacity.get()
    }

    pub fn pseudo_class(&self) -> Option<&'static str> {
        self.pseudo_class.get()
    }

    // -- clicks -------------------------------------------------------------

    pub fn click_remove(&self) {
        debug!(serial = self.serial, "Remove clicked");
        self.remove_clicked.emit(&());
    }

    pub fn click_action(&self) {
        debug!(serial = self.serial, "Action clicked");
        self.action_clicked.emit(&());
    }
}

impl fmt::Debug for ClipboardItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardItem")
            .field("serial", &self.serial)
            .field("contents", &self.contents)
            .field("hover", &self.hover.get())
            .field("action_visible", &self.action_visible.get())
            .finish()
    }
}
