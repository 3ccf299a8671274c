//! Clipboard history store.
//!
//! Holds the captured items (newest first), assigns serials, and tells the
//! panel about changes through signals:
//! - `item_added(ItemAdded)` for every new capture
//! - `item_removed(serial)` when an item is removed or trimmed
//! - `cleared` after [`ClipboardStore::clear`]
//! - `selection_changed(Option<String>)` when the primary selection changes

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::HistoryConfig;
use crate::error::{PasteboardError, Result, ResultExt};
use crate::item::ClipboardItem;
use crate::logging::preview;
use crate::signal::Signal;

/// Access to the system clipboard.
pub trait ClipboardBackend {
    /// Current clipboard text, if any.
    fn text(&mut self) -> Result<Option<String>>;
    /// Replace the clipboard contents.
    fn set_text(&mut self, text: &str) -> Result<()>;
    /// Current primary selection, if the platform has one.
    fn selection(&mut self) -> Result<Option<String>>;
}

/// System clipboard through arboard.
pub struct ArboardBackend {
    clipboard: arboard::Clipboard,
}

impl ArboardBackend {
    pub fn new() -> Result<Self> {
        Ok(Self {
            clipboard: arboard::Clipboard::new()?,
        })
    }
}

impl ClipboardBackend for ArboardBackend {
    fn text(&mut self) -> Result<Option<String>> {
        match self.clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.clipboard.set_text(text.to_owned())?;
        Ok(())
    }

    #[cfg(target_os = "linux")]
    fn selection(&mut self) -> Result<Option<String>> {
        use arboard::{GetExtLinux, LinuxClipboardKind};

        match self
            .clipboard
            .get()
            .clipboard(LinuxClipboardKind::Primary)
            .text()
        {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn selection(&mut self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// In-process clipboard, for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub clipboard: Rc<RefCell<Option<String>>>,
    pub selection: Rc<RefCell<Option<String>>>,
}

impl ClipboardBackend for MemoryBackend {
    fn text(&mut self) -> Result<Option<String>> {
        Ok(self.clipboard.borrow().clone())
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        *self.clipboard.borrow_mut() = Some(text.to_owned());
        Ok(())
    }

    fn selection(&mut self) -> Result<Option<String>> {
        Ok(self.selection.borrow().clone())
    }
}

/// What kind of content an item holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Text,
    /// One or more `scheme://` URIs, one per line
    Uris,
}

impl ItemType {
    pub fn classify(text: &str) -> Self {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
        if lines.peek().is_none() {
            return ItemType::Text;
        }
        if lines.all(|line| !line.contains(char::is_whitespace) && has_uri_scheme(line)) {
            ItemType::Uris
        } else {
            ItemType::Text
        }
    }
}

fn has_uri_scheme(line: &str) -> bool {
    match line.split_once("://") {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Payload of `item_added`.
#[derive(Debug, Clone)]
pub struct ItemAdded {
    pub item_type: ItemType,
    pub item: Rc<ClipboardItem>,
}

pub struct ClipboardStore {
    backend: RefCell<Box<dyn ClipboardBackend>>,
    config: HistoryConfig,
    items: RefCell<VecDeque<Rc<ClipboardItem>>>,
    next_serial: Cell<i64>,
    current_selection: RefCell<Option<String>>,
    pub item_added: Signal<ItemAdded>,
    pub item_removed: Signal<i64>,
    pub cleared: Signal<()>,
    pub selection_changed: Signal<Option<String>>,
}

impl ClipboardStore {
    pub fn new(backend: Box<dyn ClipboardBackend>, config: HistoryConfig) -> Self {
        Self {
            backend: RefCell::new(backend),
            config,
            items: RefCell::new(VecDeque::new()),
            next_serial: Cell::new(1),
            current_selection: RefCell::new(None),
            item_added: Signal::new("item-added"),
            item_removed: Signal::new("item-removed"),
            cleared: Signal::new("cleared"),
            selection_changed: Signal::new("selection-changed"),
        }
    }

    /// Record `text` as the newest item.
    ///
    /// Empty text, text over the length limit, and a repeat of the newest
    /// item are ignored. An older item with the same text is replaced.
    pub fn add_text(&self, text: &str) -> Option<Rc<ClipboardItem>> {
        if text.is_empty() {
            return None;
        }
        if text.len() > self.config.max_text_length {
            warn!(
                len = text.len(),
                max = self.config.max_text_length,
                "Clipboard text over limit, not recorded"
            );
            return None;
        }
        let existing = self
            .items
            .borrow()
            .iter()
            .position(|item| item.contents() == text);
        match existing {
            Some(0) => {
                debug!("Clipboard text matches newest item, skipping");
                return None;
            }
            Some(index) => {
                // Older copy of the same text moves to the top as a new item
                let older = self.items.borrow_mut().remove(index);
                if let Some(older) = older {
                    debug!(serial = older.serial(), "Replacing older duplicate");
                    self.item_removed.emit(&older.serial());
                }
            }
            None => {}
        }

        let serial = self.next_serial.get();
        self.next_serial.set(serial.wrapping_add(1));

        let item = Rc::new(ClipboardItem::new(Some(text.to_owned()), serial).log_err()?);
        item.set_mtime(Utc::now());
        self.items.borrow_mut().push_front(Rc::clone(&item));

        let item_type = ItemType::classify(text);
        info!(
            serial,
            item_type = ?item_type,
            preview = %preview(text, 40),
            "Clipboard item added"
        );
        self.item_added.emit(&ItemAdded {
            item_type,
            item: Rc::clone(&item),
        });

        self.trim();
        Some(item)
    }

    fn trim(&self) {
        loop {
            let evicted = {
                let mut items = self.items.borrow_mut();
                if items.len() <= self.config.max_items {
                    break;
                }
                items.pop_back()
            };
            if let Some(item) = evicted {
                debug!(serial = item.serial(), "Oldest clipboard item trimmed");
                self.item_removed.emit(&item.serial());
            }
        }
    }

    pub fn remove(&self, serial: i64) -> Result<()> {
        let removed = {
            let mut items = self.items.borrow_mut();
            items
                .iter()
                .position(|item| item.serial() == serial)
                .and_then(|index| items.remove(index))
        };
        match removed {
            Some(_) => {
                info!(serial, "Clipboard item removed");
                self.item_removed.emit(&serial);
                Ok(())
            }
            None => Err(PasteboardError::UnknownItem(serial)),
        }
    }

    pub fn clear(&self) {
        let count = {
            let mut items = self.items.borrow_mut();
            let count = items.len();
            items.clear();
            count
        };
        info!(count, "Pasteboard cleared");
        self.cleared.emit(&());
    }

    /// Put an item's contents back on the system clipboard.
    pub fn copy_to_clipboard(&self, serial: i64) -> Result<()> {
        let item = self.get(serial).ok_or(PasteboardError::UnknownItem(serial))?;
        self.backend.borrow_mut().set_text(item.contents())?;
        info!(serial, "Clipboard item copied to clipboard");
        Ok(())
    }

    /// Add the current primary selection to the history.
    pub fn save_selection(&self) -> Result<Option<Rc<ClipboardItem>>> {
        let selection = self.backend.borrow_mut().selection()?;
        let selection = selection.or_else(|| self.current_selection.borrow().clone());
        match selection {
            Some(text) => Ok(self.add_text(&text)),
            None => {
                debug!("No selection to save");
                Ok(None)
            }
        }
    }

    /// Capture whatever is on the system clipboard now.
    pub fn capture_clipboard(&self) -> Result<Option<Rc<ClipboardItem>>> {
        let text = self.backend.borrow_mut().text()?;
        Ok(text.and_then(|text| self.add_text(&text)))
    }

    /// Update the tracked primary selection; emits `selection_changed` when
    /// it differs from the previous one.
    pub fn set_selection(&self, selection: Option<String>) {
        let selection = selection.filter(|s| !s.is_empty());
        if *self.current_selection.borrow() == selection {
            return;
        }
        self.current_selection.replace(selection.clone());
        self.selection_changed.emit(&selection);
    }

    pub fn current_selection(&self) -> Option<String> {
        self.current_selection.borrow().clone()
    }

    pub fn get(&self, serial: i64) -> Option<Rc<ClipboardItem>> {
        self.items
            .borrow()
            .iter()
            .find(|item| item.serial() == serial)
            .cloned()
    }

    /// Items, newest first.
    pub fn items(&self) -> Vec<Rc<ClipboardItem>> {
        self.items.borrow().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(config: HistoryConfig) -> (MemoryBackend, ClipboardStore) {
        let backend = MemoryBackend::default();
        let handle = MemoryBackend {
            clipboard: backend.clipboard.clone(),
            selection: backend.selection.clone(),
        };
        (handle, ClipboardStore::new(Box::new(backend), config))
    }

    fn store() -> (MemoryBackend, ClipboardStore) {
        store_with(HistoryConfig::default())
    }

    #[test]
    fn test_serials_are_monotonic_from_one() {
        let (_, store) = store();
        let a = store.add_text("a").unwrap();
        let b = store.add_text("b").unwrap();
        assert_eq!(a.serial(), 1);
        assert_eq!(b.serial(), 2);
        assert!(a.mtime().is_some());
    }

    #[test]
    fn test_items_are_newest_first() {
        let (_, store) = store();
        store.add_text("first");
        store.add_text("second");
        let contents: Vec<String> = store
            .items()
            .iter()
            .map(|i| i.contents().to_string())
            .collect();
        assert_eq!(contents, vec!["second", "first"]);
    }

    #[test]
    fn test_empty_and_repeat_text_ignored() {
        let (_, store) = store();
        assert!(store.add_text("").is_none());
        assert!(store.add_text("same").is_some());
        assert!(store.add_text("same").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_older_duplicate_moves_to_top() {
        let (_, store) = store();
        let removed = Rc::new(RefCell::new(Vec::new()));
        let r = removed.clone();
        store.item_removed.connect(move |serial| r.borrow_mut().push(*serial));

        store.add_text("one");
        store.add_text("two");
        let again = store.add_text("one").unwrap();

        assert_eq!(again.serial(), 3);
        assert_eq!(*removed.borrow(), vec![1]);
        let contents: Vec<String> = store
            .items()
            .iter()
            .map(|i| i.contents().to_string())
            .collect();
        assert_eq!(contents, vec!["one", "two"]);
    }

    #[test]
    fn test_oversize_text_ignored() {
        let (_, store) = store_with(HistoryConfig {
            max_text_length: 4,
            ..HistoryConfig::default()
        });
        assert!(store.add_text("12345").is_none());
        assert!(store.add_text("1234").is_some());
    }

    #[test]
    fn test_item_added_signal_carries_type() {
        let (_, store) = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        store
            .item_added
            .connect(move |added| s.borrow_mut().push((added.item_type, added.item.serial())));

        store.add_text("plain words");
        store.add_text("https://example.com/a\nfile:///tmp/b");

        assert_eq!(
            *seen.borrow(),
            vec![(ItemType::Text, 1), (ItemType::Uris, 2)]
        );
    }

    #[test]
    fn test_trim_evicts_oldest() {
        let (_, store) = store_with(HistoryConfig {
            max_items: 2,
            ..HistoryConfig::default()
        });
        let removed = Rc::new(RefCell::new(Vec::new()));
        let r = removed.clone();
        store.item_removed.connect(move |serial| r.borrow_mut().push(*serial));

        store.add_text("a");
        store.add_text("b");
        store.add_text("c");

        assert_eq!(store.len(), 2);
        assert_eq!(*removed.borrow(), vec![1]);
        assert!(store.get(1).is_none());
    }

    #[test]
    fn test_remove_unknown_serial_errors() {
        let (_, store) = store();
        store.add_text("a");
        assert!(matches!(store.remove(99), Err(PasteboardError::UnknownItem(99))));
        assert!(store.remove(1).is_ok());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_emits_and_empties() {
        let (_, store) = store();
        let cleared = Rc::new(Cell::new(false));
        let c = cleared.clone();
        store.cleared.connect(move |_| c.set(true));

        store.add_text("a");
        store.add_text("b");
        store.clear();

        assert!(store.is_empty());
        assert!(cleared.get());
    }

    #[test]
    fn test_copy_to_clipboard_sets_backend_text() {
        let (backend, store) = store();
        store.add_text("copy me");
        store.add_text("newer");
        store.copy_to_clipboard(1).unwrap();
        assert_eq!(backend.clipboard.borrow().as_deref(), Some("copy me"));
    }

    #[test]
    fn test_save_selection_uses_backend_selection() {
        let (backend, store) = store();
        *backend.selection.borrow_mut() = Some("selected words".into());
        let item = store.save_selection().unwrap().unwrap();
        assert_eq!(item.contents(), "selected words");
    }

    #[test]
    fn test_save_selection_without_selection_is_noop() {
        let (_, store) = store();
        assert!(store.save_selection().unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_capture_clipboard() {
        let (backend, store) = store();
        assert!(store.capture_clipboard().unwrap().is_none());
        *backend.clipboard.borrow_mut() = Some("captured".into());
        let item = store.capture_clipboard().unwrap().unwrap();
        assert_eq!(item.contents(), "captured");
    }

    #[test]
    fn test_selection_changed_only_on_change() {
        let (_, store) = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        store
            .selection_changed
            .connect(move |sel: &Option<String>| s.borrow_mut().push(sel.clone()));

        store.set_selection(Some("abc".into()));
        store.set_selection(Some("abc".into()));
        store.set_selection(Some(String::new()));
        store.set_selection(None);

        assert_eq!(*seen.borrow(), vec![Some("abc".to_string()), None]);
    }

    #[test]
    fn test_classify() {
        assert_eq!(ItemType::classify("hello"), ItemType::Text);
        assert_eq!(ItemType::classify("file:///home/me/a.txt"), ItemType::Uris);
        assert_eq!(ItemType::classify("see https://x.org"), ItemType::Text);
        assert_eq!(ItemType::classify("://nothing"), ItemType::Text);
        assert_eq!(ItemType::classify("   "), ItemType::Text);
    }
}

// System tests (require `cargo test --features system-tests`)
// These read and write the real clipboard.
