//! The pasteboard panel: search field, item list, and side controls.
//!
//! Layout (top to bottom):
//! - title + search entry
//! - "empty" notice, until the first item arrives
//! - item list on the left; "Clear pasteboard" and "Copy <selection>" on the right
//!
//! The host (shell panel or standalone window) drives it with [`HostEvent`]s.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::ResultExt;
use crate::item::{ACTION_LABEL, OPACITY_OPAQUE};
use crate::main_loop::MainLoop;
use crate::search::SearchDispatcher;
use crate::signal::{HandlerId, Signal};
use crate::store::ClipboardStore;
use crate::view::ClipboardListView;

pub const TITLE: &str = "Pasteboard";
pub const SEARCH_HINT: &str = "Search";
pub const EMPTY_NOTICE: &str = "You need to copy some text to use Pasteboard";
pub const CLEAR_LABEL: &str = "Clear pasteboard";
pub const COPY_SELECTION_LABEL: &str = "Copy";
pub const SELECTION_PROMPT: &str = "the current selection to pasteboard";
const SELECTION_PREFIX: &str = "your selection";

/// Text next to the "Copy" button for the given primary selection.
pub fn selection_label_text(selection: Option<&str>) -> String {
    match selection {
        Some(text) if !text.is_empty() => format!("{} \"{}\"", SELECTION_PREFIX, text),
        _ => SELECTION_PROMPT.to_string(),
    }
}

/// Single-line search field.
pub struct SearchEntry {
    text: RefCell<String>,
    focused: Cell<bool>,
    pub text_changed: Signal<String>,
    pub button_clicked: Signal<String>,
}

impl SearchEntry {
    pub fn new() -> Self {
        Self {
            text: RefCell::new(String::new()),
            focused: Cell::new(false),
            text_changed: Signal::new("text-changed"),
            button_clicked: Signal::new("button-clicked"),
        }
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Replace the text; emits `text_changed` when it actually changes.
    pub fn set_text(&self, text: &str) {
        if *self.text.borrow() == text {
            return;
        }
        self.text.replace(text.to_owned());
        self.text_changed.emit(&text.to_owned());
    }

    pub fn click_button(&self) {
        let text = self.text();
        self.button_clicked.emit(&text);
    }

    pub fn grab_focus(&self) {
        self.focused.set(true);
    }

    pub fn has_focus(&self) -> bool {
        self.focused.get()
    }
}

impl Default for SearchEntry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    /// Dropped down from the shell's panel bar
    Embedded,
    /// Own window, shown immediately
    Standalone,
}

/// Lifecycle notifications from whatever hosts the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    ShowBegin,
    HideEnd,
    SetSize { width: u32, height: u32 },
}

pub struct Pasteboard {
    mode: PanelMode,
    height_request: u32,
    store: Rc<ClipboardStore>,
    view: Rc<ClipboardListView>,
    search: Rc<SearchDispatcher>,
    entry: Rc<SearchEntry>,
    empty_notice: Rc<Cell<bool>>,
    selection_label: Rc<RefCell<String>>,
    size: Cell<(u32, u32)>,
    shown: Cell<bool>,
}

impl Pasteboard {
    pub fn new(
        main_loop: Rc<MainLoop>,
        store: Rc<ClipboardStore>,
        config: &Config,
        mode: PanelMode,
    ) -> Self {
        let view = ClipboardListView::new(&store);
        let search = Rc::new(SearchDispatcher::new(
            main_loop,
            view.clone(),
            &config.search,
        ));

        // Search entry drives the dispatcher on both typing and the search button
        let entry = Rc::new(SearchEntry::new());
        let weak_search = Rc::downgrade(&search);
        entry.text_changed.connect(move |text: &String| {
            if let Some(search) = weak_search.upgrade() {
                search.on_text_event(text);
            }
        });
        let weak_search = Rc::downgrade(&search);
        entry.button_clicked.connect(move |text: &String| {
            if let Some(search) = weak_search.upgrade() {
                search.on_text_event(text);
            }
        });

        let empty_notice = Rc::new(Cell::new(store.is_empty()));
        if empty_notice.get() {
            connect_empty_notice(&store, &empty_notice);
        }

        let selection_label = Rc::new(RefCell::new(selection_label_text(
            store.current_selection().as_deref(),
        )));
        let label = Rc::downgrade(&selection_label);
        store
            .selection_changed
            .connect(move |selection: &Option<String>| {
                if let Some(label) = label.upgrade() {
                    label.replace(selection_label_text(selection.as_deref()));
                }
            });

        let (size, shown) = match mode {
            PanelMode::Embedded => ((0, 0), false),
            PanelMode::Standalone => (
                (config.panel.standalone_width, config.panel.standalone_height),
                true,
            ),
        };

        info!(mode = ?mode, width = size.0, height = size.1, "Pasteboard panel created");

        Self {
            mode,
            height_request: config.panel.height_request,
            store,
            view,
            search,
            entry,
            empty_notice,
            selection_label,
            size: Cell::new(size),
            shown: Cell::new(shown),
        }
    }

    pub fn handle_host_event(&self, event: HostEvent) {
        match event {
            HostEvent::ShowBegin => {
                self.shown.set(true);
                self.entry.grab_focus();
                debug!("Panel shown, search entry focused");
            }
            HostEvent::HideEnd => {
                self.shown.set(false);
                // Reset search
                self.entry.set_text("");
                debug!("Panel hidden, search reset");
            }
            HostEvent::SetSize { width, height } => {
                self.size.set((width, height));
                debug!(width, height, "Dimensions for pasteboard view");
            }
        }
    }

    pub fn clear_clicked(&self) {
        self.store.clear();
    }

    pub fn copy_selection_clicked(&self) {
        self.store.save_selection().log_err();
    }

    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    /// Height asked of the host when embedded.
    pub fn height_request(&self) -> u32 {
        self.height_request
    }

    pub fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    pub fn is_shown(&self) -> bool {
        self.shown.get()
    }

    pub fn entry(&self) -> &SearchEntry {
        &self.entry
    }

    pub fn view(&self) -> &ClipboardListView {
        &self.view
    }

    pub fn store(&self) -> &ClipboardStore {
        &self.store
    }

    pub fn search(&self) -> &SearchDispatcher {
        &self.search
    }

    pub fn empty_notice(&self) -> Option<&'static str> {
        self.empty_notice.get().then_some(EMPTY_NOTICE)
    }

    pub fn selection_label(&self) -> String {
        self.selection_label.borrow().clone()
    }

    /// Plain-text rendering of the panel.
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("{} [{}: {}]", TITLE, SEARCH_HINT, self.entry.text())];
        if let Some(notice) = self.empty_notice() {
            lines.push(notice.to_string());
        }
        for item in self.view.visible_items() {
            let mut line = format!("#{} {}", item.serial(), item.contents().replace('\n', "⏎"));
            if item.remove_opacity() == OPACITY_OPAQUE {
                line.push_str(" [x]");
            }
            if item.is_action_visible() {
                line.push_str(&format!(" [{}]", ACTION_LABEL));
            }
            lines.push(line);
        }
        lines.push(format!("[{}]", CLEAR_LABEL));
        lines.push(format!("[{}] {}", COPY_SELECTION_LABEL, self.selection_label()));
        lines
    }
}

/// The notice goes away for good on the first added item.
fn connect_empty_notice(store: &Rc<ClipboardStore>, notice: &Rc<Cell<bool>>) {
    let own_id: Rc<Cell<Option<HandlerId>>> = Rc::new(Cell::new(None));
    let weak_store: Weak<ClipboardStore> = Rc::downgrade(store);
    let notice = Rc::downgrade(notice);
    let id_slot = own_id.clone();
    let id = store.item_added.connect(move |_| {
        if let Some(notice) = notice.upgrade() {
            notice.set(false);
        }
        if let (Some(store), Some(id)) = (weak_store.upgrade(), id_slot.get()) {
            store.item_added.disconnect(id);
        }
    });
    own_id.set(Some(id));
}
