//! List of pasteboard items as shown in the panel.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, info};

use crate::error::ResultExt;
use crate::item::ClipboardItem;
use crate::store::{ClipboardStore, ItemAdded};

/// Anything that can narrow its items down by a search string.
pub trait ClipboardView {
    /// `None` shows every item; `Some(text)` shows items whose filter key
    /// contains `text`, compared case-insensitively.
    fn filter(&self, filter: Option<&str>);
}

struct Row {
    item: Rc<ClipboardItem>,
    visible: bool,
}

/// Rows mirror the store, newest first.
pub struct ClipboardListView {
    store: Weak<ClipboardStore>,
    rows: RefCell<Vec<Row>>,
    // Lowercased active filter
    filter: RefCell<Option<String>>,
    selected: RefCell<Option<i64>>,
}

impl ClipboardListView {
    /// Create a view that follows `store`.
    pub fn new(store: &Rc<ClipboardStore>) -> Rc<Self> {
        let view = Rc::new(Self {
            store: Rc::downgrade(store),
            rows: RefCell::new(Vec::new()),
            filter: RefCell::new(None),
            selected: RefCell::new(None),
        });

        for item in store.items().into_iter().rev() {
            view.insert_item(item);
        }

        let weak = Rc::downgrade(&view);
        store.item_added.connect(move |added: &ItemAdded| {
            if let Some(view) = weak.upgrade() {
                view.insert_item(Rc::clone(&added.item));
            }
        });

        let weak = Rc::downgrade(&view);
        store.item_removed.connect(move |serial: &i64| {
            if let Some(view) = weak.upgrade() {
                view.remove_row(*serial);
            }
        });

        let weak = Rc::downgrade(&view);
        store.cleared.connect(move |_| {
            if let Some(view) = weak.upgrade() {
                view.rows.borrow_mut().clear();
                view.selected.replace(None);
            }
        });

        view
    }

    fn insert_item(&self, item: Rc<ClipboardItem>) {
        let serial = item.serial();
        let store = self.store.clone();
        item.remove_clicked.connect(move |_| {
            if let Some(store) = store.upgrade() {
                store.remove(serial).warn_on_err();
            }
        });
        let store = self.store.clone();
        item.action_clicked.connect(move |_| {
            if let Some(store) = store.upgrade() {
                store.copy_to_clipboard(serial).log_err();
            }
        });

        let visible = self.passes_filter(&item);
        self.rows.borrow_mut().insert(0, Row { item, visible });
        debug!(serial, visible, "Row inserted");
    }

    fn remove_row(&self, serial: i64) {
        self.rows.borrow_mut().retain(|row| row.item.serial() != serial);
        let mut selected = self.selected.borrow_mut();
        if *selected == Some(serial) {
            *selected = None;
        }
    }

    fn passes_filter(&self, item: &ClipboardItem) -> bool {
        match self.filter.borrow().as_deref() {
            Some(filter) => item.matches(filter),
            None => true,
        }
    }

    /// Expose the action button on `serial` only. `None` hides it everywhere.
    pub fn select(&self, serial: Option<i64>) {
        for row in self.rows.borrow().iter() {
            if Some(row.item.serial()) == serial {
                row.item.show_action();
            } else {
                row.item.hide_action();
            }
        }
        self.selected.replace(serial);
    }

    pub fn selected(&self) -> Option<i64> {
        *self.selected.borrow()
    }

    pub fn item(&self, serial: i64) -> Option<Rc<ClipboardItem>> {
        self.rows
            .borrow()
            .iter()
            .find(|row| row.item.serial() == serial)
            .map(|row| Rc::clone(&row.item))
    }

    /// Items currently shown, newest first.
    pub fn visible_items(&self) -> Vec<Rc<ClipboardItem>> {
        self.rows
            .borrow()
            .iter()
            .filter(|row| row.visible)
            .map(|row| Rc::clone(&row.item))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    pub fn active_filter(&self) -> Option<String> {
        self.filter.borrow().clone()
    }
}

impl ClipboardView for ClipboardListView {
    fn filter(&self, filter: Option<&str>) {
        self.filter.replace(filter.map(str::to_lowercase));

        let mut shown = 0;
        {
            let filter = self.filter.borrow();
            for row in self.rows.borrow_mut().iter_mut() {
                row.visible = match filter.as_deref() {
                    Some(f) => row.item.matches(f),
                    None => true,
                };
                if row.visible {
                    shown += 1;
                }
            }
        }

        info!(
            filter = ?filter,
            shown,
            total = self.len(),
            "Pasteboard filtered"
        );
    }
}
