//! Typed observer lists for panel events.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

/// Identifies one connected handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler<T> = Rc<dyn Fn(&T)>;

/// A named event with any number of connected handlers.
///
/// Handlers run in connection order. A handler disconnected while an emission
/// is in progress (including one that disconnects itself) is not called again
/// by that emission.
pub struct Signal<T> {
    name: &'static str,
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(HandlerId, Handler<T>)>>,
}

impl<T> Signal<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: Cell::new(1),
            handlers: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn connect<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&T) + 'static,
    {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        let removed = {
            let mut handlers = self.handlers.borrow_mut();
            handlers
                .iter()
                .position(|(handler_id, _)| *handler_id == id)
                .map(|index| handlers.remove(index))
        };
        removed.is_some()
    }

    pub fn emit(&self, value: &T) {
        let snapshot: Vec<(HandlerId, Handler<T>)> = self.handlers.borrow().clone();
        trace!(signal = self.name, handlers = snapshot.len(), "Emitting");
        for (id, handler) in snapshot {
            if self.is_connected(id) {
                handler(value);
            }
        }
    }

    pub fn is_connected(&self, id: HandlerId) -> bool {
        self.handlers
            .borrow()
            .iter()
            .any(|(handler_id, _)| *handler_id == id)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("handlers", &self.handler_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_handlers_in_order() {
        let signal: Signal<u32> = Signal::new("test");
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        signal.connect(move |v| s.borrow_mut().push(("first", *v)));
        let s = seen.clone();
        signal.connect(move |v| s.borrow_mut().push(("second", *v)));

        signal.emit(&7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let signal: Signal<()> = Signal::new("test");
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = signal.connect(move |_| c.set(c.get() + 1));

        signal.emit(&());
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit(&());

        assert_eq!(count.get(), 1);
        assert_eq!(signal.handler_count(), 0);
    }

    #[test]
    fn test_handler_can_disconnect_itself_during_emit() {
        let signal: Rc<Signal<()>> = Rc::new(Signal::new("item-added"));
        let count = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<HandlerId>>> = Rc::new(Cell::new(None));

        let sig = Rc::downgrade(&signal);
        let c = count.clone();
        let own = own_id.clone();
        let id = signal.connect(move |_| {
            c.set(c.get() + 1);
            if let (Some(sig), Some(id)) = (sig.upgrade(), own.get()) {
                sig.disconnect(id);
            }
        });
        own_id.set(Some(id));

        signal.emit(&());
        signal.emit(&());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_handler_disconnected_mid_emit_is_skipped() {
        let signal: Rc<Signal<()>> = Rc::new(Signal::new("test"));
        let second_called = Rc::new(Cell::new(false));
        let second_id: Rc<Cell<Option<HandlerId>>> = Rc::new(Cell::new(None));

        let sig = Rc::downgrade(&signal);
        let target = second_id.clone();
        signal.connect(move |_| {
            if let (Some(sig), Some(id)) = (sig.upgrade(), target.get()) {
                sig.disconnect(id);
            }
        });
        let called = second_called.clone();
        second_id.set(Some(signal.connect(move |_| called.set(true))));

        signal.emit(&());
        assert!(!second_called.get());
    }
}
