//! Debounced search filtering.
//!
//! Every change to the search field cancels whatever filter is still waiting
//! and arms a new one. Only when the field has been quiet for the configured
//! delay does the view get filtered, so a burst of keystrokes costs a single
//! filter pass with the final text.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::config::SearchConfig;
use crate::main_loop::{MainLoop, Priority, SourceId};
use crate::view::ClipboardView;

/// A filter waiting for its quiet period to elapse.
///
/// Owns its view reference and filter text until it either fires or is
/// dropped by cancellation.
pub struct SearchRequest {
    view: Rc<dyn ClipboardView>,
    filter: Option<String>,
}

impl SearchRequest {
    /// Empty text means "no filter".
    pub fn new(view: Rc<dyn ClipboardView>, text: &str) -> Self {
        let filter = if text.is_empty() {
            None
        } else {
            Some(text.to_owned())
        };
        Self { view, filter }
    }

    pub fn filter_text(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Apply the filter to the view.
    pub fn fire(self) {
        debug!(filter = ?self.filter, "Applying search filter");
        self.view.filter(self.filter.as_deref());
    }
}

pub struct SearchDispatcher {
    main_loop: Rc<MainLoop>,
    view: Rc<dyn ClipboardView>,
    delay: Duration,
    priority: Priority,
    pending: Rc<Cell<Option<SourceId>>>,
}

impl SearchDispatcher {
    pub fn new(
        main_loop: Rc<MainLoop>,
        view: Rc<dyn ClipboardView>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            main_loop,
            view,
            delay: config.delay(),
            priority: config.priority,
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Handle a text change (or activation) of the search field.
    pub fn on_text_event(&self, current_text: &str) {
        self.cancel();

        let request = SearchRequest::new(Rc::clone(&self.view), current_text);
        let pending = Rc::clone(&self.pending);
        let id = self.main_loop.timeout_add(self.priority, self.delay, move || {
            pending.set(None);
            request.fire();
        });
        self.pending.set(Some(id));
    }

    /// Drop the waiting filter, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        match self.pending.take() {
            Some(id) => self.main_loop.source_remove(id),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

impl Drop for SearchDispatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::main_loop::{Clock, ManualClock, PRIORITY_REDRAW};
    use std::cell::RefCell;
    use std::time::Instant;

    #[derive(Default)]
    struct RecordingView {
        calls: RefCell<Vec<Option<String>>>,
    }

    impl ClipboardView for RecordingView {
        fn filter(&self, filter: Option<&str>) {
            self.calls.borrow_mut().push(filter.map(str::to_owned));
        }
    }

    struct Fixture {
        clock: Rc<ManualClock>,
        main_loop: Rc<MainLoop>,
        view: Rc<RecordingView>,
        dispatcher: SearchDispatcher,
    }

    fn fixture() -> Fixture {
        let clock = Rc::new(ManualClock::new());
        let main_loop = Rc::new(MainLoop::new(clock.clone()));
        let view = Rc::new(RecordingView::default());
        let dispatcher =
            SearchDispatcher::new(main_loop.clone(), view.clone(), &SearchConfig::default());
        Fixture {
            clock,
            main_loop,
            view,
            dispatcher,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_burst_applies_only_last_text() {
        let f = fixture();
        let start = f.clock.now();

        f.dispatcher.on_text_event("a");
        f.clock.advance(ms(10));
        f.main_loop.dispatch();
        f.dispatcher.on_text_event("ab");
        f.clock.advance(ms(10));
        f.main_loop.dispatch();
        f.dispatcher.on_text_event("abc");
        let last_event: Instant = f.clock.now();

        f.clock.advance(ms(249));
        f.main_loop.dispatch();
        assert!(f.view.calls.borrow().is_empty());

        f.clock.advance(ms(1));
        f.main_loop.dispatch();
        assert_eq!(*f.view.calls.borrow(), vec![Some("abc".to_string())]);
        assert_eq!(f.clock.now() - last_event, ms(250));
        assert_eq!(f.clock.now() - start, ms(270));
        assert!(!f.dispatcher.is_pending());
    }

    #[test]
    fn test_empty_text_clears_filter() {
        let f = fixture();
        f.dispatcher.on_text_event("");
        f.clock.advance(ms(250));
        f.main_loop.dispatch();
        assert_eq!(*f.view.calls.borrow(), vec![None]);
    }

    #[test]
    fn test_same_text_still_reschedules() {
        let f = fixture();
        f.dispatcher.on_text_event("x");
        f.clock.advance(ms(200));
        f.dispatcher.on_text_event("x");
        f.clock.advance(ms(200));
        f.main_loop.dispatch();
        assert!(f.view.calls.borrow().is_empty());

        f.clock.advance(ms(50));
        f.main_loop.dispatch();
        assert_eq!(f.view.calls.borrow().len(), 1);
    }

    #[test]
    fn test_separate_bursts_each_fire() {
        let f = fixture();
        f.dispatcher.on_text_event("one");
        f.clock.advance(ms(250));
        f.main_loop.dispatch();
        f.dispatcher.on_text_event("two");
        f.clock.advance(ms(250));
        f.main_loop.dispatch();
        assert_eq!(
            *f.view.calls.borrow(),
            vec![Some("one".to_string()), Some("two".to_string())]
        );
    }

    #[test]
    fn test_at_most_one_pending_request() {
        let f = fixture();
        for text in ["a", "b", "c", "d"] {
            f.dispatcher.on_text_event(text);
            assert_eq!(f.main_loop.pending_count(), 1);
        }
        assert!(f.dispatcher.is_pending());
    }

    #[test]
    fn test_cancel_releases_view_reference() {
        let f = fixture();
        let baseline = Rc::strong_count(&f.view);

        f.dispatcher.on_text_event("held");
        assert_eq!(Rc::strong_count(&f.view), baseline + 1);

        f.dispatcher.on_text_event("replaced");
        assert_eq!(Rc::strong_count(&f.view), baseline + 1);

        assert!(f.dispatcher.cancel());
        assert_eq!(Rc::strong_count(&f.view), baseline);
        assert!(!f.dispatcher.cancel());

        f.clock.advance(ms(1000));
        assert_eq!(f.main_loop.dispatch(), 0);
        assert!(f.view.calls.borrow().is_empty());
    }

    #[test]
    fn test_fire_releases_view_reference() {
        let f = fixture();
        let baseline = Rc::strong_count(&f.view);
        f.dispatcher.on_text_event("q");
        f.clock.advance(ms(250));
        f.main_loop.dispatch();
        assert_eq!(Rc::strong_count(&f.view), baseline);
    }

    #[test]
    fn test_request_runs_ahead_of_redraw() {
        let f = fixture();
        let saw_search = Rc::new(RefCell::new(Vec::new()));

        // Armed before the search, due at the same instant
        let view = f.view.clone();
        let seen = saw_search.clone();
        f.main_loop.timeout_add(PRIORITY_REDRAW, ms(250), move || {
            seen.borrow_mut().push(!view.calls.borrow().is_empty())
        });
        f.dispatcher.on_text_event("z");

        f.clock.advance(ms(250));
        assert_eq!(f.main_loop.dispatch(), 2);
        assert_eq!(*saw_search.borrow(), vec![true]);
    }

    #[test]
    fn test_search_request_filter_text() {
        let view: Rc<dyn ClipboardView> = Rc::new(RecordingView::default());
        assert_eq!(SearchRequest::new(view.clone(), "").filter_text(), None);
        assert_eq!(SearchRequest::new(view, "Foo").filter_text(), Some("Foo"));
    }
}
