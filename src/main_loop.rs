//! Single-threaded timer scheduling for the panel.
//!
//! Everything in the panel runs on one cooperative loop. Work that must happen
//! later (the debounced search, for instance) is armed as a one-shot timeout
//! and dispatched by [`MainLoop::dispatch`] once its deadline has passed.
//!
//! Priorities follow the usual desktop main-loop convention: a lower value
//! runs first when several timeouts are due at the same time.
//!
//! # Example
//! ```rust,ignore
//! let main_loop = MainLoop::new(Rc::new(SystemClock));
//! let id = main_loop.timeout_add(PRIORITY_DEFAULT, Duration::from_millis(250), || {
//!     tracing::info!("fired");
//! });
//! main_loop.source_remove(id); // dropped, never fires
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::trace;

pub type Priority = i32;

pub const PRIORITY_HIGH: Priority = -100;
pub const PRIORITY_DEFAULT: Priority = 0;
pub const PRIORITY_HIGH_IDLE: Priority = 100;
pub const PRIORITY_DEFAULT_IDLE: Priority = 200;
/// Priority at which the panel repaints.
pub const PRIORITY_REDRAW: Priority = PRIORITY_HIGH_IDLE + 50;

/// Source of the current time for the loop.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Handle for an armed timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u64);

struct TimeoutSource {
    priority: Priority,
    deadline: Instant,
    callback: Box<dyn FnOnce()>,
}

/// One-shot timeout scheduler driven by a [`Clock`].
pub struct MainLoop {
    clock: Rc<dyn Clock>,
    next_id: Cell<u64>,
    // SourceId grows with every arm, so BTreeMap order is arm order
    sources: RefCell<BTreeMap<SourceId, TimeoutSource>>,
}

impl MainLoop {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            next_id: Cell::new(1),
            sources: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Arm `callback` to run once, `delay` from now.
    pub fn timeout_add<F>(&self, priority: Priority, delay: Duration, callback: F) -> SourceId
    where
        F: FnOnce() + 'static,
    {
        let id = SourceId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let deadline = self.clock.now() + delay;
        self.sources.borrow_mut().insert(
            id,
            TimeoutSource {
                priority,
                deadline,
                callback: Box::new(callback),
            },
        );

        trace!(
            source_id = id.0,
            priority,
            delay_ms = delay.as_millis() as u64,
            "Timeout armed"
        );
        id
    }

    /// Cancel an armed timeout. Its callback, and everything it captured, is
    /// dropped before this returns. Returns false if the source already fired
    /// or was removed.
    pub fn source_remove(&self, id: SourceId) -> bool {
        // Take it out first so drops that touch the loop don't hit a live borrow
        let removed = self.sources.borrow_mut().remove(&id);
        match removed {
            Some(source) => {
                drop(source);
                trace!(source_id = id.0, "Timeout removed");
                true
            }
            None => false,
        }
    }

    /// Run every timeout whose deadline has passed. Returns how many ran.
    pub fn dispatch(&self) -> usize {
        let mut dispatched = 0;
        while let Some(source) = self.take_next_due() {
            (source.callback)();
            dispatched += 1;
        }
        dispatched
    }

    fn take_next_due(&self) -> Option<TimeoutSource> {
        let now = self.clock.now();
        let mut sources = self.sources.borrow_mut();
        let id = sources
            .iter()
            .filter(|(_, source)| source.deadline <= now)
            .min_by_key(|(id, source)| (source.priority, source.deadline, **id))
            .map(|(id, _)| *id)?;
        sources.remove(&id)
    }

    /// Earliest deadline among armed timeouts.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.sources
            .borrow()
            .values()
            .map(|source| source.deadline)
            .min()
    }

    /// How long until the next timeout is due, zero if one is overdue.
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn pending_count(&self) -> usize {
        self.sources.borrow().len()
    }

    pub fn is_pending(&self, id: SourceId) -> bool {
        self.sources.borrow().contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_loop() -> (Rc<ManualClock>, MainLoop) {
        let clock = Rc::new(ManualClock::new());
        let main_loop = MainLoop::new(clock.clone());
        (clock, main_loop)
    }

    #[test]
    fn test_timeout_fires_only_after_deadline() {
        let (clock, main_loop) = manual_loop();
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        main_loop.timeout_add(PRIORITY_DEFAULT, Duration::from_millis(250), move || {
            f.set(f.get() + 1)
        });

        clock.advance(Duration::from_millis(249));
        assert_eq!(main_loop.dispatch(), 0);
        assert_eq!(fired.get(), 0);

        clock.advance(Duration::from_millis(1));
        assert_eq!(main_loop.dispatch(), 1);
        assert_eq!(fired.get(), 1);
        assert_eq!(main_loop.pending_count(), 0);
    }

    #[test]
    fn test_removed_timeout_never_fires_and_drops_captures() {
        let (clock, main_loop) = manual_loop();
        let captured = Rc::new(String::from("held"));
        let fired = Rc::new(Cell::new(false));

        let held = captured.clone();
        let f = fired.clone();
        let id = main_loop.timeout_add(PRIORITY_DEFAULT, Duration::from_millis(10), move || {
            let _ = held.len();
            f.set(true);
        });
        assert_eq!(Rc::strong_count(&captured), 2);

        assert!(main_loop.source_remove(id));
        assert_eq!(Rc::strong_count(&captured), 1);
        assert!(!main_loop.source_remove(id));

        clock.advance(Duration::from_secs(1));
        assert_eq!(main_loop.dispatch(), 0);
        assert!(!fired.get());
    }

    #[test]
    fn test_due_timeouts_run_in_arm_order() {
        let (clock, main_loop) = manual_loop();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let order = order.clone();
            main_loop.timeout_add(PRIORITY_DEFAULT, Duration::from_millis(5), move || {
                order.borrow_mut().push(n)
            });
        }
        clock.advance(Duration::from_millis(5));
        main_loop.dispatch();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_lower_priority_value_runs_first() {
        let (clock, main_loop) = manual_loop();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        main_loop.timeout_add(PRIORITY_DEFAULT_IDLE, Duration::ZERO, move || {
            o.borrow_mut().push("idle")
        });
        let o = order.clone();
        main_loop.timeout_add(PRIORITY_REDRAW - 5, Duration::ZERO, move || {
            o.borrow_mut().push("search")
        });
        let o = order.clone();
        main_loop.timeout_add(PRIORITY_REDRAW, Duration::ZERO, move || {
            o.borrow_mut().push("redraw")
        });

        clock.advance(Duration::from_millis(1));
        main_loop.dispatch();
        assert_eq!(*order.borrow(), vec!["search", "redraw", "idle"]);
    }

    #[test]
    fn test_callback_can_arm_new_timeout() {
        let (clock, main_loop) = manual_loop();
        let main_loop = Rc::new(main_loop);
        let fired = Rc::new(Cell::new(0));

        let inner_loop = main_loop.clone();
        let f = fired.clone();
        main_loop.timeout_add(PRIORITY_DEFAULT, Duration::from_millis(1), move || {
            f.set(f.get() + 1);
            let f = f.clone();
            inner_loop.timeout_add(PRIORITY_DEFAULT, Duration::from_millis(1), move || {
                f.set(f.get() + 1)
            });
        });

        clock.advance(Duration::from_millis(1));
        assert_eq!(main_loop.dispatch(), 1);
        assert_eq!(main_loop.pending_count(), 1);

        clock.advance(Duration::from_millis(1));
        assert_eq!(main_loop.dispatch(), 1);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_time_until_next() {
        let (clock, main_loop) = manual_loop();
        assert_eq!(main_loop.time_until_next(), None);

        main_loop.timeout_add(PRIORITY_DEFAULT, Duration::from_millis(100), || {});
        clock.advance(Duration::from_millis(40));
        assert_eq!(main_loop.time_until_next(), Some(Duration::from_millis(60)));

        clock.advance(Duration::from_millis(100));
        assert_eq!(main_loop.time_until_next(), Some(Duration::ZERO));
    }
}
