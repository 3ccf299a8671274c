//! Clipboard monitoring
//!
//! Background thread that polls the system clipboard and primary selection
//! and forwards changes to the main loop. The store itself is only touched on
//! the main loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::logging::preview;
use crate::store::ClipboardBackend;

/// Something changed on the system clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardEvent {
    /// New clipboard text
    Text(String),
    /// Primary selection changed (None when cleared)
    Selection(Option<String>),
}

/// Remembers the last values seen so only changes are reported.
#[derive(Debug, Default)]
struct ChangeTracker {
    last_text: Option<String>,
    last_selection: Option<String>,
}

impl ChangeTracker {
    fn poll(&mut self, backend: &mut dyn ClipboardBackend) -> Vec<ClipboardEvent> {
        let mut events = Vec::new();

        match backend.text() {
            Ok(Some(text)) if self.last_text.as_deref() != Some(text.as_str()) => {
                debug!(preview = %preview(&text, 40), "Clipboard text changed");
                self.last_text = Some(text.clone());
                events.push(ClipboardEvent::Text(text));
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Clipboard text unavailable"),
        }

        match backend.selection() {
            Ok(selection) => {
                let selection = selection.filter(|s| !s.is_empty());
                if selection != self.last_selection {
                    self.last_selection = selection.clone();
                    events.push(ClipboardEvent::Selection(selection));
                }
            }
            Err(e) => debug!(error = %e, "Primary selection unavailable"),
        }

        events
    }
}

/// Handle to the polling thread. Dropping it stops the thread.
pub struct ClipboardMonitor {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ClipboardMonitor {
    /// Start polling every `interval`. `make_backend` runs on the monitor
    /// thread, so the backend itself need not be `Send`.
    pub fn start<B, F, T>(make_backend: F, interval: Duration, tx: SyncSender<T>) -> Self
    where
        B: ClipboardBackend + 'static,
        F: FnOnce() -> crate::error::Result<B> + Send + 'static,
        T: From<ClipboardEvent> + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_stop = stop_flag.clone();

        let handle = thread::spawn(move || {
            if let Err(e) = monitor_loop(make_backend, interval, tx, thread_stop) {
                error!(error = %e, "Clipboard monitor thread failed");
            }
        });

        Self {
            stop_flag,
            handle: Some(handle),
        }
    }

    /// Stop the monitoring thread and wait for it.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Clipboard monitor thread panicked");
            }
            info!("Clipboard monitoring stopped");
        }
    }
}

impl Drop for ClipboardMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn monitor_loop<B, F, T>(
    make_backend: F,
    interval: Duration,
    tx: SyncSender<T>,
    stop_flag: Arc<AtomicBool>,
) -> Result<()>
where
    B: ClipboardBackend,
    F: FnOnce() -> crate::error::Result<B>,
    T: From<ClipboardEvent>,
{
    let mut backend = make_backend().context("Failed to create clipboard instance")?;
    let mut tracker = ChangeTracker::default();

    info!(
        poll_interval_ms = interval.as_millis() as u64,
        "Clipboard monitor started"
    );

    while !stop_flag.load(Ordering::Relaxed) {
        let start = Instant::now();

        for event in tracker.poll(&mut backend) {
            if tx.send(T::from(event)).is_err() {
                info!("Clipboard event channel closed, monitor stopping");
                return Ok(());
            }
        }

        // Sleep in short slices so stop() doesn't wait a whole interval
        while !stop_flag.load(Ordering::Relaxed) {
            let elapsed = start.elapsed();
            if elapsed >= interval {
                break;
            }
            thread::sleep((interval - elapsed).min(Duration::from_millis(50)));
        }
    }

    info!("Clipboard monitor stopping");
    Ok(())
}
