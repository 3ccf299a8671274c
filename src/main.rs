use std::rc::Rc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use pasteboard::config::{self, Config};
use pasteboard::logging;
use pasteboard::main_loop::{MainLoop, SystemClock};
use pasteboard::monitor::{ClipboardEvent, ClipboardMonitor};
use pasteboard::panel::{PanelMode, Pasteboard};
use pasteboard::stdin_commands::{self, CommandOutcome, PanelCommand};
use pasteboard::store::{ArboardBackend, ClipboardBackend, ClipboardStore, MemoryBackend};

/// Longest the loop sleeps when no timeout is armed
const IDLE_WAIT: Duration = Duration::from_millis(500);

/// Events buffered between the worker threads and the main loop
const EVENT_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Default, Parser)]
#[command(name = "pasteboard-panel", version, about = "Pasteboard clipboard history panel")]
struct Cli {
    /// Do not embed into the shell panel; run in a window of its own
    #[arg(short, long)]
    standalone: bool,

    /// Path to config.json (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
}

/// Everything the main loop waits on.
enum LoopEvent {
    Command(PanelCommand),
    Clipboard(ClipboardEvent),
}

impl From<PanelCommand> for LoopEvent {
    fn from(cmd: PanelCommand) -> Self {
        LoopEvent::Command(cmd)
    }
}

impl From<ClipboardEvent> for LoopEvent {
    fn from(event: ClipboardEvent) -> Self {
        LoopEvent::Clipboard(event)
    }
}

fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            // Bad options are reported, then we carry on with defaults
            error!(error = %e, "Error parsing options, using defaults");
            Cli::default()
        }
        Err(e) => {
            // --help / --version
            let _ = e.print();
            std::process::exit(0);
        }
    }
}

fn main() {
    let _log_guard = logging::init();

    let cli = parse_args();
    let config: Config = config::load_config(cli.config.as_deref());
    let mode = if cli.standalone {
        PanelMode::Standalone
    } else {
        PanelMode::Embedded
    };

    run(mode, &config);
    info!("Pasteboard panel exiting");
}

fn run(mode: PanelMode, config: &Config) {
    let main_loop = Rc::new(MainLoop::new(Rc::new(SystemClock)));
    let backend: Box<dyn ClipboardBackend> = match ArboardBackend::new() {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            warn!(error = %e, "System clipboard unavailable, history is in-memory only");
            Box::new(MemoryBackend::default())
        }
    };
    let store = Rc::new(ClipboardStore::new(backend, config.history.clone()));
    let panel = Pasteboard::new(main_loop.clone(), store.clone(), config, mode);

    if mode == PanelMode::Embedded {
        info!(height = panel.height_request(), "Requesting panel height");
    }

    let (tx, rx) = mpsc::sync_channel::<LoopEvent>(EVENT_CHANNEL_CAPACITY);
    let _monitor = ClipboardMonitor::start(
        ArboardBackend::new,
        config.history.poll_interval(),
        tx.clone(),
    );
    stdin_commands::start_stdin_listener(tx);

    info!(mode = ?mode, "Pasteboard main loop running");

    loop {
        let wait = main_loop
            .time_until_next()
            .map_or(IDLE_WAIT, |next| next.min(IDLE_WAIT));

        let first = match rx.recv_timeout(wait) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                info!("All event sources closed");
                break;
            }
        };

        for event in first.into_iter().chain(rx.try_iter()) {
            if !handle_event(&panel, &store, event) {
                info!("Quit requested");
                return;
            }
        }

        main_loop.dispatch();
    }
}

/// Returns false when the loop should stop.
fn handle_event(panel: &Pasteboard, store: &ClipboardStore, event: LoopEvent) -> bool {
    match event {
        LoopEvent::Clipboard(ClipboardEvent::Text(text)) => {
            store.add_text(&text);
        }
        LoopEvent::Clipboard(ClipboardEvent::Selection(selection)) => {
            store.set_selection(selection);
        }
        LoopEvent::Command(cmd) => match stdin_commands::execute(panel, cmd) {
            CommandOutcome::Continue => {}
            CommandOutcome::Output(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            CommandOutcome::Quit => return false,
        },
    }
    true
}
