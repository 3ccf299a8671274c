//! External command handling via stdin.
//!
//! The panel can be driven by JSON objects, one per line (JSONL):
//!
//! ```json
//! {"type": "show"}
//! {"type": "hide"}
//! {"type": "setSize", "width": 800, "height": 400}
//! {"type": "setFilter", "text": "search term"}
//! {"type": "searchClicked"}
//! {"type": "clear"}
//! {"type": "saveSelection"}
//! {"type": "copy", "serial": 3}
//! {"type": "remove", "serial": 3}
//! {"type": "select", "serial": 3}
//! {"type": "hover", "serial": 3, "entered": true}
//! {"type": "list"}
//! {"type": "quit"}
//! ```
//!
//! ```bash
//! echo '{"type": "list"}' | pasteboard-panel --standalone
//! ```

use std::io::BufRead;
use std::sync::mpsc::SyncSender;

use tracing::{debug, info, warn};

use crate::error::PasteboardError;
use crate::panel::{HostEvent, Pasteboard};

/// Commands accepted on stdin
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PanelCommand {
    /// Host started showing the panel
    Show,
    /// Host finished hiding the panel
    Hide,
    /// Host resized the panel
    SetSize { width: u32, height: u32 },
    /// Type into the search entry
    SetFilter { text: String },
    /// Press the search entry's button
    SearchClicked,
    /// Press "Clear pasteboard"
    Clear,
    /// Press "Copy" next to the selection label
    SaveSelection,
    /// Press an item's action button
    Copy { serial: i64 },
    /// Press an item's remove button
    Remove { serial: i64 },
    /// Move the list selection (omit serial to deselect)
    Select {
        #[serde(default)]
        serial: Option<i64>,
    },
    /// Pointer crossing an item
    Hover { serial: i64, entered: bool },
    /// Print the panel to stdout
    List,
    /// Exit the main loop
    Quit,
}

/// What the main loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Output(Vec<String>),
    Quit,
}

/// Parse one stdin line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<PanelCommand>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Apply a command to the panel.
pub fn execute(panel: &Pasteboard, command: PanelCommand) -> CommandOutcome {
    debug!(command = ?command, "Executing command");
    match command {
        PanelCommand::Show => panel.handle_host_event(HostEvent::ShowBegin),
        PanelCommand::Hide => panel.handle_host_event(HostEvent::HideEnd),
        PanelCommand::SetSize { width, height } => {
            panel.handle_host_event(HostEvent::SetSize { width, height })
        }
        PanelCommand::SetFilter { text } => panel.entry().set_text(&text),
        PanelCommand::SearchClicked => panel.entry().click_button(),
        PanelCommand::Clear => panel.clear_clicked(),
        PanelCommand::SaveSelection => panel.copy_selection_clicked(),
        PanelCommand::Copy { serial } => match panel.view().item(serial) {
            Some(item) => item.click_action(),
            None => warn_unknown(serial),
        },
        PanelCommand::Remove { serial } => match panel.view().item(serial) {
            Some(item) => item.click_remove(),
            None => warn_unknown(serial),
        },
        PanelCommand::Select { serial } => panel.view().select(serial),
        PanelCommand::Hover { serial, entered } => match panel.view().item(serial) {
            Some(item) if entered => item.on_pointer_enter(),
            Some(item) => item.on_pointer_leave(),
            None => warn_unknown(serial),
        },
        PanelCommand::List => return CommandOutcome::Output(panel.render()),
        PanelCommand::Quit => return CommandOutcome::Quit,
    }
    CommandOutcome::Continue
}

fn warn_unknown(serial: i64) {
    PasteboardError::UnknownItem(serial).report("Command refers to a missing item");
}

/// Read commands from stdin on a background thread and forward them.
///
/// Malformed lines are logged and skipped. The thread exits when stdin
/// closes or the receiver is dropped.
pub fn start_stdin_listener<T>(tx: SyncSender<T>)
where
    T: From<PanelCommand> + Send + 'static,
{
    std::thread::spawn(move || {
        info!("External command listener started");
        let stdin = std::io::stdin();
        let reader = stdin.lock();

        for line in reader.lines() {
            match line {
                Ok(line) => match parse_command(&line) {
                    Ok(Some(cmd)) => {
                        debug!(command = ?cmd, "Parsed command");
                        if tx.send(T::from(cmd)).is_err() {
                            info!("Command channel closed, exiting");
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(error = %e, line = %line, "Failed to parse command");
                    }
                },
                Err(e) => {
                    warn!(error = %e, "Error reading stdin");
                    break;
                }
            }
        }
        info!("External command listener exiting");
    });
}
