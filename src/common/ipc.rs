use ipc_channel::ipc::IpcReceiver;
use serde::{Deserialize, Serialize};

/// Messages sent from the settings editor process to the overlay widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorMessage {
    /// Every key was written and the store flushed; the widget may re-read it
    Committed,
    /// The editor failed to persist its changes
    Error(String),
}

/// The bootstrap payload sent over the initial server channel.
/// Carries the receiving end of the editor's status channel.
pub type BootstrapMessage = IpcReceiver<EditorMessage>;
