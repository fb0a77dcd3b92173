//! Settings editor child process supervision
//!
//! The editor runs as a separate process sharing the settings file. It
//! connects back over an ipc-channel one-shot server and reports when it
//! has flushed its changes; the widget re-reads the store then, and once
//! more when the child exits.

use anyhow::{Context, Result};
use ipc_channel::ipc::IpcOneShotServer;
use std::path::Path;
use std::process::Child;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::utils::spawn_settings_editor;
use crate::common::ipc::{BootstrapMessage, EditorMessage};

/// How long to wait for the editor to flush and exit after SIGTERM
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// How long to wait for in-flight messages once the child has exited
const EXIT_DRAIN: Duration = Duration::from_millis(200);

/// Something the widget should react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The editor flushed the store
    Committed,
    /// The editor could not persist its changes
    Failed(String),
    /// The child process is gone
    Exited(Option<i32>),
}

pub struct EditorProcess {
    child: Child,
    bootstrap_rx: Option<mpsc::Receiver<BootstrapMessage>>,
    message_rx: Option<mpsc::Receiver<EditorMessage>>,
}

impl EditorProcess {
    /// Launch the editor against the given settings file
    pub fn spawn(store_path: &Path) -> Result<Self> {
        let (server, server_name) =
            IpcOneShotServer::<BootstrapMessage>::new().context("Failed to create IPC server")?;

        let child = spawn_settings_editor(&server_name, store_path)?;
        info!(pid = child.id(), server_name = %server_name, "Started settings editor");
        Ok(Self::supervise(child, server))
    }

    /// Watch an already running editor whose IPC connection arrives on `server`
    fn supervise(child: Child, server: IpcOneShotServer<BootstrapMessage>) -> Self {
        // accept() blocks until the child connects
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || match server.accept() {
            Ok((_, bootstrap_msg)) => {
                debug!("Settings editor connected via IPC");
                let _ = tx.send(bootstrap_msg);
            }
            Err(e) => {
                error!(error = %e, "Failed to accept IPC connection");
            }
        });

        Self {
            child,
            bootstrap_rx: Some(rx),
            message_rx: None,
        }
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Collect pending events. Only blocks briefly once the child is gone,
    /// to pick up messages still in flight.
    ///
    /// An `Exited` event is always last; the process should be dropped after it.
    pub fn poll(&mut self) -> Vec<EditorEvent> {
        let mut events = Vec::new();

        if let Some(ref rx) = self.bootstrap_rx
            && let Ok(status_rx) = rx.try_recv()
        {
            // Bridge the ipc receiver onto a std channel we can try_recv on
            let (gui_tx, gui_rx) = mpsc::channel();
            std::thread::spawn(move || {
                while let Ok(msg) = status_rx.recv() {
                    if gui_tx.send(msg).is_err() {
                        break;
                    }
                }
            });
            self.message_rx = Some(gui_rx);
            self.bootstrap_rx = None;
        }

        if let Some(ref rx) = self.message_rx {
            while let Ok(msg) = rx.try_recv() {
                events.push(editor_event(msg));
            }
        }

        match self.child.try_wait() {
            Ok(Some(status)) => {
                info!(pid = self.child.id(), exit = ?status.code(), "Settings editor exited");
                // the bridge thread may still hold the editor's last message
                if let Some(ref rx) = self.message_rx {
                    while let Ok(msg) = rx.recv_timeout(EXIT_DRAIN) {
                        events.push(editor_event(msg));
                    }
                }
                events.push(EditorEvent::Exited(status.code()));
            }
            Ok(None) => {}
            Err(err) => {
                error!(error = ?err, "Failed to query settings editor status");
            }
        }

        events
    }

    /// Ask the editor to close (it commits on close) and reap it.
    ///
    /// Falls back to SIGKILL if it does not exit in time.
    pub fn terminate(mut self) {
        let pid = self.child.id();
        info!(pid, "Stopping settings editor");

        #[cfg(unix)]
        {
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                warn!(pid, error = %e, "Failed to send SIGTERM to settings editor");
            }
        }
        #[cfg(not(unix))]
        if let Err(e) = self.child.kill() {
            warn!(pid, error = %e, "Failed to kill settings editor");
        }

        let deadline = Instant::now() + TERMINATE_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    debug!(pid, status = ?status, "Settings editor exited");
                    return;
                }
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(20));
                }
                Ok(None) => break,
                Err(e) => {
                    error!(pid, error = %e, "Failed to wait for settings editor exit");
                    break;
                }
            }
        }

        warn!(pid, "Settings editor did not exit, killing it");
        if let Err(e) = self.child.kill() {
            error!(pid, error = %e, "Failed to send SIGKILL to settings editor");
        }
        let _ = self.child.wait();
    }
}

fn editor_event(msg: EditorMessage) -> EditorEvent {
    match msg {
        EditorMessage::Committed => EditorEvent::Committed,
        EditorMessage::Error(e) => {
            error!("Settings editor error: {}", e);
            EditorEvent::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipc_channel::ipc::{self, IpcSender};
    use std::process::Command;

    fn shell(script: &str) -> Child {
        Command::new("sh").arg("-c").arg(script).spawn().unwrap()
    }

    fn server() -> (IpcOneShotServer<BootstrapMessage>, String) {
        IpcOneShotServer::<BootstrapMessage>::new().unwrap()
    }

    /// Poll until the child is reported gone
    fn poll_until_exit(editor: &mut EditorProcess) -> Vec<EditorEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while Instant::now() < deadline {
            let batch = editor.poll();
            let exited = matches!(batch.last(), Some(EditorEvent::Exited(_)));
            events.extend(batch);
            if exited {
                return events;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        panic!("editor did not exit, events so far: {events:?}");
    }

    /// Act as the editor side of the IPC hand-off
    fn connect(server_name: String) -> IpcSender<EditorMessage> {
        let bootstrap: IpcSender<BootstrapMessage> = IpcSender::connect(server_name).unwrap();
        let (status_tx, status_rx) = ipc::channel::<EditorMessage>().unwrap();
        bootstrap.send(status_rx).unwrap();
        status_tx
    }

    #[test]
    fn test_exit_without_connecting_reports_status() {
        let (server, _name) = server();
        let mut editor = EditorProcess::supervise(shell("exit 3"), server);

        let events = poll_until_exit(&mut editor);
        assert_eq!(events, vec![EditorEvent::Exited(Some(3))]);
    }

    #[test]
    fn test_commit_is_reported_before_exit() {
        let (server, name) = server();
        let mut editor = EditorProcess::supervise(shell("sleep 0.5"), server);

        let status_tx = connect(name);
        status_tx.send(EditorMessage::Committed).unwrap();
        drop(status_tx);

        let events = poll_until_exit(&mut editor);
        assert_eq!(
            events,
            vec![EditorEvent::Committed, EditorEvent::Exited(Some(0))]
        );
    }

    #[test]
    fn test_error_message_maps_to_failed() {
        let (server, name) = server();
        let mut editor = EditorProcess::supervise(shell("sleep 0.5"), server);

        let status_tx = connect(name);
        status_tx
            .send(EditorMessage::Error("disk full".into()))
            .unwrap();
        status_tx.send(EditorMessage::Committed).unwrap();
        drop(status_tx);

        let events = poll_until_exit(&mut editor);
        assert_eq!(
            events,
            vec![
                EditorEvent::Failed("disk full".into()),
                EditorEvent::Committed,
                EditorEvent::Exited(Some(0)),
            ]
        );
    }

    #[test]
    fn test_terminate_stops_cooperative_child() {
        let (server, _name) = server();
        let editor = EditorProcess::supervise(shell("exec sleep 30"), server);

        let started = Instant::now();
        editor.terminate();
        assert!(started.elapsed() < TERMINATE_GRACE);
    }

    #[test]
    fn test_terminate_kills_child_ignoring_sigterm() {
        let (server, _name) = server();
        let editor = EditorProcess::supervise(shell("trap '' TERM; exec sleep 30"), server);
        // let the shell install the trap first
        std::thread::sleep(Duration::from_millis(200));

        let started = Instant::now();
        editor.terminate();
        let elapsed = started.elapsed();
        assert!(elapsed >= TERMINATE_GRACE);
        assert!(elapsed < Duration::from_secs(10));
    }
}
