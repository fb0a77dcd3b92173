//! Settings editor window, run as a child process of the overlay

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use eframe::{NativeOptions, egui};
use ipc_channel::ipc::{self, IpcSender};
use tracing::{error, info, warn};

use super::components;
use super::draft::{SettingsDraft, ValidationError};
use crate::common::ipc::{BootstrapMessage, EditorMessage};
use crate::common::signals::SignalFlags;
use crate::config::{SettingsStore, WidgetConfig};
use crate::constants::gui::*;
use crate::constants::overlay::EVENT_POLL_INTERVAL_MS;
use crate::overlay::utils::load_window_icon;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum SettingsTab {
    General,
    TextColor,
}

struct StatusMessage {
    text: String,
    color: egui::Color32,
}

struct SettingsApp {
    store: SettingsStore,
    draft: SettingsDraft,
    active_tab: SettingsTab,
    status_message: Option<StatusMessage>,
    status_tx: Option<IpcSender<EditorMessage>>,
    signals: SignalFlags,
    /// Set once the editor may close without committing again
    finished: bool,
}

impl SettingsApp {
    fn new(
        store: SettingsStore,
        status_tx: Option<IpcSender<EditorMessage>>,
        signals: SignalFlags,
    ) -> Self {
        let config = WidgetConfig::load(&store, &WidgetConfig::default());
        info!(?config, "Editing widget settings");
        Self {
            store,
            draft: SettingsDraft::from_config(&config),
            active_tab: SettingsTab::General,
            status_message: None,
            status_tx,
            signals,
            finished: false,
        }
    }

    fn notify(&self, message: EditorMessage) {
        if let Some(tx) = &self.status_tx
            && let Err(e) = tx.send(message)
        {
            warn!(error = %e, "Failed to notify overlay");
        }
    }

    /// Commit the draft. Returns true if the editor may close.
    fn commit(&mut self) -> bool {
        if self.finished {
            return true;
        }
        match self.draft.commit(&mut self.store) {
            Ok(_) => {
                self.finished = true;
                self.notify(EditorMessage::Committed);
                true
            }
            Err(err) => {
                if let Some(invalid) = err.downcast_ref::<ValidationError>() {
                    warn!(error = %invalid, "Rejected invalid settings");
                    self.status_message = Some(StatusMessage {
                        text: invalid.to_string(),
                        color: COLOR_ERROR,
                    });
                } else {
                    error!(error = ?err, "Failed to save settings");
                    self.notify(EditorMessage::Error(format!("{err:#}")));
                    self.status_message = Some(StatusMessage {
                        text: format!("Save failed: {err}"),
                        color: COLOR_ERROR,
                    });
                }
                false
            }
        }
    }

    fn render_tabs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for (tab, label) in [
                (SettingsTab::General, "General"),
                (SettingsTab::TextColor, "Text Color"),
            ] {
                if ui
                    .add(egui::Button::new(label).selected(self.active_tab == tab))
                    .clicked()
                {
                    self.active_tab = tab;
                }
            }
        });
    }
}

impl eframe::App for SettingsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.signals.take_quit() {
            info!("Termination requested, committing settings");
            if !self.commit() {
                warn!("Settings invalid, closing without saving");
            }
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            self.finished = true;
        }

        if ctx.input(|i| i.viewport().close_requested()) && !self.commit() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }

        egui::TopBottomPanel::top("settings_tabs").show(ctx, |ui| {
            self.render_tabs(ui);
        });

        egui::TopBottomPanel::bottom("settings_actions").show(ctx, |ui| {
            ui.add_space(ITEM_SPACING / 2.0);
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() && self.commit() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                if let Some(message) = &self.status_message {
                    ui.add_space(10.0);
                    ui.colored_label(message.color, &message.text);
                }
            });
            ui.add_space(ITEM_SPACING / 2.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let edited = match self.active_tab {
                SettingsTab::General => components::general::ui(ui, &mut self.draft),
                SettingsTab::TextColor => components::text_color::ui(ui, &mut self.draft),
            };
            if edited {
                self.status_message = None;
            }
        });

        // keep polling for SIGTERM while idle
        ctx.request_repaint_after(Duration::from_millis(EVENT_POLL_INTERVAL_MS));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!(finished = self.finished, "Settings editor exiting");
    }
}

/// Connect back to the overlay, if it launched us
fn connect_overlay(server_name: &str) -> Result<IpcSender<EditorMessage>> {
    let bootstrap_sender: IpcSender<BootstrapMessage> =
        IpcSender::connect(server_name.to_string()).context("Failed to connect to IPC server")?;
    let (status_tx, status_rx) =
        ipc::channel::<EditorMessage>().context("Failed to create status IPC channel")?;
    bootstrap_sender
        .send(status_rx)
        .context("Failed to send bootstrap message")?;
    Ok(status_tx)
}

pub fn run_settings(store_path: PathBuf, ipc_server: Option<String>) -> Result<()> {
    let signals = SignalFlags::register()?;

    let store = SettingsStore::open_or_empty(store_path);
    info!(path = %store.path().display(), "Using settings file");

    let status_tx = match ipc_server.as_deref().map(connect_overlay) {
        Some(Ok(tx)) => Some(tx),
        Some(Err(err)) => {
            error!(error = ?err, "Could not connect to the overlay");
            None
        }
        None => None,
    };

    let mut viewport_builder = egui::ViewportBuilder::default()
        .with_title("Widget Settings")
        .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT]);

    match load_window_icon() {
        Ok(icon) => viewport_builder = viewport_builder.with_icon(icon),
        Err(e) => error!("Failed to load window icon: {}", e),
    }

    let options = NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    eframe::run_native(
        "Widget Settings",
        options,
        Box::new(move |_cc| Ok(Box::new(SettingsApp::new(store, status_tx, signals)))),
    )
    .map_err(|err| anyhow!("Failed to launch settings editor: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Corner;

    fn app(dir: &tempfile::TempDir) -> SettingsApp {
        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        SettingsApp::new(store, None, SignalFlags::default())
    }

    #[test]
    fn test_commit_persists_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.draft.corner = Corner::TopRight;

        assert!(app.commit());
        assert!(app.finished);
        assert!(app.commit());

        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.get_or("corner", String::new()), "top-right");
    }

    #[test]
    fn test_invalid_input_blocks_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.draft.update_interval_ms = "soon".into();

        assert!(!app.commit());
        assert!(!app.finished);
        let message = app.status_message.as_ref().unwrap();
        assert_eq!(message.text, "Update interval must be a whole number");
        assert!(!dir.path().join("settings.json").exists());

        app.draft.update_interval_ms = "1000".into();
        assert!(app.commit());
    }

    #[test]
    fn test_starts_from_stored_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        store.set("widget_width", 320).unwrap();
        store.sync().unwrap();

        let app = app(&dir);
        assert_eq!(app.draft.widget_width, "320");
        assert_eq!(app.active_tab, SettingsTab::General);
    }
}
