//! System tray icon
//!
//! The tray lives on its own thread with a current-thread tokio runtime; it
//! never touches widget state, only forwards commands and wakes the UI.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use eframe::egui;
use ksni::TrayMethods;
use tracing::{error, info, warn};

use super::utils::load_tray_icon_pixmap;
use crate::constants::tray::{FALLBACK_ICON_NAME, ID, TITLE};

/// Requests from the tray menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    Show,
    Hide,
    Toggle,
    Quit,
}

pub struct OverlayTray {
    commands: Sender<TrayCommand>,
    ctx: egui::Context,
}

impl OverlayTray {
    fn send(&self, command: TrayCommand) {
        if self.commands.send(command).is_err() {
            warn!(?command, "Overlay is gone, dropping tray command");
            return;
        }
        self.ctx.request_repaint();
    }
}

impl ksni::Tray for OverlayTray {
    fn id(&self) -> String {
        ID.into()
    }

    fn title(&self) -> String {
        TITLE.into()
    }

    fn icon_name(&self) -> String {
        FALLBACK_ICON_NAME.into()
    }

    fn icon_pixmap(&self) -> Vec<ksni::Icon> {
        match load_tray_icon_pixmap() {
            Ok(icon) => vec![icon],
            Err(err) => {
                warn!(error = ?err, "Failed to decode tray icon, using themed icon");
                Vec::new()
            }
        }
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            title: TITLE.into(),
            ..Default::default()
        }
    }

    fn activate(&mut self, _x: i32, _y: i32) {
        self.send(TrayCommand::Toggle);
    }

    fn menu(&self) -> Vec<ksni::MenuItem<Self>> {
        use ksni::menu::*;

        vec![
            StandardItem {
                label: "Show".into(),
                activate: Box::new(|this: &mut OverlayTray| this.send(TrayCommand::Show)),
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: "Hide".into(),
                activate: Box::new(|this: &mut OverlayTray| this.send(TrayCommand::Hide)),
                ..Default::default()
            }
            .into(),
            MenuItem::Separator,
            StandardItem {
                label: "Quit".into(),
                activate: Box::new(|this: &mut OverlayTray| this.send(TrayCommand::Quit)),
                ..Default::default()
            }
            .into(),
        ]
    }
}

/// Run the tray service on a background thread until `shutdown` is notified
pub fn spawn_tray(
    commands: Sender<TrayCommand>,
    ctx: egui::Context,
    shutdown: Arc<tokio::sync::Notify>,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to build Tokio runtime for tray");
                return;
            }
        };

        runtime.block_on(async move {
            let tray = OverlayTray { commands, ctx };
            match tray.spawn().await {
                Ok(handle) => {
                    info!("Tray icon created via ksni/D-Bus");
                    shutdown.notified().await;
                    handle.shutdown().await;
                }
                Err(e) => {
                    error!(error = ?e, "Failed to create tray icon (D-Bus unavailable?)");
                }
            }
        });
    });
}
