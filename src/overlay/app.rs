//! Overlay widget implemented with egui/eframe and ksni system tray support

use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use eframe::{NativeOptions, egui};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use super::editor::{EditorEvent, EditorProcess};
use super::menu::{ContextMenu, MenuAction};
use super::state::{SettingChange, WidgetState};
use super::tray::{TrayCommand, spawn_tray};
use crate::common::signals::SignalFlags;
use crate::common::types::{Dimensions, Position};
use crate::config::{SettingsStore, WidgetConfig};
use crate::constants::overlay::{EVENT_POLL_INTERVAL_MS, FONT_SIZE};
use crate::stats::SystemSampler;
use crate::x11::X11Screen;

/// Window properties last sent to the compositor
#[derive(Debug, Default)]
struct AppliedWindow {
    position: Option<Position>,
    size: Option<Dimensions>,
    visible: Option<bool>,
}

struct OverlayApp {
    state: WidgetState,
    menu: ContextMenu,
    editor: Option<EditorProcess>,
    signals: SignalFlags,
    tray_rx: mpsc::Receiver<TrayCommand>,
    tray_shutdown: Arc<Notify>,
    applied: AppliedWindow,
}

impl OverlayApp {
    fn new(cc: &eframe::CreationContext<'_>, state: WidgetState, signals: SignalFlags) -> Self {
        info!("Initializing overlay widget");

        let (tray_tx, tray_rx) = mpsc::channel();
        let tray_shutdown = Arc::new(Notify::new());
        spawn_tray(tray_tx, cc.egui_ctx.clone(), tray_shutdown.clone());

        Self {
            state,
            menu: ContextMenu::default(),
            editor: None,
            signals,
            tray_rx,
            tray_shutdown,
            applied: AppliedWindow::default(),
        }
    }

    fn quit(&mut self, ctx: &egui::Context) {
        info!("Quit requested");
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn open_settings(&mut self) {
        if let Some(editor) = &self.editor {
            info!(pid = editor.pid(), "Settings editor already open, ignoring request");
            return;
        }
        match EditorProcess::spawn(self.state.store_path()) {
            Ok(editor) => self.editor = Some(editor),
            Err(err) => error!(error = ?err, "Failed to open settings editor"),
        }
    }

    fn handle_signals(&mut self, ctx: &egui::Context, now: Instant) {
        if self.signals.take_reload() {
            info!("SIGHUP received, reloading settings");
            self.state.reload_settings(now);
        }
        if self.signals.take_quit() {
            self.quit(ctx);
        }
    }

    fn handle_tray(&mut self, ctx: &egui::Context) {
        while let Ok(command) = self.tray_rx.try_recv() {
            debug!(?command, "Tray command");
            match command {
                TrayCommand::Show => self.state.set_visible(true),
                TrayCommand::Hide => self.state.set_visible(false),
                TrayCommand::Toggle => self.state.toggle_visible(),
                TrayCommand::Quit => self.quit(ctx),
            }
        }
    }

    fn poll_editor(&mut self, now: Instant) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        for event in editor.poll() {
            match event {
                EditorEvent::Committed => {
                    info!("Settings editor committed, reloading settings");
                    self.state.reload_settings(now);
                }
                EditorEvent::Failed(message) => {
                    warn!(%message, "Settings editor reported a failure");
                }
                EditorEvent::Exited(_) => {
                    self.state.reload_settings(now);
                    self.editor = None;
                    break;
                }
            }
        }
    }

    /// Pointer position in global pixels
    fn global_pointer(&self, ctx: &egui::Context) -> Option<Position> {
        let ppp = ctx.pixels_per_point();
        let (local, outer) =
            ctx.input(|i| (i.pointer.interact_pos(), i.viewport().outer_rect));
        let local = local?;
        let origin = match outer {
            Some(rect) => Position::from_points(rect.min, ppp),
            None => self.state.position(),
        };
        Some(origin.offset_by(Position::from_points(local, ppp)))
    }

    fn handle_pointer(&mut self, ctx: &egui::Context) {
        let (pressed, down, released, secondary) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.pointer.secondary_clicked(),
            )
        });
        let cursor = self.global_pointer(ctx);

        if pressed && let Some(cursor) = cursor {
            self.menu.close();
            self.state.drag_press(cursor);
        } else if down
            && self.state.is_dragging()
            && let Some(cursor) = cursor
        {
            self.state.drag_motion(cursor);
        }
        if released {
            self.state.drag_release();
        }
        if secondary && let Some(cursor) = cursor {
            self.menu.open(cursor);
        }
    }

    fn handle_menu(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(action) = self.menu.show(ctx, self.state.config()) else {
            return;
        };
        match action {
            MenuAction::SetCorner(corner) => {
                if let Err(err) = self.state.apply_change(SettingChange::Corner(corner), now) {
                    error!(error = ?err, "Failed to save corner");
                }
            }
            MenuAction::Change(change) => {
                if let Err(err) = self.state.apply_change(change, now) {
                    error!(error = ?err, "Failed to apply widget setting");
                }
            }
            MenuAction::OpenSettings => self.open_settings(),
            MenuAction::CloseWidget => self.quit(ctx),
        }
    }

    fn render_labels(&mut self, ctx: &egui::Context) {
        let color = self.state.text_color();
        let padding = self.state.config().label_padding as f32;
        let label_height = self.state.config().label_height as f32;
        let font = egui::FontId::proportional(FONT_SIZE);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let painter = ui.painter();
                let galleys = self
                    .state
                    .labels()
                    .map(|text| painter.layout_no_wrap(text.to_string(), font.clone(), color));

                self.state.set_label_widths(
                    galleys
                        .each_ref()
                        .map(|g| (g.size().x + 2.0 * padding).ceil() as u32),
                );

                let offsets = self.state.label_offsets();
                for (galley, offset) in galleys.into_iter().zip(offsets) {
                    let y = offset.y as f32 + ((label_height - galley.size().y) / 2.0).max(0.0);
                    let pos = egui::pos2(offset.x as f32 + padding, y);
                    painter.galley(pos, galley, color);
                }
            });
    }

    fn apply_window(&mut self, ctx: &egui::Context) {
        let ppp = ctx.pixels_per_point();

        let position = self.state.position();
        if self.applied.position != Some(position) {
            ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(
                position.to_points(ppp),
            ));
            self.applied.position = Some(position);
        }

        let size = self.state.size();
        if self.applied.size != Some(size) {
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(size.to_vec2()));
            self.applied.size = Some(size);
        }

        let visible = self.state.is_visible();
        if self.applied.visible != Some(visible) {
            debug!(visible, "Changing widget visibility");
            ctx.send_viewport_cmd(egui::ViewportCommand::Visible(visible));
            self.applied.visible = Some(visible);
        }
    }
}

impl eframe::App for OverlayApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.handle_signals(ctx, now);
        self.handle_tray(ctx);
        self.poll_editor(now);
        self.state.poll_timer(now);

        self.handle_pointer(ctx);
        self.render_labels(ctx);
        self.handle_menu(ctx, now);
        self.apply_window(ctx);

        let wait = self
            .state
            .time_until_tick(Instant::now())
            .min(Duration::from_millis(EVENT_POLL_INTERVAL_MS));
        ctx.request_repaint_after(wait);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(editor) = self.editor.take() {
            editor.terminate();
        }

        self.tray_shutdown.notify_one();
        info!("Signaled tray thread to shutdown");

        info!("Overlay exiting");
    }
}

pub fn run_overlay(store_path: PathBuf) -> Result<()> {
    let signals = SignalFlags::register()?;

    let store = SettingsStore::open_or_empty(store_path);
    info!(path = %store.path().display(), "Using settings file");

    let state = WidgetState::new(
        store,
        WidgetConfig::default(),
        Box::new(X11Screen),
        Box::new(SystemSampler::new()),
        Instant::now(),
    );
    let size = state.size();

    let viewport_builder = egui::ViewportBuilder::default()
        .with_title("System Monitor")
        .with_decorations(false)
        .with_transparent(true)
        .with_resizable(false)
        .with_taskbar(false)
        .with_active(false)
        .with_window_level(egui::WindowLevel::AlwaysOnTop)
        // position is physical; apply_window places it once the scale is known
        .with_inner_size(size.to_vec2());

    let options = NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    eframe::run_native(
        "System Monitor",
        options,
        Box::new(move |cc| Ok(Box::new(OverlayApp::new(cc, state, signals)))),
    )
    .map_err(|err| anyhow!("Failed to launch overlay widget: {err}"))
}
