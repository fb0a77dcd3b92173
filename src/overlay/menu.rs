//! Right-click context menu, shown as a small undecorated viewport at the cursor

use eframe::egui;

use super::state::SettingChange;
use crate::common::color::{color32_to_hex, text_color32};
use crate::common::types::Position;
use crate::config::{Corner, WidgetConfig};
use crate::constants::overlay::{MENU_HEIGHT, MENU_WIDTH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    SetCorner(Corner),
    /// Adjusted in place; the menu stays open
    Change(SettingChange),
    OpenSettings,
    CloseWidget,
}

impl MenuAction {
    /// Whether choosing this action dismisses the menu
    pub fn closes_menu(&self) -> bool {
        !matches!(self, MenuAction::Change(_))
    }
}

#[derive(Debug, Default)]
pub struct ContextMenu {
    open_at: Option<Position>,
    had_focus: bool,
}

impl ContextMenu {
    pub fn open(&mut self, at: Position) {
        self.open_at = Some(at);
        self.had_focus = false;
    }

    pub fn close(&mut self) {
        self.open_at = None;
    }

    pub fn is_open(&self) -> bool {
        self.open_at.is_some()
    }

    /// Draw the menu if open. Closes itself after a choice, on Escape, or
    /// once it loses focus. The open position is in physical pixels.
    pub fn show(&mut self, ctx: &egui::Context, current: &WidgetConfig) -> Option<MenuAction> {
        let at = self.open_at?;

        let builder = egui::ViewportBuilder::default()
            .with_title("Widget Menu")
            .with_decorations(false)
            .with_resizable(false)
            .with_taskbar(false)
            .with_window_level(egui::WindowLevel::AlwaysOnTop)
            .with_position(at.to_points(ctx.pixels_per_point()))
            .with_inner_size([MENU_WIDTH, MENU_HEIGHT]);

        let (action, dismissed) = ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("overlay_context_menu"),
            builder,
            |ctx, _class| {
                let mut action = None;
                egui::CentralPanel::default().show(ctx, |ui| {
                    for corner in Corner::ALL {
                        if ui
                            .add(egui::Button::new(corner.label()).selected(current.corner == corner))
                            .clicked()
                        {
                            action = Some(MenuAction::SetCorner(corner));
                        }
                    }
                    ui.separator();
                    if let Some(change) = adjustments(ui, current) {
                        action = Some(MenuAction::Change(change));
                    }
                    ui.separator();
                    if ui.button("Open Settings").clicked() {
                        action = Some(MenuAction::OpenSettings);
                    }
                    if ui.button("Close Widget").clicked() {
                        action = Some(MenuAction::CloseWidget);
                    }
                });

                let (escape, close_requested, focused) = ctx.input(|i| {
                    (
                        i.key_pressed(egui::Key::Escape),
                        i.viewport().close_requested(),
                        i.viewport().focused,
                    )
                });
                let lost_focus = match focused {
                    Some(true) => {
                        self.had_focus = true;
                        false
                    }
                    Some(false) => self.had_focus,
                    None => false,
                };
                (action, escape || close_requested || lost_focus)
            },
        );

        if action.as_ref().is_some_and(MenuAction::closes_menu) || dismissed {
            self.close();
        }
        action
    }
}

/// Inline editors for the numeric settings and the text color
fn adjustments(ui: &mut egui::Ui, current: &WidgetConfig) -> Option<SettingChange> {
    let mut change = None;
    egui::Grid::new("menu_adjustments")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            let mut width = current.widget_width;
            ui.label("Width:");
            if ui
                .add(egui::DragValue::new(&mut width).range(1..=4000).suffix(" px"))
                .changed()
            {
                change = Some(SettingChange::Width(width));
            }
            ui.end_row();

            let mut margin = current.corner_margin;
            ui.label("Margin:");
            if ui
                .add(egui::DragValue::new(&mut margin).range(0..=1000).suffix(" px"))
                .changed()
            {
                change = Some(SettingChange::Margin(margin));
            }
            ui.end_row();

            let mut height = current.label_height;
            ui.label("Label height:");
            if ui
                .add(egui::DragValue::new(&mut height).range(1..=500).suffix(" px"))
                .changed()
            {
                change = Some(SettingChange::LabelHeight(height));
            }
            ui.end_row();

            let mut padding = current.label_padding;
            ui.label("Label padding:");
            if ui
                .add(egui::DragValue::new(&mut padding).range(0..=200).suffix(" px"))
                .changed()
            {
                change = Some(SettingChange::LabelPadding(padding));
            }
            ui.end_row();

            let mut interval = current.update_interval_ms;
            ui.label("Interval:");
            if ui
                .add(
                    egui::DragValue::new(&mut interval)
                        .range(100..=600_000)
                        .speed(50)
                        .suffix(" ms"),
                )
                .changed()
            {
                change = Some(SettingChange::IntervalMs(interval));
            }
            ui.end_row();

            let mut color = text_color32(&current.text_color);
            ui.label("Text color:");
            if ui.color_edit_button_srgba(&mut color).changed() {
                change = Some(SettingChange::TextColor(color32_to_hex(color)));
            }
            ui.end_row();
        });
    change
}
