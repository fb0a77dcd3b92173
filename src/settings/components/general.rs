//! General tab: numeric fields and corner selection

use eframe::egui;

use crate::config::Corner;
use crate::constants::gui::ITEM_SPACING;
use crate::settings::draft::SettingsDraft;

/// Renders the general settings and returns true if anything was edited
pub fn ui(ui: &mut egui::Ui, draft: &mut SettingsDraft) -> bool {
    let mut changed = false;

    egui::Grid::new("general_settings")
        .num_columns(2)
        .spacing([ITEM_SPACING * 2.0, ITEM_SPACING])
        .show(ui, |ui| {
            let fields = [
                ("Update Interval (ms):", &mut draft.update_interval_ms),
                ("Corner Margin (pixels):", &mut draft.corner_margin),
                ("Widget Width (pixels):", &mut draft.widget_width),
                ("Label Height (pixels):", &mut draft.label_height),
                ("Label Padding (pixels):", &mut draft.label_padding),
            ];
            for (label, value) in fields {
                ui.label(label);
                if ui.text_edit_singleline(value).changed() {
                    changed = true;
                }
                ui.end_row();
            }

            ui.label("Widget Corner:");
            egui::ComboBox::from_id_salt("widget_corner")
                .selected_text(draft.corner.label())
                .show_ui(ui, |ui| {
                    for corner in Corner::ALL {
                        if ui
                            .selectable_value(&mut draft.corner, corner, corner.label())
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });
            ui.end_row();
        });

    changed
}
