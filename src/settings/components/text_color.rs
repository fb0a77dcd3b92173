//! Text Color tab: picker, hex entry and preview swatch

use eframe::egui;

use crate::common::color::{HexColor, color32_to_hex};
use crate::constants::gui::{ITEM_SPACING, SWATCH_HEIGHT, SWATCH_WIDTH};
use crate::settings::draft::SettingsDraft;

/// Renders the color settings and returns true if the color was edited
pub fn ui(ui: &mut egui::Ui, draft: &mut SettingsDraft) -> bool {
    let mut changed = false;
    let parsed = HexColor::parse(draft.text_color.trim()).map(HexColor::to_color32);

    ui.horizontal(|ui| {
        ui.label("Select Text Color:");
        let mut color = parsed.unwrap_or(egui::Color32::WHITE);
        if egui::color_picker::color_edit_button_srgba(
            ui,
            &mut color,
            egui::color_picker::Alpha::Opaque,
        )
        .changed()
        {
            draft.text_color = color32_to_hex(color);
            changed = true;
        }
    });

    ui.add_space(ITEM_SPACING);

    ui.horizontal(|ui| {
        ui.label("Color:");
        if ui.text_edit_singleline(&mut draft.text_color).changed() {
            changed = true;
        }
    });
    ui.label(
        egui::RichText::new("Name (e.g. white) or hex (#RRGGBB, #AARRGGBB)")
            .small()
            .weak(),
    );

    ui.add_space(ITEM_SPACING);

    ui.horizontal(|ui| {
        ui.label("Preview:");
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(SWATCH_WIDTH, SWATCH_HEIGHT),
            egui::Sense::hover(),
        );
        // invalid text shows an empty swatch
        let fill = parsed.unwrap_or(ui.visuals().extreme_bg_color);
        ui.painter().rect_filled(rect, 0.0, fill);
    });

    changed
}
