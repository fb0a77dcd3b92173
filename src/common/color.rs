//! Text color parsing and conversions
//!
//! Stored colors are strings in one of the forms accepted by the settings
//! file and the editor:
//! - a named color (`white`, `red`, `darkgray`, ...)
//! - `#RGB`, `#RRGGBB` (full opacity assumed)
//! - `#AARRGGBB` (explicit alpha)

/// Color in ARGB32 format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(u32);

/// Named colors understood in addition to hex notation
const NAMED_COLORS: &[(&str, u32)] = &[
    ("white", 0xFFFFFF),
    ("black", 0x000000),
    ("red", 0xFF0000),
    ("green", 0x008000),
    ("lime", 0x00FF00),
    ("blue", 0x0000FF),
    ("yellow", 0xFFFF00),
    ("cyan", 0x00FFFF),
    ("magenta", 0xFF00FF),
    ("orange", 0xFFA500),
    ("purple", 0x800080),
    ("pink", 0xFFC0CB),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("darkgray", 0xA9A9A9),
    ("darkgrey", 0xA9A9A9),
    ("lightgray", 0xD3D3D3),
    ("lightgrey", 0xD3D3D3),
];

impl HexColor {
    /// Parse a named color or a hex string (`#` prefix optional)
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(&(_, rgb)) = NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(value))
        {
            return Some(Self(0xFF_00_00_00 | rgb));
        }

        let hex = value.strip_prefix('#').unwrap_or(value);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let digits = u32::from_str_radix(hex, 16).ok();

        match (hex.len(), digits) {
            (3, Some(rgb)) => {
                // #RGB expands each nibble: F80 -> FF8800
                let r = (rgb >> 8) & 0xF;
                let g = (rgb >> 4) & 0xF;
                let b = rgb & 0xF;
                let expand = |v: u32| v << 4 | v;
                Some(Self(
                    0xFF_00_00_00 | expand(r) << 16 | expand(g) << 8 | expand(b),
                ))
            }
            (6, Some(rgb)) => Some(Self(0xFF_00_00_00 | rgb)),
            (8, Some(argb)) => Some(Self(argb)),
            _ => None,
        }
    }

    pub fn to_color32(self) -> egui::Color32 {
        let a = (self.0 >> 24) & 0xFF;
        let r = (self.0 >> 16) & 0xFF;
        let g = (self.0 >> 8) & 0xFF;
        let b = self.0 & 0xFF;
        egui::Color32::from_rgba_unmultiplied(r as u8, g as u8, b as u8, a as u8)
    }
}

/// Resolve a stored color string, falling back to white when it cannot be parsed
pub fn text_color32(value: &str) -> egui::Color32 {
    match HexColor::parse(value) {
        Some(color) => color.to_color32(),
        None => {
            tracing::warn!(color = %value, "Unrecognized text color, using white");
            egui::Color32::WHITE
        }
    }
}

/// Format egui Color32 to a hex string (`#rrggbb`, or `#aarrggbb` with transparency)
pub fn color32_to_hex(color: egui::Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 255 {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", a, r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_parsing() {
        // 8-digit format (AARRGGBB)
        assert_eq!(HexColor::parse("#7FFF0000"), Some(HexColor(0x7FFF0000)));
        assert_eq!(HexColor::parse("FFFFFFFF"), Some(HexColor(0xFFFFFFFF)));

        // 6-digit format (RRGGBB) - should prepend FF for full opacity
        assert_eq!(HexColor::parse("#FF0000"), Some(HexColor(0xFFFF0000)));
        assert_eq!(HexColor::parse("5bfc37"), Some(HexColor(0xFF5BFC37)));

        // 3-digit shorthand
        assert_eq!(HexColor::parse("#f80"), Some(HexColor(0xFFFF8800)));

        // Invalid
        assert_eq!(HexColor::parse("invalid"), None);
        assert_eq!(HexColor::parse(""), None);
        assert_eq!(HexColor::parse("#12345"), None);
        assert_eq!(HexColor::parse("#+12345"), None);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(HexColor::parse("white"), Some(HexColor(0xFFFFFFFF)));
        assert_eq!(HexColor::parse("Black"), Some(HexColor(0xFF000000)));
        assert_eq!(HexColor::parse(" grey "), HexColor::parse("gray"));
    }

    #[test]
    fn test_to_color32() {
        let color = HexColor(0xFF_80_40_20).to_color32();
        assert_eq!(color, egui::Color32::from_rgb(0x80, 0x40, 0x20));
    }

    #[test]
    fn test_text_color_fallback() {
        assert_eq!(text_color32("not-a-color"), egui::Color32::WHITE);
        assert_eq!(text_color32("#00ff00"), egui::Color32::from_rgb(0, 255, 0));
    }

    #[test]
    fn test_color32_to_hex() {
        assert_eq!(color32_to_hex(egui::Color32::from_rgb(255, 0, 128)), "#ff0080");
        let hex = color32_to_hex(egui::Color32::from_rgb(18, 52, 86));
        assert_eq!(HexColor::parse(&hex), Some(HexColor(0xFF123456)));
    }
}
