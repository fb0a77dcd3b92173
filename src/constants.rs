//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Settings store location
pub mod store {
    /// Organization half of the settings namespace (directory under XDG config)
    pub const ORGANIZATION: &str = "sysmon-overlay";

    /// Application half of the settings namespace (file stem)
    pub const APPLICATION: &str = "SystemMonitorWidget";

    /// Environment variable overriding the settings directory
    pub const CONFIG_DIR_ENV: &str = "SYSMON_OVERLAY_CONFIG_DIR";
}

/// Persisted setting keys
pub mod keys {
    pub const UPDATE_INTERVAL_MS: &str = "update_interval_ms";
    pub const CORNER_MARGIN: &str = "corner_margin";
    pub const WIDGET_WIDTH: &str = "widget_width";
    pub const LABEL_HEIGHT: &str = "label_height";
    pub const LABEL_PADDING: &str = "label_padding";
    pub const TEXT_COLOR: &str = "text_color";
    pub const CORNER: &str = "corner";
}

/// Corner-anchored layout constants
pub mod layout {
    /// Extra height below the two stacked labels
    pub const HEIGHT_SLACK: i32 = 10;

    /// Y offset of the first label inside the widget
    pub const LABEL_TOP: i32 = 5;

    /// Position used when the screen geometry cannot be queried
    pub const FALLBACK_X: i32 = 50;
    pub const FALLBACK_Y: i32 = 50;
}

/// Overlay widget rendering
pub mod overlay {
    /// Label font size in points (converted to pixels by egui)
    pub const FONT_SIZE: f32 = 16.0;

    /// Initial label texts shown before the first sample
    pub const MEM_PLACEHOLDER: &str = "MEM: --%";
    pub const CPU_PLACEHOLDER: &str = "CPU: --%";

    /// Context menu window size
    pub const MENU_WIDTH: f32 = 220.0;
    pub const MENU_HEIGHT: f32 = 300.0;

    /// How often external events (tray, editor, signals) are polled
    pub const EVENT_POLL_INTERVAL_MS: u64 = 250;
}

/// Byte size units
pub mod units {
    pub const KB: u64 = 1024;
    pub const MB: u64 = KB * 1024;
    pub const GB: u64 = MB * 1024;
}

/// Tray icon identity
pub mod tray {
    pub const ID: &str = "sysmon-overlay";
    pub const TITLE: &str = "System Monitor";

    /// Freedesktop icon used when the embedded pixmap fails to decode
    pub const FALLBACK_ICON_NAME: &str = "utilities-system-monitor";
}

/// GUI-specific constants (egui settings window)
pub mod gui {
    use egui;

    /// Settings window dimensions
    pub const WINDOW_WIDTH: f32 = 400.0;
    pub const WINDOW_HEIGHT: f32 = 300.0;

    /// Layout spacing
    pub const ITEM_SPACING: f32 = 8.0;

    /// Preview swatch dimensions
    pub const SWATCH_WIDTH: f32 = 80.0;
    pub const SWATCH_HEIGHT: f32 = 20.0;

    /// Error message color
    pub const COLOR_ERROR: egui::Color32 = egui::Color32::from_rgb(200, 100, 100);
}

/// Default configuration values
/// These are used when a key is missing from the store or cannot be interpreted
pub mod defaults {
    pub const UPDATE_INTERVAL_MS: u32 = 2000;
    pub const CORNER_MARGIN: u32 = 10;
    pub const WIDGET_WIDTH: u32 = 250;
    pub const LABEL_HEIGHT: u32 = 20;
    pub const LABEL_PADDING: u32 = 5;
    pub const TEXT_COLOR: &str = "white";
}
