//! Widget configuration record and its (de)serialization to the store
//!
//! Loading never fails: every field is coerced from whatever the store holds,
//! falling back to [`WidgetConfig::default`] per field.

use anyhow::Result;
use serde_json::Value;
use std::fmt;
use tracing::warn;

use super::store::SettingsStore;
use crate::constants::{defaults, keys};

/// Screen corner the widget is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
}

impl Corner {
    pub const ALL: [Corner; 2] = [Corner::TopLeft, Corner::TopRight];

    /// Strict parse of the stored representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top-left" => Some(Corner::TopLeft),
            "top-right" => Some(Corner::TopRight),
            _ => None,
        }
    }

    /// Lenient parse: anything unrecognized becomes top-left with a warning
    pub fn from_setting(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            warn!(corner = %value, "Invalid corner setting, defaulting to top-left");
            Corner::TopLeft
        })
    }

    /// Stored representation
    pub fn as_str(self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
        }
    }

    /// Menu/combo label
    pub fn label(self) -> &'static str {
        match self {
            Corner::TopLeft => "Top-Left",
            Corner::TopRight => "Top-Right",
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted widget configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub update_interval_ms: u32,
    pub corner_margin: u32,
    pub widget_width: u32,
    pub label_height: u32,
    pub label_padding: u32,
    /// Named color or hex string, kept exactly as the user entered it
    pub text_color: String,
    pub corner: Corner,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: defaults::UPDATE_INTERVAL_MS,
            corner_margin: defaults::CORNER_MARGIN,
            widget_width: defaults::WIDGET_WIDTH,
            label_height: defaults::LABEL_HEIGHT,
            label_padding: defaults::LABEL_PADDING,
            text_color: defaults::TEXT_COLOR.to_string(),
            corner: Corner::default(),
        }
    }
}

impl WidgetConfig {
    /// Read every field from the store, coercing to the expected shapes
    pub fn load(store: &SettingsStore, defaults: &WidgetConfig) -> Self {
        let corner = match store.value(keys::CORNER) {
            Some(Value::String(s)) => Corner::from_setting(s),
            Some(other) => Corner::from_setting(&other.to_string()),
            None => defaults.corner,
        };

        let text_color = match store.value(keys::TEXT_COLOR) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(other) => {
                warn!(value = %other, "Invalid text color setting, using default");
                defaults.text_color.clone()
            }
            None => defaults.text_color.clone(),
        };

        Self {
            update_interval_ms: positive_field(
                store,
                keys::UPDATE_INTERVAL_MS,
                defaults.update_interval_ms,
            ),
            corner_margin: non_negative_field(store, keys::CORNER_MARGIN, defaults.corner_margin),
            widget_width: positive_field(store, keys::WIDGET_WIDTH, defaults.widget_width),
            label_height: positive_field(store, keys::LABEL_HEIGHT, defaults.label_height),
            label_padding: non_negative_field(store, keys::LABEL_PADDING, defaults.label_padding),
            text_color,
            corner,
        }
    }

    fn entries(&self) -> [(&'static str, Value); 7] {
        [
            (keys::UPDATE_INTERVAL_MS, self.update_interval_ms.into()),
            (keys::CORNER_MARGIN, self.corner_margin.into()),
            (keys::WIDGET_WIDTH, self.widget_width.into()),
            (keys::LABEL_HEIGHT, self.label_height.into()),
            (keys::LABEL_PADDING, self.label_padding.into()),
            (keys::TEXT_COLOR, self.text_color.clone().into()),
            (keys::CORNER, self.corner.as_str().into()),
        ]
    }

    /// Stage changed fields in the store (caller decides when to `sync`)
    pub fn write_to(&self, store: &mut SettingsStore) -> Result<()> {
        for (key, value) in self.entries() {
            store.set(key, value)?;
        }
        Ok(())
    }

    /// Stage every field, replacing whatever is on disk at the next `sync`
    pub fn overwrite(&self, store: &mut SettingsStore) -> Result<()> {
        for (key, value) in self.entries() {
            store.set_forced(key, value)?;
        }
        Ok(())
    }
}

/// Interpret a stored JSON value as a non-negative integer.
///
/// Integers are used as-is, floats truncate, numeric strings are parsed and
/// negatives clamp to zero. `None` means the value is not numeric at all.
pub fn coerce_non_negative(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n
            .as_i64()
            .map(|v| v as f64)
            .or_else(|| n.as_u64().map(|v| v as f64))
            .or_else(|| n.as_f64())?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.trunc().clamp(0.0, u32::MAX as f64) as u32)
}

fn non_negative_field(store: &SettingsStore, key: &str, default: u32) -> u32 {
    match store.value(key) {
        Some(value) => coerce_non_negative(value).unwrap_or_else(|| {
            warn!(key, value = %value, "Non-numeric setting, using default");
            default
        }),
        None => default,
    }
}

fn positive_field(store: &SettingsStore, key: &str, default: u32) -> u32 {
    match non_negative_field(store, key, default) {
        0 => {
            warn!(key, "Setting must be greater than zero, using default");
            default
        }
        value => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn store_with(contents: Value) -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, contents.to_string()).unwrap();
        let store = SettingsStore::open(&path).unwrap();
        (dir, store)
    }

    #[test]
    fn test_corner_parsing() {
        assert_eq!(Corner::parse("top-left"), Some(Corner::TopLeft));
        assert_eq!(Corner::parse("top-right"), Some(Corner::TopRight));
        assert_eq!(Corner::parse("Top-Right"), None);
        assert_eq!(Corner::from_setting("bottom-left"), Corner::TopLeft);
        assert_eq!(Corner::from_setting(""), Corner::TopLeft);
        for corner in Corner::ALL {
            assert_eq!(Corner::parse(corner.as_str()), Some(corner));
        }
    }

    /// Log sink shared between the test and a scoped subscriber
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
            let sink = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || sink.clone())
                .with_ansi(false)
                .finish();
            tracing::subscriber::with_default(subscriber, f)
        }

        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_invalid_corner_logs_warning() {
        let logs = CapturedLogs::default();
        let corner = logs.capture(|| Corner::from_setting("bottom-left"));
        assert_eq!(corner, Corner::TopLeft);

        let text = logs.text();
        assert!(text.contains("WARN"), "no warning in {text:?}");
        assert!(text.contains("Invalid corner setting"));
        assert!(text.contains("bottom-left"));

        let quiet = CapturedLogs::default();
        assert_eq!(
            quiet.capture(|| Corner::from_setting("top-right")),
            Corner::TopRight
        );
        assert!(quiet.text().is_empty());
    }

    #[test]
    fn test_empty_store_yields_defaults() {
        let (_dir, store) = store_with(json!({}));
        let config = WidgetConfig::load(&store, &WidgetConfig::default());
        assert_eq!(config, WidgetConfig::default());
        assert_eq!(config.update_interval_ms, 2000);
        assert_eq!(config.corner_margin, 10);
        assert_eq!(config.widget_width, 250);
        assert_eq!(config.label_height, 20);
        assert_eq!(config.label_padding, 5);
        assert_eq!(config.text_color, "white");
        assert_eq!(config.corner, Corner::TopLeft);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce_non_negative(&json!(12)), Some(12));
        assert_eq!(coerce_non_negative(&json!(12.9)), Some(12));
        assert_eq!(coerce_non_negative(&json!("40")), Some(40));
        assert_eq!(coerce_non_negative(&json!(" 7.5 ")), Some(7));
        assert_eq!(coerce_non_negative(&json!(-3)), Some(0));
        assert_eq!(coerce_non_negative(&json!("abc")), None);
        assert_eq!(coerce_non_negative(&json!(true)), None);
        assert_eq!(coerce_non_negative(&json!(null)), None);
    }

    #[test]
    fn test_load_coerces_stored_values() {
        let (_dir, store) = store_with(json!({
            "update_interval_ms": "500",
            "corner_margin": -4,
            "widget_width": 0,
            "label_height": 18.6,
            "label_padding": "lots",
            "text_color": "#ff8800",
            "corner": "top-right",
        }));
        let config = WidgetConfig::load(&store, &WidgetConfig::default());
        assert_eq!(config.update_interval_ms, 500);
        assert_eq!(config.corner_margin, 0);
        // zero width is not allowed, default wins
        assert_eq!(config.widget_width, 250);
        assert_eq!(config.label_height, 18);
        assert_eq!(config.label_padding, 5);
        assert_eq!(config.text_color, "#ff8800");
        assert_eq!(config.corner, Corner::TopRight);
    }

    #[test]
    fn test_invalid_corner_falls_back() {
        let (_dir, store) = store_with(json!({ "corner": "bottom-right" }));
        let config = WidgetConfig::load(&store, &WidgetConfig::default());
        assert_eq!(config.corner, Corner::TopLeft);

        let (_dir, store) = store_with(json!({ "corner": 3 }));
        let config = WidgetConfig::load(&store, &WidgetConfig::default());
        assert_eq!(config.corner, Corner::TopLeft);
    }

    #[test]
    fn test_write_then_load() {
        let (_dir, mut store) = store_with(json!({}));
        let config = WidgetConfig {
            update_interval_ms: 750,
            corner_margin: 0,
            widget_width: 320,
            label_height: 24,
            label_padding: 2,
            text_color: "cyan".to_string(),
            corner: Corner::TopRight,
        };
        config.write_to(&mut store).unwrap();
        store.sync().unwrap();

        let reopened = SettingsStore::open(store.path()).unwrap();
        assert_eq!(reopened.value("corner"), Some(&json!("top-right")));
        assert_eq!(
            WidgetConfig::load(&reopened, &WidgetConfig::default()),
            config
        );
    }

    #[test]
    fn test_custom_defaults_are_honored() {
        let (_dir, store) = store_with(json!({}));
        let defaults = WidgetConfig {
            corner: Corner::TopRight,
            widget_width: 180,
            ..WidgetConfig::default()
        };
        let config = WidgetConfig::load(&store, &defaults);
        assert_eq!(config.corner, Corner::TopRight);
        assert_eq!(config.widget_width, 180);
    }
}
