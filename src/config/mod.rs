//! Configuration management
//!
//! A flat key/value store shared by the widget and the settings editor
//! process, and the typed widget configuration read from it.

pub mod settings;
pub mod store;

pub use settings::{Corner, WidgetConfig};
pub use store::{Namespace, SettingsStore};
