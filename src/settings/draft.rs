//! Editable copy of the widget configuration
//!
//! Numeric fields stay as the raw text the user typed until commit, so a
//! half-typed value never reaches the store.

use anyhow::Result;
use thiserror::Error;
use tracing::info;

use crate::common::color::HexColor;
use crate::config::{Corner, SettingsStore, WidgetConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a whole number")]
    NotANumber { field: &'static str },
    #[error("{field} cannot be negative")]
    Negative { field: &'static str },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} is too large")]
    TooLarge { field: &'static str },
    #[error("\"{value}\" is not a valid color")]
    InvalidColor { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDraft {
    pub update_interval_ms: String,
    pub corner_margin: String,
    pub widget_width: String,
    pub label_height: String,
    pub label_padding: String,
    pub text_color: String,
    pub corner: Corner,
}

impl SettingsDraft {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            update_interval_ms: config.update_interval_ms.to_string(),
            corner_margin: config.corner_margin.to_string(),
            widget_width: config.widget_width.to_string(),
            label_height: config.label_height.to_string(),
            label_padding: config.label_padding.to_string(),
            text_color: config.text_color.clone(),
            corner: config.corner,
        }
    }

    /// Check every field, reporting the first invalid one
    pub fn validate(&self) -> Result<WidgetConfig, ValidationError> {
        let text_color = self.text_color.trim();
        if HexColor::parse(text_color).is_none() {
            return Err(ValidationError::InvalidColor {
                value: self.text_color.clone(),
            });
        }

        Ok(WidgetConfig {
            update_interval_ms: parse_field(&self.update_interval_ms, "Update interval", true)?,
            corner_margin: parse_field(&self.corner_margin, "Corner margin", false)?,
            widget_width: parse_field(&self.widget_width, "Widget width", true)?,
            label_height: parse_field(&self.label_height, "Label height", true)?,
            label_padding: parse_field(&self.label_padding, "Label padding", false)?,
            text_color: text_color.to_string(),
            corner: self.corner,
        })
    }

    /// Validate, write every key and flush the store
    pub fn commit(&self, store: &mut SettingsStore) -> Result<WidgetConfig> {
        let config = self.validate()?;
        config.overwrite(store)?;
        store.sync()?;
        info!(path = %store.path().display(), ?config, "Settings committed");
        Ok(config)
    }
}

fn parse_field(text: &str, field: &'static str, positive: bool) -> Result<u32, ValidationError> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber { field })?;
    if value < 0 {
        return Err(ValidationError::Negative { field });
    }
    if positive && value == 0 {
        return Err(ValidationError::Zero { field });
    }
    u32::try_from(value).map_err(|_| ValidationError::TooLarge { field })
}
