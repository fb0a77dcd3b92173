//! Corner-anchored widget layout
//!
//! Computes where the overlay sits on screen and where its two labels sit
//! inside it. Pure: the screen geometry is passed in, never cached.

use anyhow::Result;
use tracing::warn;

use crate::common::types::{Dimensions, Position, ScreenGeometry};
use crate::config::{Corner, WidgetConfig};
use crate::constants::layout::{FALLBACK_X, FALLBACK_Y, HEIGHT_SLACK, LABEL_TOP};

/// Inputs that affect geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub corner: Corner,
    pub margin: u32,
    pub width: u32,
    pub label_height: u32,
    /// Measured width of the memory and CPU labels (text plus padding)
    pub label_widths: [u32; 2],
}

impl LayoutParams {
    pub fn from_config(config: &WidgetConfig, label_widths: [u32; 2]) -> Self {
        Self {
            corner: config.corner,
            margin: config.corner_margin,
            width: config.widget_width,
            label_height: config.label_height,
            label_widths,
        }
    }
}

/// Computed placement of the widget and its labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetGeometry {
    pub position: Position,
    pub size: Dimensions,
    /// Offsets of the memory label and the CPU label, relative to the widget
    pub label_offsets: [Position; 2],
}

/// Widget size: two stacked labels plus fixed slack
pub fn widget_size(width: u32, label_height: u32) -> Dimensions {
    let height = (label_height as i64 * 2 + HEIGHT_SLACK as i64).clamp(0, u32::MAX as i64);
    Dimensions::new(width, height as u32)
}

/// Label offsets inside the widget for the given corner
pub fn label_offsets(params: &LayoutParams) -> [Position; 2] {
    let margin = to_i32(params.margin);
    let rows = [LABEL_TOP, to_i32(params.label_height).saturating_add(LABEL_TOP)];

    let x_for = |label_width: u32| match params.corner {
        Corner::TopRight => to_i32(params.width)
            .saturating_sub(to_i32(label_width))
            .saturating_sub(margin),
        Corner::TopLeft => margin,
    };

    [
        Position::new(x_for(params.label_widths[0]), rows[0]),
        Position::new(x_for(params.label_widths[1]), rows[1]),
    ]
}

/// Place the widget in its configured corner of `screen`
pub fn compute_layout(screen: &ScreenGeometry, params: &LayoutParams) -> WidgetGeometry {
    let margin = to_i32(params.margin);
    let width = to_i32(params.width);

    let x = match params.corner {
        Corner::TopRight => screen.right.saturating_sub(width).saturating_sub(margin),
        Corner::TopLeft => screen.left.saturating_add(margin),
    };
    let y = screen.top.saturating_add(margin);

    WidgetGeometry {
        position: Position::new(x.max(screen.left), y.max(screen.top)),
        size: widget_size(params.width, params.label_height),
        label_offsets: label_offsets(params),
    }
}

/// Like [`compute_layout`], tolerating a failed screen query.
///
/// Without a screen the widget goes to the fixed fallback position, laid out
/// as top-left.
pub fn layout_or_fallback(screen: Result<ScreenGeometry>, params: &LayoutParams) -> WidgetGeometry {
    match screen {
        Ok(screen) => compute_layout(&screen, params),
        Err(err) => {
            warn!(error = ?err, "Error querying screen geometry, using fallback position");
            let fallback = LayoutParams {
                corner: Corner::TopLeft,
                ..*params
            };
            WidgetGeometry {
                position: Position::new(FALLBACK_X, FALLBACK_Y),
                size: widget_size(params.width, params.label_height),
                label_offsets: label_offsets(&fallback),
            }
        }
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
