//! Geometric types for screen coordinates and dimensions
//!
//! Provides type-safe wrappers for positions and sizes to avoid
//! common integer confusion (e.g., swapping width/height or x/y).

/// A position in screen coordinates (may be negative on multi-monitor setups)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by another position interpreted as a delta
    pub fn offset_by(self, delta: Position) -> Self {
        Self {
            x: self.x.saturating_add(delta.x),
            y: self.y.saturating_add(delta.y),
        }
    }

    /// Difference `self - origin`
    pub fn delta_from(self, origin: Position) -> Position {
        Position {
            x: self.x.saturating_sub(origin.x),
            y: self.y.saturating_sub(origin.y),
        }
    }

    /// Physical pixels to egui points
    pub fn to_points(self, pixels_per_point: f32) -> egui::Pos2 {
        egui::pos2(
            self.x as f32 / pixels_per_point,
            self.y as f32 / pixels_per_point,
        )
    }

    /// egui points to physical pixels
    pub fn from_points(pos: egui::Pos2, pixels_per_point: f32) -> Self {
        Self::from_pos2((pos.to_vec2() * pixels_per_point).to_pos2())
    }

    pub fn from_pos2(pos: egui::Pos2) -> Self {
        Self {
            x: pos.x.round() as i32,
            y: pos.y.round() as i32,
        }
    }
}

/// Widget dimensions (width × height)
/// Using a newtype prevents accidentally swapping width and height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn to_vec2(self) -> egui::Vec2 {
        egui::vec2(self.width as f32, self.height as f32)
    }
}

/// Usable display area (excludes panels/taskbars)
///
/// `right` and `bottom` are exclusive edges: a window of width `w` placed at
/// `right - w` touches the right edge exactly. Qt's `QRect::right()` is
/// inclusive (`x + width - 1`), so top-right placement here sits one pixel
/// further right than a Qt widget using the same formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenGeometry {
    pub fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            left: x,
            top: y,
            right: x.saturating_add(width as i32),
            bottom: y.saturating_add(height as i32),
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}
