//! Drag-to-move for the frameless overlay

use crate::common::types::Position;

/// Left-button drag tracking in global (screen) coordinates
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    anchor: Option<Position>,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    /// Left button pressed at `cursor`
    pub fn press(&mut self, cursor: Position) {
        self.anchor = Some(cursor);
    }

    /// Cursor moved with the left button held.
    ///
    /// Returns the new window position, or `None` when no drag is active.
    pub fn motion(&mut self, cursor: Position, window: Position) -> Option<Position> {
        let anchor = self.anchor?;
        let delta = cursor.delta_from(anchor);
        self.anchor = Some(cursor);
        Some(window.offset_by(delta))
    }

    /// Left button released
    pub fn release(&mut self) {
        self.anchor = None;
    }
}
