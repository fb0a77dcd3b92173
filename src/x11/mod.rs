//! X11 queries
//!
//! Provides the usable screen area the overlay anchors itself to.

mod screen;

pub use screen::{ScreenSource, X11Screen};
