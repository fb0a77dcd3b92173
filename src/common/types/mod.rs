//! Domain types for type safety and clarity

pub mod geometry;

pub use geometry::{Dimensions, Position, ScreenGeometry};
