//! Shared helpers used by both the overlay widget and the settings editor

pub mod color;
pub mod debug;
pub mod format;
pub mod ipc;
pub mod signals;
pub mod types;
