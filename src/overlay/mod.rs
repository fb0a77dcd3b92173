//! The always-on-top system monitor widget
//!
//! Owns the refresh loop, corner layout, drag handling, the right-click
//! menu, the tray icon and supervision of the settings editor process.

mod app;
mod drag;
mod editor;
mod layout;
mod menu;
mod state;
mod timer;
mod tray;
pub mod utils;

pub use app::run_overlay;
