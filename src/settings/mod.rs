//! Settings editor process
//!
//! A small egui window that edits a draft of the widget configuration and
//! commits every key to the shared store when applied or closed.

mod app;
mod components;
pub mod draft;

pub use app::run_settings;
