//! UI rendering module for imgdock
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod dock_panel;
pub mod help_overlay;
pub mod image_list;

pub use dock_panel::{measure as measure_dock, render as render_dock};
pub use help_overlay::render as render_help_overlay;
pub use image_list::render as render_image_list;
