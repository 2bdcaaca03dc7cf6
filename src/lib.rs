//! imgdock library
//!
//! The image cache, the floating dock geometry, and the terminal viewer built
//! on them. Exposed as a library for the binary and integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dock;
pub mod fetcher;
pub mod loader;
pub mod logging;
pub mod ui;
