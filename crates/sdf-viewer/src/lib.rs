// src/lib.rs
//! Raymarched ball field viewer.
//!
//! Draws a field of bouncing spheres over a raymarched background plane whose
//! program is loaded from disk at startup, with a live parameter panel.

pub mod app;
pub mod camera;
pub mod clock;
pub mod config;
pub mod renderer;
pub mod ui;
