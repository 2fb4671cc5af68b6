// src/lib.rs
//! Scene-to-GPU synchronization for a raymarched field of bouncing balls.
//!
//! This library owns everything that has to stay numerically consistent
//! between the CPU-side animation clock and the uniform set consumed by the
//! raymarching program, without touching a GPU:
//! - deterministic placement and closed-form animation of the balls,
//! - packing of the first N active balls into a fixed-capacity record array,
//! - camera uniforms kept coherent with an orbiting viewpoint,
//! - the two-source readiness gate for pipeline construction,
//! - the parameter command queue applied once per tick.

pub mod animator;
pub mod bridge;
pub mod camera;
pub mod error;
pub mod params;
pub mod scene;
pub mod shader;
pub mod uniforms;

/// Fixed maximum number of balls. Every per-ball array has exactly this length.
pub const MAX_BALLS: usize = 16;

pub use self::error::{SceneError, ShaderLoadError};
pub use self::scene::Scene;
