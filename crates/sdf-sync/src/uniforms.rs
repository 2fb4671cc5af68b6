//! The uniform set consumed by the raymarching program.

use crate::{animator::Ball, MAX_BALLS};

/// xyz = ball position, w = ball scale.
pub type BallRecord = [f32; 4];

/// Value every record holds before its slot is first written.
pub const INERT_RECORD: BallRecord = [0.0, 0.0, 0.0, 1.0];

/// Scene uniforms, respecting WGSL uniform layout.
/// Must match `SceneUniforms` in [`wgsl_preamble`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    /// Camera-to-world transform.
    pub camera_world: [[f32; 4]; 4], // 64 B
    /// Inverse of the camera projection.
    pub camera_proj_inv: [[f32; 4]; 4], // +64 -> 128
    /// Camera position in world space.
    pub camera_position: [f32; 3], // +12
    /// Vertical field of view in degrees.
    pub fov: f32, // +4 -> 144
    /// Viewport size in physical pixels.
    pub resolution: [f32; 2], // +8
    /// Number of leading records the program may read.
    pub ball_count: u32, // +4
    pub dot_size: f32, // +4 -> 160
    pub smooth_value: f32, // +4
    pub _pad0: [f32; 3], // +12 -> 176 (array<vec4> aligns to 16)
    pub balls: [BallRecord; MAX_BALLS], // +256 -> 432
}

// Compile‑time safety check: buffer size must match WGSL‑reflected size.
const _: [(); 432] = [(); core::mem::size_of::<SceneUniforms>()];

impl SceneUniforms {
    /// Uniforms with identity camera matrices and every record inert.
    pub fn new(fov: f32, ball_count: u32, dot_size: f32, smooth_value: f32) -> Self {
        let identity = glam::Mat4::IDENTITY.to_cols_array_2d();
        Self {
            camera_world: identity,
            camera_proj_inv: identity,
            camera_position: [0.0; 3],
            fov,
            resolution: [1.0, 1.0],
            ball_count,
            dot_size,
            smooth_value,
            _pad0: [0.0; 3],
            balls: [INERT_RECORD; MAX_BALLS],
        }
    }

    /// Copies position and scale of the first `active` balls into their records.
    ///
    /// Slots at or beyond `active` keep whatever they last held; the program
    /// bounds its loop by `ball_count` and never reads them.
    pub fn pack_balls(&mut self, balls: &[Ball], active: usize) {
        let count = active.min(balls.len()).min(MAX_BALLS);
        for (record, ball) in self.balls[..count].iter_mut().zip(balls) {
            *record = [ball.position.x, ball.position.y, ball.position.z, ball.scale];
        }
    }

    /// The leading records the program is allowed to read.
    pub fn active_records(&self) -> &[BallRecord] {
        &self.balls[..(self.ball_count as usize).min(MAX_BALLS)]
    }
}

/// WGSL declarations prepended to the fragment program so that the array
/// length and field layout always follow [`SceneUniforms`].
pub fn wgsl_preamble() -> String {
    format!(
        r#"const MAX_BALLS: u32 = {max}u;

struct SceneUniforms {{
    camera_world: mat4x4<f32>,
    camera_proj_inv: mat4x4<f32>,
    camera_position: vec3<f32>,
    fov: f32,
    resolution: vec2<f32>,
    ball_count: u32,
    dot_size: f32,
    smooth_value: f32,
    balls: array<vec4<f32>, {max}>,
}};
@group(0) @binding(0) var<uniform> U: SceneUniforms;

"#,
        max = MAX_BALLS
    )
}
