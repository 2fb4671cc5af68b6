//! One tick of scene-to-uniform synchronization.

use crate::{
    animator::{Ball, EntityAnimator},
    bridge::{CameraBridge, Viewport},
    camera::CameraView,
    error::SceneError,
    params::{ParamController, ParamHandle, Parameters},
    uniforms::SceneUniforms,
};

/// The balls, their packed records, camera uniforms and live parameters.
#[derive(Debug)]
pub struct Scene {
    animator: EntityAnimator,
    uniforms: SceneUniforms,
    bridge: CameraBridge,
    params: ParamController,
}

impl Scene {
    /// Places `capacity` balls from `seed` and writes `initial` parameters.
    pub fn new(
        capacity: usize,
        seed: u64,
        fov_deg: f32,
        initial: Parameters,
    ) -> Result<Self, SceneError> {
        let mut animator = EntityAnimator::new(capacity, seed)?;
        if animator.is_empty() {
            return Err(SceneError::Empty);
        }

        let params = ParamController::new(initial, capacity);
        let p = params.params();
        let mut uniforms =
            SceneUniforms::new(fov_deg, p.active_count as u32, p.dot_size, p.smooth_value);
        params.apply_all(&mut animator, &mut uniforms);

        Ok(Self {
            animator,
            uniforms,
            bridge: CameraBridge::new(),
            params,
        })
    }

    /// Sending side for the parameter panel.
    pub fn param_handle(&self) -> ParamHandle {
        self.params.handle()
    }

    /// Advances the scene to `elapsed_s` seconds since start.
    ///
    /// Order: queued parameter changes, ball heights, ball records, camera.
    pub fn tick<C: CameraView>(&mut self, elapsed_s: f64, camera: &C) {
        self.params.apply_pending(&mut self.animator, &mut self.uniforms);
        self.animator.tick(elapsed_s);
        let active = self.params.params().active_count;
        self.uniforms.pack_balls(self.animator.balls(), active);
        self.bridge.sync_per_frame(camera, &mut self.uniforms);
    }

    /// Applies a viewport change. Takes effect for the very next draw.
    pub fn resize<C: CameraView>(&mut self, camera: &mut C, viewport: Viewport) -> bool {
        self.bridge.on_resize(camera, viewport, &mut self.uniforms)
    }

    #[inline]
    pub fn uniforms(&self) -> &SceneUniforms {
        &self.uniforms
    }

    #[inline]
    pub fn balls(&self) -> &[Ball] {
        self.animator.balls()
    }

    /// Visible balls with their slot index.
    pub fn visible_balls(&self) -> impl Iterator<Item = (usize, &Ball)> {
        self.animator.visible()
    }

    #[inline]
    pub fn params(&self) -> &Parameters {
        self.params.params()
    }

    #[inline]
    pub fn viewport(&self) -> Option<Viewport> {
        self.bridge.viewport()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{camera::OrbitCamera, MAX_BALLS};
    use glam::Vec3;

    #[test]
    fn zero_capacity_is_rejected() {
        let err = Scene::new(0, 1, 45.0, Parameters::default()).unwrap_err();
        assert!(matches!(err, SceneError::Empty));
    }

    #[test]
    fn tick_packs_only_active_slots() {
        let cam = OrbitCamera::looking_at(Vec3::new(10.0, 0.0, 10.0), Vec3::ZERO, 45.0, 1.0, 1000.0);
        let mut scene = Scene::new(MAX_BALLS, 97, 45.0, Parameters::default()).unwrap();

        scene.tick(0.5, &cam);
        let u = scene.uniforms();
        assert_eq!(u.ball_count, 8);
        for (i, ball) in scene.balls().iter().enumerate().take(8) {
            assert_eq!(u.balls[i][1], ball.position.y);
            assert_eq!(u.balls[i][3], ball.scale);
        }
        assert!(u.balls[8..].iter().all(|r| *r == crate::uniforms::INERT_RECORD));
    }
}
