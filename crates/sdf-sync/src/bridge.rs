//! Keeps camera uniforms coherent with the live viewpoint.

use crate::{camera::CameraView, uniforms::SceneUniforms};

/// Viewport dimensions in physical pixels, with the pixel ratio they were
/// derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    /// A viewport already expressed in physical pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    /// Converts a logical size to physical pixels using `scale_factor`.
    pub fn from_logical(width: f64, height: f64, scale_factor: f64) -> Self {
        Self {
            width: (width * scale_factor).round() as u32,
            height: (height * scale_factor).round() as u32,
            scale_factor,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Default)]
pub struct CameraBridge {
    viewport: Option<Viewport>,
}

impl CameraBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last viewport accepted by [`Self::on_resize`].
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Copies the per-frame camera state. The controller may move the camera
    /// between any two ticks, so nothing here is cached.
    pub fn sync_per_frame<C: CameraView>(&self, camera: &C, uniforms: &mut SceneUniforms) {
        uniforms.camera_world = camera.world_matrix().to_cols_array_2d();
        uniforms.camera_proj_inv = camera.projection_inverse().to_cols_array_2d();
        uniforms.camera_position = camera.position().to_array();
        uniforms.fov = camera.fov_deg();
    }

    /// Recomputes the aspect ratio and projection for a new viewport and
    /// writes the resolution and inverse projection straight away.
    ///
    /// Zero-sized viewports (minimised windows) are ignored. Returns whether
    /// the viewport was applied.
    pub fn on_resize<C: CameraView>(
        &mut self,
        camera: &mut C,
        viewport: Viewport,
        uniforms: &mut SceneUniforms,
    ) -> bool {
        if viewport.is_empty() {
            log::debug!("Ignoring empty viewport {}x{}", viewport.width, viewport.height);
            return false;
        }

        if self.viewport != Some(viewport) {
            log::info!(
                "Viewport resized to {}x{} (scale {:.2})",
                viewport.width,
                viewport.height,
                viewport.scale_factor
            );
        }

        camera.set_aspect(viewport.aspect());
        uniforms.resolution = [viewport.width as f32, viewport.height as f32];
        uniforms.camera_proj_inv = camera.projection_inverse().to_cols_array_2d();
        self.viewport = Some(viewport);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;
    use glam::Vec3;

    fn camera() -> OrbitCamera {
        OrbitCamera::looking_at(Vec3::new(10.0, 0.0, 10.0), Vec3::ZERO, 45.0, 1.0, 1000.0)
    }

    #[test]
    fn per_frame_sync_follows_camera_motion() {
        let bridge = CameraBridge::new();
        let mut cam = camera();
        let mut u = SceneUniforms::new(45.0, 8, 0.3, 0.8);

        bridge.sync_per_frame(&cam, &mut u);
        assert_eq!(u.camera_position, cam.position().to_array());
        let first_world = u.camera_world;

        cam.azimuth_rad += 0.5;
        cam.update();
        bridge.sync_per_frame(&cam, &mut u);

        assert_eq!(u.camera_position, cam.position().to_array());
        assert_ne!(u.camera_world, first_world);
        assert_eq!(u.camera_world, cam.world_matrix().to_cols_array_2d());
        assert_eq!(u.fov, 45.0);
    }

    #[test]
    fn resize_updates_resolution_and_inverse_projection() {
        let mut bridge = CameraBridge::new();
        let mut cam = camera();
        let mut u = SceneUniforms::new(45.0, 8, 0.3, 0.8);

        assert!(bridge.on_resize(&mut cam, Viewport::new(800, 600), &mut u));
        let before = u.camera_proj_inv;

        assert!(bridge.on_resize(&mut cam, Viewport::new(1600, 900), &mut u));
        assert_eq!(u.resolution, [1600.0, 900.0]);
        assert_ne!(u.camera_proj_inv, before);
        assert_eq!(u.camera_proj_inv, cam.projection_inverse().to_cols_array_2d());
        assert!((cam.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn redundant_resize_is_idempotent() {
        let mut bridge = CameraBridge::new();
        let mut cam = camera();
        let mut u = SceneUniforms::new(45.0, 8, 0.3, 0.8);

        bridge.on_resize(&mut cam, Viewport::new(1024, 768), &mut u);
        let once = u;
        bridge.on_resize(&mut cam, Viewport::new(1024, 768), &mut u);
        assert_eq!(u, once);
    }

    #[test]
    fn empty_viewport_is_ignored() {
        let mut bridge = CameraBridge::new();
        let mut cam = camera();
        let mut u = SceneUniforms::new(45.0, 8, 0.3, 0.8);

        bridge.on_resize(&mut cam, Viewport::new(640, 480), &mut u);
        assert!(!bridge.on_resize(&mut cam, Viewport::new(0, 480), &mut u));
        assert_eq!(u.resolution, [640.0, 480.0]);
        assert_eq!(bridge.viewport(), Some(Viewport::new(640, 480)));
    }

    #[test]
    fn logical_sizes_scale_to_physical_pixels() {
        let vp = Viewport::from_logical(800.0, 600.0, 2.0);
        assert_eq!((vp.width, vp.height), (1600, 1200));
    }
}
