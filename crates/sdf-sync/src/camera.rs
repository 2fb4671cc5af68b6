use glam::{Mat4, Vec3};

/// Read/write access the camera bridge needs from a camera.
///
/// The orbit camera below implements it; tests and alternative controllers
/// can provide their own.
pub trait CameraView {
    /// Camera-to-world transform.
    fn world_matrix(&self) -> Mat4;
    /// Inverse of the current projection.
    fn projection_inverse(&self) -> Mat4;
    /// Camera position in world space.
    fn position(&self) -> Vec3;
    /// Vertical field of view in degrees.
    fn fov_deg(&self) -> f32;
    /// Sets the aspect ratio and recomputes the projection.
    fn set_aspect(&mut self, aspect: f32);
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    // --- Orbital Parameters (Primary State) ---
    /// The world point the camera orbits around.
    pub target: Vec3,
    /// Distance from the camera to the target.
    pub radius: f32,
    /// Azimuth angle around the world Y axis (radians).
    pub azimuth_rad: f32,
    /// Elevation angle above the XZ plane (radians).
    pub elevation_rad: f32,

    // --- Projection Parameters ---
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,

    // --- Derived (Updated by `update()` / `set_aspect()`) ---
    position: Vec3,
    proj: Mat4,
    proj_inv: Mat4,
}

impl OrbitCamera {
    /// Creates a camera at `position` looking at `target`.
    pub fn looking_at(position: Vec3, target: Vec3, fov_deg: f32, near: f32, far: f32) -> Self {
        let offset = position - target;
        let radius = offset.length().max(f32::EPSILON);
        let elevation_rad = (offset.y / radius).clamp(-1.0, 1.0).asin();
        let azimuth_rad = offset.x.atan2(offset.z);

        let mut camera = Self {
            target,
            radius,
            azimuth_rad,
            elevation_rad,
            fov_deg,
            near,
            far,
            aspect: 1.0,
            position: Vec3::ZERO, // placeholder
            proj: Mat4::IDENTITY, // placeholder
            proj_inv: Mat4::IDENTITY,
        };

        camera.update();
        camera.update_projection();
        camera
    }

    /// Recalculates the position from the orbital parameters. Must be called
    /// after any orbital parameter changes.
    pub fn update(&mut self) {
        let (sin_az, cos_az) = self.azimuth_rad.sin_cos();
        let (sin_el, cos_el) = self.elevation_rad.sin_cos();
        let offset = Vec3::new(
            self.radius * cos_el * sin_az,
            self.radius * sin_el,
            self.radius * cos_el * cos_az,
        );
        self.position = self.target + offset;
    }

    fn update_projection(&mut self) {
        // wgpu clip space: depth in [0, 1], right-handed view.
        self.proj = Mat4::perspective_rh(
            self.fov_deg.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        self.proj_inv = self.proj.inverse();
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn proj(&self) -> Mat4 {
        self.proj
    }

    /// World-to-camera transform.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view()
    }
}

impl CameraView for OrbitCamera {
    fn world_matrix(&self) -> Mat4 {
        self.view().inverse()
    }

    fn projection_inverse(&self) -> Mat4 {
        self.proj_inv
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn looking_at_round_trips_position() {
        let cam = OrbitCamera::looking_at(Vec3::new(10.0, 0.0, 10.0), Vec3::ZERO, 45.0, 1.0, 1000.0);
        assert!(close(cam.position(), Vec3::new(10.0, 0.0, 10.0)));
        assert!((cam.radius - 200f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn world_matrix_places_camera_at_position() {
        let mut cam = OrbitCamera::looking_at(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, 45.0, 1.0, 1000.0);
        cam.azimuth_rad += 0.4;
        cam.update();
        let origin = cam.world_matrix().transform_point3(Vec3::ZERO);
        assert!(close(origin, cam.position()));
    }

    #[test]
    fn set_aspect_changes_inverse_projection() {
        let mut cam = OrbitCamera::looking_at(Vec3::new(10.0, 0.0, 10.0), Vec3::ZERO, 45.0, 1.0, 1000.0);
        cam.set_aspect(800.0 / 600.0);
        let before = cam.projection_inverse();
        cam.set_aspect(1600.0 / 900.0);
        assert_ne!(before, cam.projection_inverse());
        assert!((cam.proj() * cam.projection_inverse()).abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
