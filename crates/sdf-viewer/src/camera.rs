use sdf_sync::camera::OrbitCamera;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 200.0;
const MAX_ELEVATION_DEG: f32 = 89.0;
const ORBIT_SPEED: f32 = 0.005;

/// Mouse orbit and wheel zoom around the camera target.
pub struct CameraController {
    mouse_down: bool,
    last_mouse: Option<(f64, f64)>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    /// Creates a new controller with default state.
    pub fn new() -> Self {
        Self {
            mouse_down: false,
            last_mouse: None,
        }
    }

    /// Handles window events and updates the camera.
    pub fn handle_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                if *button == MouseButton::Left {
                    self.mouse_down = *state == ElementState::Pressed;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_orbit((position.x, position.y), camera);
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_mouse = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };

                self.handle_scroll(scroll, camera);
            }
            _ => {}
        }
    }

    /// Positive delta = scroll up = zoom in = smaller radius.
    fn handle_scroll(&mut self, delta: f32, camera: &mut OrbitCamera) {
        let zoom = 1.1_f32.powf(-delta);
        camera.radius = (camera.radius * zoom).clamp(MIN_RADIUS, MAX_RADIUS);
        camera.update();
    }

    /// Rotates the camera around the target while the left mouse button is held.
    fn handle_cursor_orbit(&mut self, xy: (f64, f64), camera: &mut OrbitCamera) {
        if let Some(last) = self.last_mouse {
            if self.mouse_down {
                let dx = (xy.0 - last.0) as f32 * ORBIT_SPEED;
                let dy = (xy.1 - last.1) as f32 * ORBIT_SPEED;

                camera.azimuth_rad -= dx;
                camera.elevation_rad += dy;

                // Stop short of the poles so the up vector stays defined.
                let limit = MAX_ELEVATION_DEG.to_radians();
                camera.elevation_rad = camera.elevation_rad.clamp(-limit, limit);

                camera.update();
            }
        }
        self.last_mouse = Some(xy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use sdf_sync::camera::CameraView;

    fn camera() -> OrbitCamera {
        OrbitCamera::looking_at(Vec3::new(10.0, 0.0, 10.0), Vec3::ZERO, 45.0, 1.0, 1000.0)
    }

    #[test]
    fn scrolling_zooms_within_limits() {
        let mut ctl = CameraController::new();
        let mut cam = camera();
        let start = cam.radius;

        ctl.handle_scroll(1.0, &mut cam);
        assert!(cam.radius < start);
        assert!((cam.position().length() - cam.radius).abs() < 1e-3);

        ctl.handle_scroll(-1000.0, &mut cam);
        assert_eq!(cam.radius, MAX_RADIUS);
        ctl.handle_scroll(1000.0, &mut cam);
        assert_eq!(cam.radius, MIN_RADIUS);
    }

    #[test]
    fn dragging_orbits_and_clamps_elevation() {
        let mut ctl = CameraController::new();
        let mut cam = camera();
        let az = cam.azimuth_rad;

        ctl.mouse_down = true;
        ctl.handle_cursor_orbit((100.0, 100.0), &mut cam);
        ctl.handle_cursor_orbit((140.0, 100.0), &mut cam);
        assert!(cam.azimuth_rad < az);

        ctl.handle_cursor_orbit((140.0, 100_000.0), &mut cam);
        assert!((cam.elevation_rad - MAX_ELEVATION_DEG.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn moving_without_button_does_nothing() {
        let mut ctl = CameraController::new();
        let mut cam = camera();
        let before = cam.position();
        ctl.handle_cursor_orbit((0.0, 0.0), &mut cam);
        ctl.handle_cursor_orbit((300.0, 300.0), &mut cam);
        assert_eq!(cam.position(), before);
    }
}
