use glam::Vec3;
use sdf_sync::{
    bridge::Viewport,
    camera::{CameraView, OrbitCamera},
    params::Parameters,
    Scene, MAX_BALLS,
};

fn camera() -> OrbitCamera {
    OrbitCamera::looking_at(Vec3::new(10.0, 0.0, 10.0), Vec3::ZERO, 45.0, 1.0, 1000.0)
}

fn scene() -> Scene {
    Scene::new(MAX_BALLS, 97, 45.0, Parameters::default()).unwrap()
}

#[test]
fn every_active_count_packs_matching_records() {
    let cam = camera();
    for active in 1..=MAX_BALLS {
        let mut scene = scene();
        scene.param_handle().set_active_count(active);
        scene.tick(3.0, &cam);

        let u = scene.uniforms();
        assert_eq!(u.ball_count as usize, active);
        assert_eq!(u.active_records().len(), active);
        for (record, ball) in u.active_records().iter().zip(scene.balls()) {
            assert_eq!(
                *record,
                [ball.position.x, ball.position.y, ball.position.z, ball.scale]
            );
        }
    }
}

#[test]
fn shrinking_and_regrowing_keeps_placement() {
    let cam = camera();
    let mut scene = scene();
    scene.tick(1.0, &cam);
    let placed: Vec<_> = scene.balls().iter().map(|b| (b.position.x, b.position.z, b.scale)).collect();

    let handle = scene.param_handle();
    handle.set_active_count(3);
    scene.tick(1.0, &cam);

    assert_eq!(scene.uniforms().ball_count, 3);
    let visible: Vec<usize> = scene.visible_balls().map(|(i, _)| i).collect();
    assert_eq!(visible, vec![0, 1, 2]);
    for slot in 3..8 {
        assert!(!scene.balls()[slot].visible);
    }

    handle.set_active_count(8);
    scene.tick(1.0, &cam);

    assert_eq!(scene.uniforms().ball_count, 8);
    assert_eq!(scene.visible_balls().count(), 8);
    let again: Vec<_> = scene.balls().iter().map(|b| (b.position.x, b.position.z, b.scale)).collect();
    assert_eq!(placed, again);
}

#[test]
fn tick_depends_only_on_elapsed_time() {
    let cam = camera();
    let mut walked = scene();
    walked.tick(1.0, &cam);
    walked.tick(5.0, &cam);

    let mut direct = scene();
    direct.tick(5.0, &cam);

    assert_eq!(walked.balls(), direct.balls());
    assert_eq!(walked.uniforms().balls, direct.uniforms().balls);
}

#[test]
fn resize_lands_before_the_next_camera_sync() {
    let mut cam = camera();
    let mut scene = scene();

    scene.resize(&mut cam, Viewport::new(800, 600));
    scene.tick(0.0, &cam);
    let before = scene.uniforms().camera_proj_inv;

    scene.resize(&mut cam, Viewport::new(1600, 900));
    let u = scene.uniforms();
    assert_eq!(u.resolution, [1600.0, 900.0]);
    assert_ne!(u.camera_proj_inv, before);
    assert_eq!(u.camera_proj_inv, cam.projection_inverse().to_cols_array_2d());

    scene.tick(0.1, &cam);
    assert_eq!(
        scene.uniforms().camera_proj_inv,
        cam.projection_inverse().to_cols_array_2d()
    );
}

#[test]
fn parameter_changes_reach_uniforms_on_the_next_tick() {
    let cam = camera();
    let mut scene = scene();
    let handle = scene.param_handle();

    handle.set_dot_size(0.55);
    handle.set_smooth_value(0.25);
    handle.set_background_visible(false);
    assert_eq!(scene.uniforms().dot_size, 0.3);

    scene.tick(0.0, &cam);
    assert_eq!(scene.uniforms().dot_size, 0.55);
    assert_eq!(scene.uniforms().smooth_value, 0.25);
    assert!(!scene.params().background_visible);
}

#[test]
fn oversized_scene_is_a_configuration_error() {
    assert!(Scene::new(MAX_BALLS + 1, 0, 45.0, Parameters::default()).is_err());
}
