//! Deterministic placement and closed-form animation of the balls.

use crate::{error::SceneError, MAX_BALLS};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Full edge length of the placement cube; positions land in `[-2, 2)`.
pub const POSITION_SPAN: f32 = 4.0;
/// Multiplier applied to the `[0.5, 1.5)` scale draw.
pub const SIZE_SCALE: f32 = 1.0;
/// Per-phase contribution to the oscillation rate.
pub const PHASE_RATE: f64 = 0.3;
/// Base oscillation rate shared by every ball.
pub const BASE_RATE: f64 = 0.2;
/// Peak vertical displacement.
pub const AMPLITUDE: f64 = 3.0;

/// One animated ball, addressed by its slot index in the animator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub position: Vec3,
    /// Uniform scale on all axes.
    pub scale: f32,
    /// Whether the instanced sphere for this slot is drawn.
    pub visible: bool,
    phase: f32,
}

impl Ball {
    /// Initial y-coordinate, fixed at placement.
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Vertical position at `elapsed_s` seconds.
    #[inline]
    pub fn height_at(&self, elapsed_s: f64) -> f32 {
        let phase = self.phase as f64;
        ((phase + elapsed_s * (phase * PHASE_RATE + BASE_RATE)).sin() * AMPLITUDE) as f32
    }
}

/// Owns a fixed set of balls. Slots are never inserted, removed or reordered.
#[derive(Debug, Clone)]
pub struct EntityAnimator {
    balls: Box<[Ball]>,
}

impl EntityAnimator {
    /// Places `capacity` balls from a ChaCha8 stream seeded with `seed`.
    ///
    /// Each ball draws four values in order: x, y, z, then size. All balls
    /// start visible.
    pub fn new(capacity: usize, seed: u64) -> Result<Self, SceneError> {
        if capacity > MAX_BALLS {
            return Err(SceneError::CapacityExceeded {
                requested: capacity,
                max: MAX_BALLS,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut centered = move || rng.gen::<f32>() - 0.5;

        let balls = (0..capacity)
            .map(|_| {
                let position = Vec3::new(
                    centered() * POSITION_SPAN,
                    centered() * POSITION_SPAN,
                    centered() * POSITION_SPAN,
                );
                let scale = (centered() + 1.0) * SIZE_SCALE;

                Ball {
                    position,
                    scale,
                    visible: true,
                    phase: position.y,
                }
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        log::debug!("Placed {} balls with seed {}", capacity, seed);

        Ok(Self { balls })
    }

    /// Recomputes every ball's height from `elapsed_s` alone.
    pub fn tick(&mut self, elapsed_s: f64) {
        for ball in self.balls.iter_mut() {
            ball.position.y = ball.height_at(elapsed_s);
        }
    }

    /// Shows slots below `active` and hides the rest.
    pub fn set_visible_count(&mut self, active: usize) {
        for (i, ball) in self.balls.iter_mut().enumerate() {
            ball.visible = i < active;
        }
    }

    #[inline]
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.balls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Visible balls with their slot index, in slot order.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &Ball)> {
        self.balls.iter().enumerate().filter(|(_, b)| b.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_places_identically() {
        let a = EntityAnimator::new(MAX_BALLS, 97).unwrap();
        let b = EntityAnimator::new(MAX_BALLS, 97).unwrap();
        assert_eq!(a.balls(), b.balls());

        let c = EntityAnimator::new(MAX_BALLS, 98).unwrap();
        assert_ne!(a.balls(), c.balls());
    }

    #[test]
    fn placement_stays_inside_bounds() {
        for seed in 0..32 {
            let animator = EntityAnimator::new(MAX_BALLS, seed).unwrap();
            for ball in animator.balls() {
                for c in ball.position.to_array() {
                    assert!((-2.0..2.0).contains(&c), "coordinate {c} out of cube");
                }
                assert!((0.5..=1.5).contains(&ball.scale), "scale {}", ball.scale);
                assert_eq!(ball.phase(), ball.position.y);
            }
        }
    }

    #[test]
    fn smaller_capacity_is_a_prefix_of_the_full_set() {
        let full = EntityAnimator::new(MAX_BALLS, 7).unwrap();
        let part = EntityAnimator::new(5, 7).unwrap();
        assert_eq!(part.len(), 5);
        assert_eq!(part.balls(), &full.balls()[..5]);
    }

    #[test]
    fn capacity_above_max_is_rejected() {
        let err = EntityAnimator::new(MAX_BALLS + 1, 0).unwrap_err();
        assert!(matches!(
            err,
            SceneError::CapacityExceeded { requested: 17, max: 16 }
        ));
    }

    #[test]
    fn tick_has_no_memory_of_previous_calls() {
        let mut walked = EntityAnimator::new(MAX_BALLS, 97).unwrap();
        walked.tick(1.0);
        walked.tick(3.25);
        walked.tick(5.0);

        let mut direct = EntityAnimator::new(MAX_BALLS, 97).unwrap();
        direct.tick(5.0);

        assert_eq!(walked.balls(), direct.balls());
    }

    #[test]
    fn tick_moves_only_height_and_respects_amplitude() {
        let before = EntityAnimator::new(MAX_BALLS, 3).unwrap();
        let mut after = before.clone();
        after.tick(12.5);

        for (b, a) in before.balls().iter().zip(after.balls()) {
            assert_eq!(a.position.x, b.position.x);
            assert_eq!(a.position.z, b.position.z);
            assert_eq!(a.scale, b.scale);
            assert_eq!(a.phase(), b.phase());
            assert!(a.position.y.abs() <= AMPLITUDE as f32);
        }
    }

    #[test]
    fn height_matches_closed_form() {
        let mut animator = EntityAnimator::new(1, 11).unwrap();
        let phase = animator.balls()[0].phase() as f64;
        let t = 2.5;
        animator.tick(t);

        let expected = ((phase + t * (phase * 0.3 + 0.2)).sin() * 3.0) as f32;
        assert_eq!(animator.balls()[0].position.y, expected);
    }

    #[test]
    fn visibility_follows_visible_count() {
        let mut animator = EntityAnimator::new(MAX_BALLS, 1).unwrap();
        animator.set_visible_count(3);
        let shown: Vec<usize> = animator.visible().map(|(i, _)| i).collect();
        assert_eq!(shown, vec![0, 1, 2]);

        animator.set_visible_count(MAX_BALLS);
        assert_eq!(animator.visible().count(), MAX_BALLS);
    }
}
