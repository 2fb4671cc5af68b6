//! Live parameters and the command queue that applies them once per tick.

use crate::{animator::EntityAnimator, uniforms::SceneUniforms};
use crossbeam_channel::{Receiver, Sender};

pub const DEFAULT_ACTIVE_COUNT: usize = 8;
pub const DEFAULT_DOT_SIZE: f32 = 0.3;
pub const DEFAULT_SMOOTH_VALUE: f32 = 0.8;

/// Externally tunable scene parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    /// Draw the raymarched background plane.
    pub background_visible: bool,
    /// Leading balls that are drawn and synchronized, in `[1, capacity]`.
    pub active_count: usize,
    /// In `[0, 1]`.
    pub dot_size: f32,
    /// In `[0, 1]`.
    pub smooth_value: f32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            background_visible: true,
            active_count: DEFAULT_ACTIVE_COUNT,
            dot_size: DEFAULT_DOT_SIZE,
            smooth_value: DEFAULT_SMOOTH_VALUE,
        }
    }
}

/// A single already-clamped parameter change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamCommand {
    SetBackgroundVisible(bool),
    SetActiveCount(usize),
    SetDotSize(f32),
    SetSmoothValue(f32),
}

/// Cloneable sending side of the parameter queue. Every setter clamps its
/// value into range before it is queued.
#[derive(Debug, Clone)]
pub struct ParamHandle {
    tx: Sender<ParamCommand>,
    max_active: usize,
}

impl ParamHandle {
    pub fn set_background_visible(&self, visible: bool) {
        self.send(ParamCommand::SetBackgroundVisible(visible));
    }

    pub fn set_active_count(&self, count: usize) {
        self.send(ParamCommand::SetActiveCount(count.clamp(1, self.max_active)));
    }

    pub fn set_dot_size(&self, size: f32) {
        if let Some(v) = unit_interval(size) {
            self.send(ParamCommand::SetDotSize(v));
        }
    }

    pub fn set_smooth_value(&self, value: f32) {
        if let Some(v) = unit_interval(value) {
            self.send(ParamCommand::SetSmoothValue(v));
        }
    }

    /// Upper bound accepted by [`Self::set_active_count`].
    pub fn max_active(&self) -> usize {
        self.max_active
    }

    fn send(&self, cmd: ParamCommand) {
        // The receiver lives as long as the scene; a send after teardown is moot.
        if self.tx.send(cmd).is_err() {
            log::debug!("Parameter queue closed, dropping {:?}", cmd);
        }
    }
}

fn unit_interval(v: f32) -> Option<f32> {
    if v.is_nan() {
        log::warn!("Ignoring NaN parameter value");
        return None;
    }
    Some(v.clamp(0.0, 1.0))
}

/// Owns the current parameters and the receiving side of the queue.
#[derive(Debug)]
pub struct ParamController {
    params: Parameters,
    tx: Sender<ParamCommand>,
    rx: Receiver<ParamCommand>,
    max_active: usize,
}

impl ParamController {
    /// `max_active` must be at least 1; initial values are clamped like any
    /// other change.
    pub fn new(initial: Parameters, max_active: usize) -> Self {
        let max_active = max_active.max(1);
        let (tx, rx) = crossbeam_channel::unbounded();
        let params = Parameters {
            background_visible: initial.background_visible,
            active_count: initial.active_count.clamp(1, max_active),
            dot_size: unit_interval(initial.dot_size).unwrap_or(DEFAULT_DOT_SIZE),
            smooth_value: unit_interval(initial.smooth_value).unwrap_or(DEFAULT_SMOOTH_VALUE),
        };

        Self {
            params,
            tx,
            rx,
            max_active,
        }
    }

    pub fn handle(&self) -> ParamHandle {
        ParamHandle {
            tx: self.tx.clone(),
            max_active: self.max_active,
        }
    }

    #[inline]
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Writes the current parameters into the uniforms and ball visibility.
    pub fn apply_all(&self, animator: &mut EntityAnimator, uniforms: &mut SceneUniforms) {
        animator.set_visible_count(self.params.active_count);
        uniforms.ball_count = self.params.active_count as u32;
        uniforms.dot_size = self.params.dot_size;
        uniforms.smooth_value = self.params.smooth_value;
    }

    /// Drains every queued command. Later commands overwrite earlier ones.
    /// Returns the number applied.
    pub fn apply_pending(
        &mut self,
        animator: &mut EntityAnimator,
        uniforms: &mut SceneUniforms,
    ) -> usize {
        let mut applied = 0;
        while let Ok(cmd) = self.rx.try_recv() {
            log::debug!("Applying {:?}", cmd);
            match cmd {
                ParamCommand::SetBackgroundVisible(visible) => {
                    self.params.background_visible = visible;
                }
                ParamCommand::SetActiveCount(count) => {
                    // Count and visibility change together, inside one drain.
                    self.params.active_count = count;
                    uniforms.ball_count = count as u32;
                    animator.set_visible_count(count);
                }
                ParamCommand::SetDotSize(size) => {
                    self.params.dot_size = size;
                    uniforms.dot_size = size;
                }
                ParamCommand::SetSmoothValue(value) => {
                    self.params.smooth_value = value;
                    uniforms.smooth_value = value;
                }
            }
            applied += 1;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_BALLS;

    fn setup() -> (ParamController, EntityAnimator, SceneUniforms) {
        let ctl = ParamController::new(Parameters::default(), MAX_BALLS);
        let mut animator = EntityAnimator::new(MAX_BALLS, 97).unwrap();
        let mut u = SceneUniforms::new(45.0, 0, 0.0, 0.0);
        ctl.apply_all(&mut animator, &mut u);
        (ctl, animator, u)
    }

    #[test]
    fn defaults_are_written_up_front() {
        let (_, animator, u) = setup();
        assert_eq!(u.ball_count, 8);
        assert_eq!(u.dot_size, 0.3);
        assert_eq!(u.smooth_value, 0.8);
        assert_eq!(animator.visible().count(), 8);
    }

    #[test]
    fn commands_wait_for_the_drain() {
        let (mut ctl, mut animator, mut u) = setup();
        let handle = ctl.handle();
        handle.set_active_count(3);
        assert_eq!(u.ball_count, 8);

        assert_eq!(ctl.apply_pending(&mut animator, &mut u), 1);
        assert_eq!(u.ball_count, 3);
        assert_eq!(animator.visible().count(), 3);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let (mut ctl, mut animator, mut u) = setup();
        let handle = ctl.handle();
        handle.set_active_count(0);
        handle.set_dot_size(1.7);
        handle.set_smooth_value(-2.0);
        ctl.apply_pending(&mut animator, &mut u);

        assert_eq!(ctl.params().active_count, 1);
        assert_eq!(u.dot_size, 1.0);
        assert_eq!(u.smooth_value, 0.0);

        handle.set_active_count(40);
        ctl.apply_pending(&mut animator, &mut u);
        assert_eq!(u.ball_count, MAX_BALLS as u32);
    }

    #[test]
    fn nan_values_are_dropped() {
        let (mut ctl, mut animator, mut u) = setup();
        ctl.handle().set_dot_size(f32::NAN);
        assert_eq!(ctl.apply_pending(&mut animator, &mut u), 0);
        assert_eq!(u.dot_size, 0.3);
    }

    #[test]
    fn latest_value_wins() {
        let (mut ctl, mut animator, mut u) = setup();
        let handle = ctl.handle();
        handle.set_smooth_value(0.1);
        handle.set_smooth_value(0.6);
        ctl.apply_pending(&mut animator, &mut u);
        assert_eq!(u.smooth_value, 0.6);
    }

    #[test]
    fn background_toggle_touches_no_uniforms() {
        let (mut ctl, mut animator, mut u) = setup();
        let before = u;
        ctl.handle().set_background_visible(false);
        ctl.apply_pending(&mut animator, &mut u);
        assert!(!ctl.params().background_visible);
        assert_eq!(u, before);
    }

    #[test]
    fn initial_values_are_clamped_to_capacity() {
        let initial = Parameters {
            active_count: 12,
            ..Parameters::default()
        };
        let ctl = ParamController::new(initial, 4);
        assert_eq!(ctl.params().active_count, 4);
        assert_eq!(ctl.handle().max_active(), 4);
    }
}
