use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the clock was created. Drives the ball animation.
    pub elapsed_s: f64,
    /// Time since the previous tick, in seconds, clamped.
    pub dt: f32,
    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Display-refresh clock for the render loop.
///
/// Elapsed time is read straight from the start instant, so the animation
/// never accumulates drift. Delta time only feeds the statistics overlay and
/// is clamped so a stall does not wreck the average.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_max: Duration,
    fps_avg: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_max: Duration::from_millis(250),
            fps_avg: 0.0,
        }
    }

    /// Advances the clock to now.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last).min(self.dt_max);
        self.last = now;

        let dt_s = dt.as_secs_f32();
        if dt_s > 0.0 {
            let fps = 1.0 / dt_s;
            // Exponential moving average; seed with the first sample.
            self.fps_avg = if self.fps_avg == 0.0 {
                fps
            } else {
                self.fps_avg * 0.9 + fps * 0.1
            };
        }

        let ft = FrameTime {
            elapsed_s: now.saturating_duration_since(self.start).as_secs_f64(),
            dt: dt_s,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }

    /// Smoothed frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps_avg
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_measured_from_start() {
        let mut clock = FrameClock::new();
        let t0 = clock.start;
        let ft = clock.tick_at(t0 + Duration::from_millis(1500));
        assert!((ft.elapsed_s - 1.5).abs() < 1e-9);
        assert_eq!(ft.frame_index, 0);
        assert_eq!(clock.tick_at(t0 + Duration::from_millis(1516)).frame_index, 1);
    }

    #[test]
    fn stalls_are_clamped_in_dt_but_not_elapsed() {
        let mut clock = FrameClock::new();
        let t0 = clock.start;
        let ft = clock.tick_at(t0 + Duration::from_secs(10));
        assert!((ft.dt - 0.25).abs() < 1e-6);
        assert!((ft.elapsed_s - 10.0).abs() < 1e-9);
    }

    #[test]
    fn fps_settles_on_steady_frame_rate() {
        let mut clock = FrameClock::new();
        let t0 = clock.start;
        for i in 1..=200u64 {
            clock.tick_at(t0 + Duration::from_micros(i * 16_667));
        }
        assert!((clock.fps() - 60.0).abs() < 0.5, "fps {}", clock.fps());
    }
}
