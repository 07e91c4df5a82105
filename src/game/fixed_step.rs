//! Deterministic fixed-timestep accumulator (§4.H "Fixed-step loop").
//!
//! Plain data, no bevy dependency, so it is testable in isolation; the app
//! wiring layer (`context::CorePlugin`) drives it from bevy's own
//! `Time<Fixed>` schedule rather than reimplementing the accumulator twice —
//! see `context.rs` for how the two are reconciled.

const DEFAULT_MAX_FRAME_SECONDS: f32 = 0.25;
const DEFAULT_MAX_STEPS_PER_FRAME: u32 = 8;

#[derive(Debug, Clone, Copy)]
pub struct FixedStepLoop {
    dt: f32,
    accumulator: f32,
    sim_time: f32,
    time_scale: f32,
    paused: bool,
    step_once: bool,
    max_steps_per_frame: u32,
    max_frame_seconds: f32,
}

/// Read-only counters for the debug overlay (§3.1 `HudMetrics`), recomputed
/// once per frame from the loop's state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudMetrics {
    pub sim_time_seconds: f32,
    pub tick_hz: f32,
    pub ticks_this_frame: u32,
    pub frame_dt: f32,
    pub clamped_dt: f32,
    pub alpha: f32,
}

impl FixedStepLoop {
    pub fn new(tick_hz: f32) -> Self {
        assert!(tick_hz > 0.0, "tick_hz must be positive");
        Self {
            dt: 1.0 / tick_hz,
            accumulator: 0.0,
            sim_time: 0.0,
            time_scale: 1.0,
            paused: false,
            step_once: false,
            max_steps_per_frame: DEFAULT_MAX_STEPS_PER_FRAME,
            max_frame_seconds: DEFAULT_MAX_FRAME_SECONDS,
        }
    }

    pub fn with_max_steps_per_frame(mut self, max: u32) -> Self {
        self.max_steps_per_frame = max;
        self
    }

    pub fn with_max_frame_seconds(mut self, max: f32) -> Self {
        self.max_frame_seconds = max;
        self
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Requests a single extra tick be run on the next `advance` call even
    /// while paused (§4.H step 3).
    pub fn request_step_once(&mut self) {
        self.step_once = true;
    }

    /// Advances the accumulator by one wall-clock `frame` seconds and invokes
    /// `update(dt)` once per whole step consumed, up to `max_steps_per_frame`.
    /// Returns the metrics snapshot to hand to the renderer alongside
    /// `alpha`, per §4.H steps 1-6.
    pub fn advance(&mut self, frame: f32, mut update: impl FnMut(f32)) -> HudMetrics {
        let clamped = frame.min(self.max_frame_seconds);

        if !self.paused {
            self.accumulator += clamped * self.time_scale;
        } else if self.step_once {
            self.accumulator += self.dt;
        }
        self.step_once = false;

        let mut steps = 0;
        while self.accumulator >= self.dt && steps < self.max_steps_per_frame {
            update(self.dt);
            self.accumulator -= self.dt;
            self.sim_time += self.dt;
            steps += 1;
        }

        HudMetrics {
            sim_time_seconds: self.sim_time,
            tick_hz: 1.0 / self.dt,
            ticks_this_frame: steps,
            frame_dt: frame,
            clamped_dt: clamped,
            alpha: self.accumulator / self.dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_at_60hz_runs_exactly_sixty_ticks() {
        let mut loop_ = FixedStepLoop::new(60.0).with_max_steps_per_frame(120);
        let mut ticks = 0;
        let metrics = loop_.advance(1.0, |_dt| ticks += 1);
        assert_eq!(ticks, 60);
        assert_eq!(metrics.ticks_this_frame, 60);
        assert!(metrics.alpha < 1.0 / 60.0);
    }

    #[test]
    fn spiral_of_death_guard_clamps_huge_frame() {
        let mut loop_ = FixedStepLoop::new(60.0).with_max_frame_seconds(0.25).with_max_steps_per_frame(1000);
        let mut ticks = 0;
        let metrics = loop_.advance(10.0, |_dt| ticks += 1);
        assert_eq!(metrics.clamped_dt, 0.25);
        assert_eq!(ticks, 15);
    }

    #[test]
    fn max_steps_per_frame_caps_catch_up() {
        let mut loop_ = FixedStepLoop::new(60.0).with_max_steps_per_frame(10);
        let mut ticks = 0;
        let metrics = loop_.advance(1.0, |_dt| ticks += 1);
        assert_eq!(ticks, 10);
        assert_eq!(metrics.ticks_this_frame, 10);
        // Leftover accumulator is preserved, not discarded, for the next frame.
        assert!(loop_.accumulator > 0.0);
    }

    #[test]
    fn paused_loop_runs_no_ticks_until_step_once() {
        let mut loop_ = FixedStepLoop::new(60.0);
        loop_.set_paused(true);
        let mut ticks = 0;
        loop_.advance(1.0, |_dt| ticks += 1);
        assert_eq!(ticks, 0);

        loop_.request_step_once();
        loop_.advance(0.0, |_dt| ticks += 1);
        assert_eq!(ticks, 1);

        // The flag is consumed; a further advance without a new request ticks nothing.
        loop_.advance(0.0, |_dt| ticks += 1);
        assert_eq!(ticks, 1);
    }

    #[test]
    fn determinism_same_frame_sequence_yields_same_sim_time() {
        let run = || {
            let mut loop_ = FixedStepLoop::new(60.0);
            let mut log = Vec::new();
            for frame in [0.016, 0.016, 0.033, 0.001, 0.05] {
                loop_.advance(frame, |dt| log.push(dt));
            }
            (loop_.sim_time(), log)
        };
        assert_eq!(run(), run());
    }
}
