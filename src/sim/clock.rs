//! Session clock: frame deltas, slow motion and pause
//!
//! The clock samples wall-clock time once per frame and produces two deltas:
//! the clamped real delta (presentation) and the scaled delta (gameplay).
//! Slow motion eases the time scale toward its target; pausing snaps it.

use serde::Serialize;

use crate::consts::MAX_DELTA;
use crate::tuning::SlowMoTuning;

#[derive(Debug, Clone, Serialize)]
pub struct Clock {
    /// Wall-clock time of the previous sample (seconds)
    last_sample: Option<f64>,
    raw_delta: f32,
    delta: f32,
    scaled_delta: f32,
    time_scale: f32,
    target_time_scale: f32,
    slow_mo: bool,
    paused: bool,
    /// Accumulated scaled (game) time in seconds
    elapsed: f64,
    slow_mo_scale: f32,
    transition_speed: f32,
}

impl Clock {
    pub fn new(tuning: &SlowMoTuning) -> Self {
        Self {
            last_sample: None,
            raw_delta: 0.0,
            delta: 0.0,
            scaled_delta: 0.0,
            time_scale: 1.0,
            target_time_scale: 1.0,
            slow_mo: false,
            paused: false,
            elapsed: 0.0,
            slow_mo_scale: tuning.time_scale.clamp(0.0, 1.0),
            transition_speed: tuning.transition_speed,
        }
    }

    /// Set the reference sample without producing a delta
    pub fn start(&mut self, now: f64) {
        self.last_sample = Some(now);
    }

    /// Sample wall-clock time (seconds) and recompute this frame's deltas.
    ///
    /// The first sample, and a clock that went backwards, yield a zero delta.
    pub fn advance(&mut self, now: f64) {
        let raw = match self.last_sample {
            Some(last) => ((now - last) as f32).max(0.0),
            None => 0.0,
        };
        self.last_sample = Some(now);
        self.step(raw);
    }

    /// Advance by an explicit raw delta (seconds)
    pub fn step(&mut self, raw_delta: f32) {
        let raw_delta = if raw_delta.is_finite() {
            raw_delta.max(0.0)
        } else {
            0.0
        };
        self.raw_delta = raw_delta;
        self.delta = raw_delta.min(MAX_DELTA);

        if self.time_scale != self.target_time_scale {
            let diff = self.target_time_scale - self.time_scale;
            let change = diff.signum() * self.transition_speed * self.delta;
            if diff.abs() <= change.abs() {
                self.time_scale = self.target_time_scale;
            } else {
                self.time_scale += change;
            }
        }
        self.time_scale = self.time_scale.clamp(0.0, 1.0);

        self.scaled_delta = self.delta * self.time_scale;
        self.elapsed += self.scaled_delta as f64;
    }

    pub fn toggle_slow_mo(&mut self) {
        self.set_slow_mo(!self.slow_mo);
    }

    /// Change the slow-motion target; the current scale eases toward it
    pub fn set_slow_mo(&mut self, active: bool) {
        self.slow_mo = active;
        if !self.paused {
            self.target_time_scale = self.running_scale();
        }
    }

    /// Hard pause: target and current scale both drop to zero immediately
    pub fn pause(&mut self) {
        self.paused = true;
        self.target_time_scale = 0.0;
        self.time_scale = 0.0;
        self.scaled_delta = 0.0;
    }

    /// Ease back to normal or slow-motion speed, whichever was active
    pub fn resume(&mut self) {
        self.paused = false;
        self.target_time_scale = self.running_scale();
    }

    fn running_scale(&self) -> f32 {
        if self.slow_mo { self.slow_mo_scale } else { 1.0 }
    }

    /// Unclamped time since the previous sample
    pub fn raw_delta(&self) -> f32 {
        self.raw_delta
    }

    /// Clamped real delta, for presentation-only animation
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Gameplay delta
    pub fn scaled_delta(&self) -> f32 {
        self.scaled_delta
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn target_time_scale(&self) -> f32 {
        self.target_time_scale
    }

    pub fn is_slow_mo(&self) -> bool {
        self.slow_mo
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Total game time (sum of scaled deltas)
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}
