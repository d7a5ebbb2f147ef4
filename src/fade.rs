//! Rate-limited brightness convergence
//!
//! The engine moves the current level toward the target level by one unit
//! per step, where a step is `fade_duration / (max - min)`. It knows
//! nothing about wall-clock time: ticks are driven by a monotonic
//! [`Instant`].

use embassy_time::{Duration, Instant};

use crate::config::{BrightnessLevel, BrightnessRange};

/// Brightness the engine currently outputs and where it is heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeState {
    pub current: BrightnessLevel,
    pub target: BrightnessLevel,
    /// Snap to target on the next tick
    pub fast: bool,
}

/// Time per unit step; at least 1 ms unless `fade_duration` is zero
#[allow(clippy::cast_lossless)]
const fn step_millis(fade_duration: Duration, range: BrightnessRange) -> u64 {
    let total = fade_duration.as_millis();
    let step = total / range.span() as u64;
    if total > 0 && step == 0 { 1 } else { step }
}

/// Fade engine
#[derive(Debug, Clone)]
pub struct FadeEngine {
    state: FadeState,
    range: BrightnessRange,
    /// Time per unit step, zero for instant changes
    step: Duration,
    /// Time the last step was taken, `None` while idle
    last_step: Option<Instant>,
}

impl FadeEngine {
    /// Create an engine resting at `range.min()`
    pub const fn new(range: BrightnessRange, fade_duration: Duration) -> Self {
        Self {
            state: FadeState {
                current: range.min(),
                target: range.min(),
                fast: false,
            },
            range,
            step: Duration::from_millis(step_millis(fade_duration, range)),
            last_step: None,
        }
    }

    pub const fn state(&self) -> FadeState {
        self.state
    }

    pub const fn current(&self) -> BrightnessLevel {
        self.state.current
    }

    pub const fn target(&self) -> BrightnessLevel {
        self.state.target
    }

    pub const fn range(&self) -> BrightnessRange {
        self.range
    }

    /// Duration of a single unit step
    pub const fn step_duration(&self) -> Duration {
        self.step
    }

    /// Check if the current level still has to move
    pub const fn is_fading(&self) -> bool {
        self.state.current != self.state.target
    }

    /// Set a new target, clamped into the range
    pub fn set_target(&mut self, level: BrightnessLevel, fast: bool) {
        self.state.target = self.range.clamp(level);
        self.state.fast = fast;
    }

    /// Start a gradual fade to `max`
    pub fn fade_on(&mut self) {
        self.set_target(self.range.max(), false);
    }

    /// Start a gradual fade to `min`
    pub fn fade_off(&mut self) {
        self.set_target(self.range.min(), false);
    }

    /// Flip the target between `min` and `max` without fading
    pub fn toggle(&mut self) {
        let level = if self.state.target > self.range.min() {
            self.range.min()
        } else {
            self.range.max()
        };
        self.set_target(level, true);
    }

    /// Overwrite both levels at once, skipping any ramp
    pub fn force(&mut self, current: BrightnessLevel, target: BrightnessLevel) {
        self.state.current = self.range.clamp(current);
        self.state.target = self.range.clamp(target);
        self.state.fast = false;
        self.last_step = None;
    }

    /// Advance toward the target and return the current level
    #[allow(clippy::cast_possible_truncation)]
    pub fn tick(&mut self, now: Instant) -> BrightnessLevel {
        if self.state.fast || self.step.as_millis() == 0 {
            self.state.current = self.state.target;
            self.state.fast = false;
            self.last_step = None;
            return self.state.current;
        }

        if !self.is_fading() {
            self.last_step = None;
            return self.state.current;
        }

        let Some(last_step) = self.last_step else {
            self.last_step = Some(now);
            return self.state.current;
        };

        let steps = now.saturating_duration_since(last_step).as_millis() / self.step.as_millis();
        if steps == 0 {
            return self.state.current;
        }

        let current = self.state.current;
        let target = self.state.target;
        let distance = u64::from(current.abs_diff(target));
        // Bounded by `distance`, which fits u16
        let delta = steps.min(distance) as u16;
        self.state.current = if target > current {
            current + delta
        } else {
            current - delta
        };
        // A finished ramp drops its anchor so the next one starts fresh
        self.last_step = if self.state.current == target {
            None
        } else {
            Some(Instant::from_millis(
                last_step.as_millis() + steps * self.step.as_millis(),
            ))
        };

        self.state.current
    }
}
