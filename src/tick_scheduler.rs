//! Main loop pacing
//!
//! Portable tick pacing without async/await or platform-specific timers.
//! The caller is responsible for sleeping/waiting between ticks.

use embassy_time::{Duration, Instant};

use crate::config::BrightnessLevel;
use crate::controller::Lamp;
use crate::diagnostics::Diagnostics;
use crate::settings::AlarmSource;
use crate::{Clock, OutputDriver};

/// Default tick rate (20 Hz).
///
/// A 30 minute fade over 1023 steps moves one unit every ~1.7 s, so this
/// is plenty for smooth PWM output.
pub const DEFAULT_TICK_RATE: u32 = 20;

/// Default tick period based on the tick rate.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(1000 / DEFAULT_TICK_RATE as u64);

/// Result of a single tick.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// Level written to the output
    pub level: BrightnessLevel,
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Drives a [`Lamp`] from a clock and writes its level to an output.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = TickScheduler::new(lamp, clock, pwm);
///
/// loop {
///     let result = scheduler.tick(Instant::from_millis(uptime_ms()));
///     sleep_ms(result.sleep_duration.as_millis());
/// }
/// ```
pub struct TickScheduler<'a, C, O, A, D, const INTENT_CHANNEL_SIZE: usize>
where
    C: Clock,
    O: OutputDriver,
    A: AlarmSource,
    D: Diagnostics,
{
    lamp: Lamp<'a, A, D, INTENT_CHANNEL_SIZE>,
    clock: C,
    output: O,
    next_tick: Instant,
    period: Duration,
    last_level: Option<BrightnessLevel>,
}

impl<'a, C, O, A, D, const INTENT_CHANNEL_SIZE: usize> TickScheduler<'a, C, O, A, D, INTENT_CHANNEL_SIZE>
where
    C: Clock,
    O: OutputDriver,
    A: AlarmSource,
    D: Diagnostics,
{
    /// Create a scheduler ticking at [`DEFAULT_TICK_RATE`].
    pub fn new(lamp: Lamp<'a, A, D, INTENT_CHANNEL_SIZE>, clock: C, output: O) -> Self {
        Self::with_period(lamp, clock, output, DEFAULT_TICK_PERIOD)
    }

    /// Create a scheduler with a custom tick period.
    pub fn with_period(
        lamp: Lamp<'a, A, D, INTENT_CHANNEL_SIZE>,
        clock: C,
        output: O,
        period: Duration,
    ) -> Self {
        Self {
            lamp,
            clock,
            output,
            next_tick: Instant::from_millis(0),
            period,
            last_level: None,
        }
    }

    /// Run one tick and return timing information.
    ///
    /// Reads the wall clock, advances the lamp and writes the level to the
    /// output whenever it changed. The caller waits until `next_deadline`
    /// before ticking again.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        // More than two periods behind: skip the backlog instead of catching up
        let max_drift = self.period.as_millis() * 2;
        if now.as_millis() > self.next_tick.as_millis() + max_drift {
            self.next_tick = now;
        }

        let level = self.lamp.tick(self.clock.now(), now);
        if self.last_level != Some(level) {
            self.output.write(level);
            self.last_level = Some(level);
        }

        self.next_tick += self.period;

        let sleep_duration = if self.next_tick.as_millis() > now.as_millis() {
            Duration::from_millis(self.next_tick.as_millis() - now.as_millis())
        } else {
            Duration::from_millis(0)
        };

        TickResult {
            level,
            next_deadline: self.next_tick,
            sleep_duration,
        }
    }

    pub fn lamp(&self) -> &Lamp<'a, A, D, INTENT_CHANNEL_SIZE> {
        &self.lamp
    }

    pub fn lamp_mut(&mut self) -> &mut Lamp<'a, A, D, INTENT_CHANNEL_SIZE> {
        &mut self.lamp
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
