#![no_std]

pub mod calendar;
pub mod config;
pub mod controller;
pub mod curve;
pub mod diagnostics;
pub mod fade;
pub mod intent;
pub mod scheduler;
pub mod settings;
pub mod solar;
pub mod tick_scheduler;
pub mod timer;

pub use calendar::{CalendarDate, DayOrdinal, day_of_year, day_of_year_at, is_leap_year};
pub use config::{BrightnessLevel, BrightnessRange, DaylightConfig, FadeTimings, LampMode};
pub use controller::Lamp;
pub use diagnostics::{Diagnostics, DiagnosticsLog};
pub use fade::{FadeEngine, FadeState};
pub use intent::{IntentChannel, IntentQueueFull, IntentReceiver, IntentSender, LampIntent};
pub use scheduler::{DayPlan, FadeScheduler, FadeWindow, Recovery, RescheduleReport};
pub use settings::{AlarmOverride, AlarmSource};
pub use solar::{SolarMinutes, SolarTable};
pub use tick_scheduler::{TickResult, TickScheduler};
pub use timer::{ArmError, ScheduledTransition, TimerQueue, TransitionAction, TransitionTimer};

pub use chrono::{NaiveDate, NaiveDateTime};
pub use embassy_time::{Duration, Instant};

/// Abstract brightness output
///
/// Implement this trait to drive a PWM channel, a backlight or anything
/// else that takes a brightness level.
pub trait OutputDriver {
    /// Write the current brightness level
    fn write(&mut self, level: BrightnessLevel);
}

/// Local wall clock
///
/// Must return time already adjusted for the device's time zone and
/// daylight saving.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

impl<F: Fn() -> NaiveDateTime> Clock for F {
    fn now(&self) -> NaiveDateTime {
        self()
    }
}
