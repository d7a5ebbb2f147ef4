//! Lamp configuration and deployment presets

use embassy_time::Duration;

/// Output intensity in driver units
pub type BrightnessLevel = u16;

/// Inclusive output range of the lamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessRange {
    min: BrightnessLevel,
    max: BrightnessLevel,
}

impl BrightnessRange {
    /// Create a range, `None` unless `max > min`
    pub const fn new(min: BrightnessLevel, max: BrightnessLevel) -> Option<Self> {
        if max > min {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub const fn min(self) -> BrightnessLevel {
        self.min
    }

    pub const fn max(self) -> BrightnessLevel {
        self.max
    }

    /// Number of unit steps between `min` and `max`
    pub const fn span(self) -> u16 {
        self.max - self.min
    }

    pub const fn clamp(self, level: BrightnessLevel) -> BrightnessLevel {
        if level < self.min {
            self.min
        } else if level > self.max {
            self.max
        } else {
            level
        }
    }
}

/// Durations of the scheduled fades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeTimings {
    /// Ramp time between `min` and `max`
    pub fade_duration: Duration,
    /// Hold at full brightness before fading off again.
    ///
    /// Zero disables the hold stage.
    pub fade_delay: Duration,
}

/// How the lamp picks its target brightness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampMode {
    /// Fade on and off at the scheduled sunrise/sunset transitions
    Scheduled,
    /// Follow the daylight curve continuously (display backlight)
    Daylight,
}

/// Configuration for the lamp controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaylightConfig {
    pub brightness: BrightnessRange,
    pub timings: FadeTimings,
    /// Ramp length of the daylight curve in minutes
    pub curve_window_minutes: u16,
    pub mode: LampMode,
}

const LAMP_TIMINGS: FadeTimings = FadeTimings {
    fade_duration: Duration::from_secs(30 * 60),
    fade_delay: Duration::from_secs(90 * 60),
};

impl DaylightConfig {
    /// Sunrise lamp: 10 bit PWM, 30 minute fade, 90 minute hold
    pub const LAMP: Self = Self {
        brightness: BrightnessRange { min: 0, max: 1023 },
        timings: LAMP_TIMINGS,
        curve_window_minutes: 60,
        mode: LampMode::Scheduled,
    };

    /// Same as [`Self::LAMP`] with a dimmed ceiling for bench testing
    pub const LAMP_DEBUG: Self = Self {
        brightness: BrightnessRange { min: 0, max: 150 },
        ..Self::LAMP
    };

    /// Plain on/off lamp without the hold stage
    pub const SIMPLE: Self = Self {
        timings: FadeTimings {
            fade_duration: LAMP_TIMINGS.fade_duration,
            fade_delay: Duration::from_secs(0),
        },
        ..Self::LAMP
    };

    /// Display backlight following the daylight curve
    pub const DISPLAY: Self = Self {
        brightness: BrightnessRange { min: 10, max: 500 },
        timings: LAMP_TIMINGS,
        curve_window_minutes: 60,
        mode: LampMode::Daylight,
    };
}

impl Default for DaylightConfig {
    fn default() -> Self {
        Self::LAMP
    }
}
