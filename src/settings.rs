//! User alarm override
//!
//! The alarm is owned by a persisted settings collaborator. The core only
//! reads it, through [`AlarmSource`].

/// Raw byte marking an unset alarm field
pub const UNSET: u8 = 255;

/// User alarm that can postpone the morning fade.
///
/// Stored as raw hour/minute bytes; `255/255` means "no override", which
/// keeps it distinct from an alarm at midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmOverride {
    hour: u8,
    minute: u8,
}

impl AlarmOverride {
    pub const UNSET: Self = Self {
        hour: UNSET,
        minute: UNSET,
    };

    /// Alarm at `hour:minute`, unset if either is out of range
    pub const fn new(hour: u8, minute: u8) -> Self {
        if hour < 24 && minute < 60 {
            Self { hour, minute }
        } else {
            Self::UNSET
        }
    }

    /// Decode the two persisted bytes
    pub const fn from_raw([hour, minute]: [u8; 2]) -> Self {
        Self::new(hour, minute)
    }

    /// Encode as the two persisted bytes
    pub const fn to_raw(self) -> [u8; 2] {
        [self.hour, self.minute]
    }

    pub const fn is_set(self) -> bool {
        self.hour != UNSET && self.minute != UNSET
    }

    /// `(hour, minute)` if set
    pub const fn time(self) -> Option<(u8, u8)> {
        if self.is_set() {
            Some((self.hour, self.minute))
        } else {
            None
        }
    }

    /// Minutes after midnight if set
    pub const fn minute_of_day(self) -> Option<u16> {
        match self.time() {
            Some((hour, minute)) => Some(hour as u16 * 60 + minute as u16),
            None => None,
        }
    }
}

impl Default for AlarmOverride {
    fn default() -> Self {
        Self::UNSET
    }
}

/// Read access to the persisted alarm setting
pub trait AlarmSource {
    /// Current alarm, `None` if the setting can't be read right now
    fn alarm_override(&self) -> Option<AlarmOverride>;

    /// Alarm to schedule with; unavailable settings count as unset
    fn alarm_or_unset(&self) -> AlarmOverride {
        self.alarm_override().unwrap_or(AlarmOverride::UNSET)
    }
}

impl AlarmSource for AlarmOverride {
    fn alarm_override(&self) -> Option<AlarmOverride> {
        Some(*self)
    }
}

impl<F: Fn() -> Option<AlarmOverride>> AlarmSource for F {
    fn alarm_override(&self) -> Option<AlarmOverride> {
        self()
    }
}
