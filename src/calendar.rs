//! Calendar math
//!
//! Converts calendar dates into 1-based day-of-year ordinals and splits
//! local timestamps into the pieces the scheduler works with.
//! Everything here is total: malformed input yields [`DayOrdinal::INVALID`]
//! or `None`, never a panic.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

/// Smallest accepted (four digit) year
pub const MIN_YEAR: i32 = 1000;

/// Raw value of the invalid date sentinel
pub const INVALID_DATE: u16 = 999;

/// Minutes in one day
pub const MINUTES_PER_DAY: u16 = 24 * 60;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Ordinal day of the year (1..=366) or the invalid date sentinel (999)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayOrdinal(u16);

impl DayOrdinal {
    /// Sentinel returned for malformed calendar input
    pub const INVALID: Self = Self(INVALID_DATE);

    /// Wrap an ordinal. Values outside `1..=366` become [`Self::INVALID`].
    pub const fn new(ordinal: u16) -> Self {
        if ordinal >= 1 && ordinal <= 366 {
            Self(ordinal)
        } else {
            Self::INVALID
        }
    }

    /// Raw value, `999` for the sentinel
    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != INVALID_DATE
    }

    /// Ordinal value, `None` for the sentinel
    pub const fn get(self) -> Option<u16> {
        if self.is_valid() { Some(self.0) } else { None }
    }

    /// Zero-based table index (`ordinal - 1`), `None` for the sentinel
    pub const fn zero_based(self) -> Option<usize> {
        match self.get() {
            Some(ordinal) => Some(ordinal as usize - 1),
            None => None,
        }
    }

    /// Raw value clamped into `0..=365`.
    ///
    /// The sentinel degrades to the last table entry.
    pub const fn clamped_index(self) -> usize {
        if self.0 > 365 { 365 } else { self.0 as usize }
    }
}

/// Day, month and year as produced by the clock collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    /// Day of month, 1..=31
    pub day: u8,
    /// Month, 1..=12
    pub month: u8,
    /// Four digit year
    pub year: i32,
}

impl CalendarDate {
    pub const fn new(day: u8, month: u8, year: i32) -> Self {
        Self { day, month, year }
    }

    /// Calendar date of a local timestamp
    #[allow(clippy::cast_possible_truncation)]
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self {
            day: timestamp.day() as u8,
            month: timestamp.month() as u8,
            year: timestamp.year(),
        }
    }

    pub const fn ordinal(self) -> DayOrdinal {
        day_of_year(self.day, self.month, self.year)
    }
}

/// A timestamp split into calendar date and time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokenDownTime {
    pub date: CalendarDate,
    pub hour: u8,
    pub minute: u8,
}

impl BrokenDownTime {
    /// Minutes since local midnight
    pub const fn minute_of_day(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

/// Gregorian leap year rule
pub const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` of `year`, `0` for an unknown month
pub const fn days_in_month(month: u8, year: i32) -> u8 {
    if month < 1 || month > 12 {
        return 0;
    }
    if month == 2 && is_leap_year(year) {
        return 29;
    }
    DAYS_IN_MONTH[month as usize - 1]
}

/// Day of year for a calendar date.
///
/// Returns [`DayOrdinal::INVALID`] if the year has less than four digits,
/// the month is unknown or the day does not exist in that month.
pub const fn day_of_year(day: u8, month: u8, year: i32) -> DayOrdinal {
    if year < MIN_YEAR {
        return DayOrdinal::INVALID;
    }
    if day < 1 || day > days_in_month(month, year) {
        return DayOrdinal::INVALID;
    }

    let mut ordinal = day as u16;
    let mut m = 1;
    while m < month {
        ordinal += days_in_month(m, year) as u16;
        m += 1;
    }
    DayOrdinal(ordinal)
}

/// Day of year for a local timestamp
pub fn day_of_year_at(timestamp: &NaiveDateTime) -> DayOrdinal {
    CalendarDate::of(timestamp).ordinal()
}

/// Split a local timestamp into date, hour and minute
#[allow(clippy::cast_possible_truncation)]
pub fn break_down(timestamp: &NaiveDateTime) -> BrokenDownTime {
    BrokenDownTime {
        date: CalendarDate::of(timestamp),
        hour: timestamp.hour() as u8,
        minute: timestamp.minute() as u8,
    }
}

/// Local timestamp `minutes` after midnight of `date`.
///
/// Minutes past the end of the day roll over into the following days.
pub fn make_time(date: NaiveDate, minutes: u32) -> Option<NaiveDateTime> {
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(TimeDelta::try_minutes(i64::from(minutes))?)
}

/// Midnight that starts the day after `timestamp`
pub fn next_midnight(timestamp: &NaiveDateTime) -> Option<NaiveDateTime> {
    Some(timestamp.date().succ_opt()?.and_time(NaiveTime::MIN))
}
