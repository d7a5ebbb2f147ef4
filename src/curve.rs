//! Daylight brightness curve
//!
//! Maps a time of day to an illumination level: `min` at night, `max`
//! during the day, with linear ramps of `window` minutes starting at
//! sunrise and at sunset.

use chrono::NaiveDateTime;

use crate::calendar::{break_down, day_of_year_at};
use crate::config::{BrightnessLevel, BrightnessRange, DaylightConfig};
use crate::solar::{SolarMinutes, SolarTable};

/// Linear range map with the input clamped to `in_lo..=in_hi`.
///
/// An empty input range maps everything to `out_hi`.
pub const fn map_range(value: i64, in_lo: i64, in_hi: i64, out_lo: i64, out_hi: i64) -> i64 {
    if in_hi == in_lo {
        return out_hi;
    }
    let (lo, hi) = if in_lo < in_hi { (in_lo, in_hi) } else { (in_hi, in_lo) };
    let value = if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    };
    out_lo + (value - in_lo) * (out_hi - out_lo) / (in_hi - in_lo)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn ramp(elapsed: i64, window: i64, from: BrightnessLevel, to: BrightnessLevel) -> BrightnessLevel {
    // Result lies between `from` and `to`, both u16
    map_range(elapsed, 0, window, from as i64, to as i64) as BrightnessLevel
}

/// Brightness for `minute_of_day` given the day's sunrise and sunset.
///
/// The day window is `(sunrise, sunset]`. Sunrise itself still counts
/// as night, so the ramp starts from `min` one minute later.
pub const fn level(
    minute_of_day: u16,
    solar: SolarMinutes,
    range: BrightnessRange,
    window: u16,
) -> BrightnessLevel {
    let now = minute_of_day as i64;
    let sunrise = solar.sunrise as i64;
    let sunset = solar.sunset as i64;
    let window = window as i64;

    let is_day = now > sunrise && now <= sunset;
    if is_day {
        if now - sunrise <= window {
            ramp(now - sunrise, window, range.min(), range.max())
        } else {
            range.max()
        }
    } else if now <= sunrise {
        range.min()
    } else if now - sunset <= window {
        ramp(now - sunset, window, range.max(), range.min())
    } else {
        range.min()
    }
}

/// Brightness of the daylight curve at a local timestamp.
///
/// The day-of-year is used directly as table index (clamped to the table),
/// so an invalid date reads the last entry instead of failing.
pub fn level_at(timestamp: &NaiveDateTime, table: &SolarTable, config: &DaylightConfig) -> BrightnessLevel {
    let index = day_of_year_at(timestamp).clamped_index();
    let solar = table.lookup(index);
    let minute_of_day = break_down(timestamp).minute_of_day();

    level(minute_of_day, solar, config.brightness, config.curve_window_minutes)
}
