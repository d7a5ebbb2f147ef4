//! Daily fade scheduling
//!
//! Once per day (at boot and then at every local midnight) the scheduler
//! drops the previously armed transitions, works out today's sunrise and
//! sunset fades and arms them together with the next midnight reschedule.
//!
//! Each fade has the shape `on -> fade_end -> off -> fade_down_end`:
//! the lamp ramps up between `on` and `fade_end`, holds full brightness
//! until `off` and then ramps back down. A zero hold makes `off` equal
//! `fade_end`.
//!
//! A late sunset can push `off` past midnight. The midnight pass then
//! carries yesterday's sunset window over, re-arming its fade off and
//! recovering into it, so the lamp does not stay lit until morning.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use embassy_time::Duration;

use crate::calendar::{day_of_year_at, make_time, next_midnight};
use crate::config::{BrightnessLevel, BrightnessRange, DaylightConfig, FadeTimings};
use crate::curve::map_range;
use crate::diagnostics::Diagnostics;
use crate::fade::FadeEngine;
use crate::settings::AlarmOverride;
use crate::solar::SolarTable;
use crate::timer::{ArmError, ScheduledTransition, TransitionAction, TransitionTimer};

const SUNRISE_ON: &str = "Sunrise On";
const SUNRISE_OFF: &str = "Sunrise Off";
const SUNSET_ON: &str = "Sunset On";
const SUNSET_OFF: &str = "Sunset Off";
const RESCHEDULE: &str = "Reschedule";

/// Largest number of transitions a single pass arms
pub const TRANSITIONS_PER_DAY: usize = 6;

fn to_delta(duration: Duration) -> Option<TimeDelta> {
    TimeDelta::try_milliseconds(i64::try_from(duration.as_millis()).ok()?)
}

/// Instants of one fade around sunrise or sunset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeWindow {
    /// Fade on starts
    pub on: NaiveDateTime,
    /// Full brightness reached
    pub fade_end: NaiveDateTime,
    /// Hold ends, fade off starts
    pub off: NaiveDateTime,
    /// Back at minimum brightness
    pub fade_down_end: NaiveDateTime,
}

impl FadeWindow {
    fn new(date: NaiveDate, minute_of_day: u16, timings: &FadeTimings) -> Option<Self> {
        let fade = to_delta(timings.fade_duration)?;
        let hold = to_delta(timings.fade_delay)?;

        let on = make_time(date, u32::from(minute_of_day))?;
        let fade_end = on.checked_add_signed(fade)?;
        let off = fade_end.checked_add_signed(hold)?;
        let fade_down_end = off.checked_add_signed(fade)?;

        Some(Self {
            on,
            fade_end,
            off,
            fade_down_end,
        })
    }

    /// Brightness `now` should have if the lamp (re)starts inside this window
    fn recovery(&self, now: NaiveDateTime, range: BrightnessRange) -> Option<Recovery> {
        if now > self.on && now < self.fade_end {
            let elapsed = (now - self.on).num_milliseconds();
            let total = (self.fade_end - self.on).num_milliseconds();
            let current = map_range(
                elapsed,
                0,
                total,
                i64::from(range.min()),
                i64::from(range.max()),
            );
            // Interpolated between min and max
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let current = current as BrightnessLevel;
            Some(Recovery::Ramp { current })
        } else if now > self.fade_end && now < self.off {
            Some(Recovery::Hold)
        } else if now > self.off && now < self.fade_down_end {
            Some(Recovery::FadeDown)
        } else {
            None
        }
    }
}

/// Brightness correction when scheduling happens in the middle of a fade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Inside a fade-on ramp: jump to the proportional level, keep fading to max
    Ramp { current: BrightnessLevel },
    /// Inside the hold: full brightness right away
    Hold,
    /// Inside the fade-off ramp: start from max, fade to min
    FadeDown,
}

impl Recovery {
    /// Write the recovered levels into the engine without a ramp
    pub fn apply<D: Diagnostics>(self, engine: &mut FadeEngine, diagnostics: &mut D) {
        let range = engine.range();
        match self {
            Self::Ramp { current } => {
                engine.force(current, range.max());
                diagnostics.record(format_args!(
                    "Overriding brightness due to schedule: {}",
                    current
                ));
            }
            Self::Hold => {
                engine.force(range.max(), range.max());
                diagnostics.record(format_args!(
                    "Overriding brightness due to schedule: {}",
                    range.max()
                ));
            }
            Self::FadeDown => {
                engine.force(range.max(), range.min());
                diagnostics.record(format_args!(
                    "Overriding brightness due to schedule: {}, and now fading off",
                    range.max()
                ));
            }
        }
    }
}

/// Today's fades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPlan {
    /// Sunrise used for the morning fade, after the alarm override
    pub sunrise_minute: u16,
    pub sunset_minute: u16,
    /// The alarm postponed the morning fade
    pub alarm_applied: bool,
    pub sunrise: FadeWindow,
    pub sunset: FadeWindow,
    /// Yesterday's sunset fade when it runs past today's midnight
    pub previous_sunset: Option<FadeWindow>,
}

impl DayPlan {
    /// Recovery for `now`, if it falls into one of the fades
    pub fn recovery(&self, now: NaiveDateTime, range: BrightnessRange) -> Option<Recovery> {
        self.previous_sunset
            .and_then(|window| window.recovery(now, range))
            .or_else(|| self.sunrise.recovery(now, range))
            .or_else(|| self.sunset.recovery(now, range))
    }

    /// Fade off of yesterday's sunset still pending after `now`
    pub fn carried_over(&self, now: NaiveDateTime) -> Option<ScheduledTransition> {
        self.previous_sunset
            .filter(|window| window.off > now)
            .map(|window| ScheduledTransition::new(SUNSET_OFF, window.off, TransitionAction::FadeOff))
    }

    /// The four fade transitions in chronological order
    pub const fn transitions(&self) -> [ScheduledTransition; 4] {
        [
            ScheduledTransition::new(SUNRISE_ON, self.sunrise.on, TransitionAction::FadeOn),
            ScheduledTransition::new(SUNRISE_OFF, self.sunrise.off, TransitionAction::FadeOff),
            ScheduledTransition::new(SUNSET_ON, self.sunset.on, TransitionAction::FadeOn),
            ScheduledTransition::new(SUNSET_OFF, self.sunset.off, TransitionAction::FadeOff),
        ]
    }
}

/// Outcome of one scheduling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RescheduleReport {
    /// `None` when the date was invalid
    pub plan: Option<DayPlan>,
    /// Brightness correction for a restart mid-fade
    pub recovery: Option<Recovery>,
    /// Transitions armed, including the midnight reschedule
    pub armed: u8,
    /// Transitions dropped as past due or for lack of timer slots
    pub skipped: u8,
}

/// Computes and arms the daily fade transitions
#[derive(Debug, Clone, Copy)]
pub struct FadeScheduler {
    table: SolarTable,
    timings: FadeTimings,
    range: BrightnessRange,
}

impl FadeScheduler {
    pub const fn new(table: SolarTable, config: &DaylightConfig) -> Self {
        Self {
            table,
            timings: config.timings,
            range: config.brightness,
        }
    }

    pub const fn table(&self) -> &SolarTable {
        &self.table
    }

    /// Work out today's fades.
    ///
    /// Returns `None` for an invalid date or when the fade instants can't
    /// be represented.
    pub fn plan<D: Diagnostics>(
        &self,
        now: NaiveDateTime,
        alarm: AlarmOverride,
        diagnostics: &mut D,
    ) -> Option<DayPlan> {
        let Some(index) = day_of_year_at(&now).zero_based() else {
            diagnostics.record(format_args!("Invalid date [{}], skipping fades", now));
            return None;
        };
        let solar = self.table.lookup(index);
        let date = now.date();

        let mut sunrise_minute = solar.sunrise;
        let mut alarm_applied = false;
        if let Some(alarm_minute) = alarm.minute_of_day() {
            diagnostics.record(format_args!(
                "Comparing sunrise \t[{:02}:{:02}]",
                sunrise_minute / 60,
                sunrise_minute % 60
            ));
            diagnostics.record(format_args!(
                "Comparing alarm \t[{:02}:{:02}]",
                alarm_minute / 60,
                alarm_minute % 60
            ));
            // The alarm can only postpone the morning fade
            if alarm_minute > sunrise_minute {
                sunrise_minute = alarm_minute;
                alarm_applied = true;
                diagnostics.record(format_args!(
                    "New sunrise time \t[{:02}:{:02}]",
                    sunrise_minute / 60,
                    sunrise_minute % 60
                ));
            }
        }

        let windows = FadeWindow::new(date, sunrise_minute, &self.timings)
            .zip(FadeWindow::new(date, solar.sunset, &self.timings));
        let Some((sunrise, sunset)) = windows else {
            diagnostics.record(format_args!("Fade times out of range [{}], skipping fades", now));
            return None;
        };

        Some(DayPlan {
            sunrise_minute,
            sunset_minute: solar.sunset,
            alarm_applied,
            sunrise,
            sunset,
            previous_sunset: self.previous_sunset(date),
        })
    }

    /// Yesterday's sunset window if its fade down ends after midnight of `date`
    fn previous_sunset(&self, date: NaiveDate) -> Option<FadeWindow> {
        let yesterday = date.pred_opt()?;
        let index = day_of_year_at(&yesterday.and_time(NaiveTime::MIN)).zero_based()?;
        let window = FadeWindow::new(yesterday, self.table.lookup(index).sunset, &self.timings)?;
        (window.fade_down_end > date.and_time(NaiveTime::MIN)).then_some(window)
    }

    /// Drop old transitions, arm today's fades and the next midnight pass.
    ///
    /// An invalid date skips the fades but still arms the reschedule.
    pub fn reschedule<T: TransitionTimer, D: Diagnostics>(
        &self,
        now: NaiveDateTime,
        alarm: AlarmOverride,
        timer: &mut T,
        diagnostics: &mut D,
    ) -> RescheduleReport {
        diagnostics.record(format_args!("Scheduling events, deleting old events"));
        timer.cancel(TransitionAction::FadeOn);
        timer.cancel(TransitionAction::FadeOff);
        timer.cancel(TransitionAction::Reschedule);

        let mut report = RescheduleReport {
            plan: self.plan(now, alarm, diagnostics),
            ..RescheduleReport::default()
        };

        if let Some(plan) = report.plan {
            report.recovery = plan.recovery(now, self.range);
            // Yesterday's fade off when it is still ahead
            if let Some(transition) = plan.carried_over(now) {
                report.count(schedule(timer, transition, now, diagnostics));
            }
            for transition in plan.transitions() {
                report.count(schedule(timer, transition, now, diagnostics));
            }
        }

        match next_midnight(&now) {
            Some(midnight) => {
                let transition =
                    ScheduledTransition::new(RESCHEDULE, midnight, TransitionAction::Reschedule);
                report.count(schedule(timer, transition, now, diagnostics));
            }
            None => {
                report.skipped += 1;
                diagnostics.record(format_args!("No next midnight after [{}]", now));
            }
        }

        report
    }
}

impl RescheduleReport {
    fn count(&mut self, armed: bool) {
        if armed {
            self.armed += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Arm one transition unless it is already due
fn schedule<T: TransitionTimer, D: Diagnostics>(
    timer: &mut T,
    transition: ScheduledTransition,
    now: NaiveDateTime,
    diagnostics: &mut D,
) -> bool {
    if transition.fire_at <= now {
        diagnostics.record(format_args!(
            "Skipping past event:\t{} \t[{}]",
            transition.label, transition.fire_at
        ));
        return false;
    }

    match timer.arm(transition, now) {
        Ok(()) => {
            diagnostics.record(format_args!(
                "Event added:\t{} \t[{}]",
                transition.label, transition.fire_at
            ));
            true
        }
        Err(ArmError::PastDue(transition)) => {
            diagnostics.record(format_args!(
                "Timer rejected past event:\t{} \t[{}]",
                transition.label, transition.fire_at
            ));
            false
        }
        Err(ArmError::Full(transition)) => {
            diagnostics.record(format_args!(
                "No timer slot for event:\t{} \t[{}]",
                transition.label, transition.fire_at
            ));
            false
        }
    }
}
