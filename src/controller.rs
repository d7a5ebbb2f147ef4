//! Lamp controller
//!
//! [`Lamp`] is the single owner of all mutable lamp state: fade engine,
//! armed transitions, mode. Everything else talks to it through the intent
//! channel or the collaborator traits, and the main loop drives it with
//! [`Lamp::tick`].

use chrono::NaiveDateTime;
use embassy_time::Instant;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::{BrightnessLevel, DaylightConfig, LampMode};
use crate::curve::level_at;
use crate::diagnostics::Diagnostics;
use crate::fade::{FadeEngine, FadeState};
use crate::intent::{IntentReceiver, LampIntent};
use crate::scheduler::{FadeScheduler, RescheduleReport, TRANSITIONS_PER_DAY};
use crate::settings::AlarmSource;
use crate::solar::SolarTable;
use crate::timer::{ScheduledTransition, TimerQueue, TransitionAction};

/// Sunrise/sunset lamp controller
pub struct Lamp<'a, A: AlarmSource, D: Diagnostics, const INTENT_CHANNEL_SIZE: usize> {
    // External dependencies and configuration
    intents: IntentReceiver<'a, INTENT_CHANNEL_SIZE>,
    alarm: A,
    diagnostics: D,
    config: DaylightConfig,

    // Internal state
    mode: LampMode,
    curve_suspended: bool,
    started: bool,
    timers: TimerQueue<TRANSITIONS_PER_DAY>,
    last_report: Option<RescheduleReport>,

    // Internal dependencies
    scheduler: FadeScheduler,
    engine: FadeEngine,
}

impl<'a, A: AlarmSource, D: Diagnostics, const INTENT_CHANNEL_SIZE: usize>
    Lamp<'a, A, D, INTENT_CHANNEL_SIZE>
{
    /// Create a lamp resting at minimum brightness.
    ///
    /// Nothing is scheduled until [`Self::start`] or the first tick.
    pub fn new(
        intents: IntentReceiver<'a, INTENT_CHANNEL_SIZE>,
        alarm: A,
        diagnostics: D,
        table: SolarTable,
        config: &DaylightConfig,
    ) -> Self {
        Self {
            intents,
            alarm,
            diagnostics,
            config: *config,
            mode: config.mode,
            curve_suspended: false,
            started: false,
            timers: TimerQueue::new(),
            last_report: None,
            scheduler: FadeScheduler::new(table, config),
            engine: FadeEngine::new(config.brightness, config.timings.fade_duration),
        }
    }

    /// Run the first scheduling pass.
    ///
    /// In daylight mode the output starts on the curve instead of ramping
    /// up from `min`.
    pub fn start(&mut self, now: NaiveDateTime) -> RescheduleReport {
        let report = self.reschedule(now);
        if self.mode == LampMode::Daylight {
            self.snap_to_curve(now);
        }
        report
    }

    /// Advance the lamp to `now` and return the level to output.
    ///
    /// `now` is local wall-clock time, `instant` the monotonic tick time
    /// the fade engine steps on.
    pub fn tick(&mut self, now: NaiveDateTime, instant: Instant) -> BrightnessLevel {
        if !self.started {
            self.start(now);
        }

        self.process_intents(now);

        while let Some(transition) = self.timers.pop_due(now) {
            self.dispatch(transition, now);
        }

        if self.mode == LampMode::Daylight && !self.curve_suspended {
            let level = level_at(&now, self.scheduler.table(), &self.config);
            // Keep a pending snap from a toggle
            if level != self.engine.target() {
                self.engine.set_target(level, false);
            }
        }

        self.engine.tick(instant)
    }

    pub const fn state(&self) -> FadeState {
        self.engine.state()
    }

    pub const fn mode(&self) -> LampMode {
        self.mode
    }

    pub const fn config(&self) -> &DaylightConfig {
        &self.config
    }

    /// Currently armed transitions
    pub fn armed(&self) -> &[ScheduledTransition] {
        self.timers.armed()
    }

    /// Earliest armed transition
    pub fn next_transition(&self) -> Option<&ScheduledTransition> {
        self.timers.next()
    }

    /// Report of the latest scheduling pass
    pub const fn last_report(&self) -> Option<&RescheduleReport> {
        self.last_report.as_ref()
    }

    pub const fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut D {
        &mut self.diagnostics
    }

    pub const fn alarm(&self) -> &A {
        &self.alarm
    }

    /// Drop old transitions and schedule today from scratch
    fn reschedule(&mut self, now: NaiveDateTime) -> RescheduleReport {
        let alarm = self.alarm.alarm_or_unset();
        let report = self
            .scheduler
            .reschedule(now, alarm, &mut self.timers, &mut self.diagnostics);

        if self.mode == LampMode::Scheduled {
            if let Some(recovery) = report.recovery {
                recovery.apply(&mut self.engine, &mut self.diagnostics);
            }
        }

        #[cfg(feature = "esp32-log")]
        println!(
            "[Lamp.reschedule] armed {} skipped {}",
            report.armed, report.skipped
        );

        self.started = true;
        self.last_report = Some(report);
        report
    }

    /// Drain pending intents (non-blocking)
    fn process_intents(&mut self, now: NaiveDateTime) {
        while let Some(intent) = self.intents.try_receive() {
            match intent {
                LampIntent::Toggle => self.toggle(now),
                LampIntent::SetMode(mode) => self.set_mode(mode, now),
                LampIntent::Reschedule => {
                    self.reschedule(now);
                }
            }
        }
    }

    fn toggle(&mut self, now: NaiveDateTime) {
        match self.mode {
            LampMode::Scheduled => self.engine.toggle(),
            LampMode::Daylight => {
                self.curve_suspended = !self.curve_suspended;
                let level = if self.curve_suspended {
                    self.config.brightness.min()
                } else {
                    level_at(&now, self.scheduler.table(), &self.config)
                };
                self.engine.set_target(level, true);
            }
        }
        self.diagnostics
            .record(format_args!("Toggled, target {}", self.engine.target()));
    }

    fn set_mode(&mut self, mode: LampMode, now: NaiveDateTime) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.curve_suspended = false;
        self.diagnostics
            .record(format_args!("Switched to {:?} mode", mode));

        match mode {
            LampMode::Scheduled => {
                // Dark unless the reschedule finds us inside a fade
                self.engine.fade_off();
                self.reschedule(now);
            }
            LampMode::Daylight => self.snap_to_curve(now),
        }
    }

    fn snap_to_curve(&mut self, now: NaiveDateTime) {
        let level = level_at(&now, self.scheduler.table(), &self.config);
        self.engine.force(level, level);
    }

    /// Run the action of a due transition
    fn dispatch(&mut self, transition: ScheduledTransition, now: NaiveDateTime) {
        #[cfg(feature = "esp32-log")]
        println!(
            "[Lamp.dispatch] {} ({:?}) due {}",
            transition.label, transition.action, transition.fire_at
        );

        match transition.action {
            TransitionAction::Reschedule => {
                self.reschedule(now);
            }
            // The daylight curve owns the target in daylight mode
            TransitionAction::FadeOn | TransitionAction::FadeOff
                if self.mode == LampMode::Daylight => {}
            TransitionAction::FadeOn => {
                self.diagnostics.record(format_args!("Fading On"));
                self.engine.fade_on();
            }
            TransitionAction::FadeOff => {
                self.diagnostics.record(format_args!("Fading Off"));
                self.engine.fade_off();
            }
        }
    }
}
