mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use chrono::{NaiveDate, NaiveDateTime};
    use embassy_time::{Duration, Instant};
    use myrtio_daylight::solar::SolarData;
    use myrtio_daylight::{
        AlarmOverride, BrightnessLevel, DaylightConfig, DiagnosticsLog, IntentChannel, Lamp,
        LampMode, OutputDriver, SolarTable, TickScheduler, TransitionAction,
    };

    /// Sunrise 05:00, sunset 21:00 every day
    static FLAT: SolarData = [[300, 1260]; 366];

    /// Midsummer: sunset 22:06, so the hold ends at 00:06 the next day
    static LATE: SolarData = [[300, 1326]; 366];

    type Log = DiagnosticsLog<64, 64>;

    fn on_day(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        on_day(20, hour, minute)
    }

    fn ms(millis: u64) -> Instant {
        Instant::from_millis(millis)
    }

    fn lamp<'a, const N: usize>(
        channel: &'a IntentChannel<N>,
        config: &DaylightConfig,
    ) -> Lamp<'a, AlarmOverride, Log, N> {
        Lamp::new(
            channel.receiver(),
            AlarmOverride::UNSET,
            Log::new(),
            SolarTable::new(&FLAT),
            config,
        )
    }

    #[test]
    fn test_boot_mid_fade_recovers_level() {
        let channel = IntentChannel::<4>::new();
        let mut lamp = lamp(&channel, &DaylightConfig::LAMP);

        let report = lamp.start(at(5, 15));
        assert_eq!(report.armed, 4);
        assert_eq!(lamp.state().current, 511);
        assert_eq!(lamp.state().target, 1023);
        assert!(lamp.diagnostics().contains("Overriding brightness"));
    }

    #[test]
    fn test_boot_during_hold_is_full_brightness() {
        let channel = IntentChannel::<4>::new();
        let mut lamp = lamp(&channel, &DaylightConfig::LAMP);

        assert_eq!(lamp.tick(at(6, 0), ms(0)), 1023);
        assert_eq!(lamp.next_transition().unwrap().fire_at, at(7, 0));
    }

    #[test]
    fn test_scheduled_fade_on_and_off() {
        let channel = IntentChannel::<4>::new();
        let mut lamp = lamp(&channel, &DaylightConfig::LAMP);
        let step = 1759;

        assert_eq!(lamp.tick(at(0, 0), ms(0)), 0);
        assert_eq!(lamp.armed().len(), 5);
        assert_eq!(lamp.tick(at(4, 59), ms(0)), 0);

        // FadeOn fires, the first engine tick only anchors the ramp
        assert_eq!(lamp.tick(at(5, 0), ms(1000)), 0);
        assert_eq!(lamp.state().target, 1023);
        assert!(lamp.diagnostics().contains("Fading On"));

        assert_eq!(lamp.tick(at(5, 0), ms(1000 + 10 * step)), 10);
        assert_eq!(lamp.tick(at(5, 30), ms(1000 + 2000 * step)), 1023);

        lamp.tick(at(7, 0), ms(1000 + 2001 * step));
        assert_eq!(lamp.state().target, 0);
        assert!(lamp.diagnostics().contains("Fading Off"));
        assert_eq!(lamp.tick(at(7, 0), ms(1000 + 2011 * step)), 1013);
        assert_eq!(lamp.armed().len(), 3);
    }

    #[test]
    fn test_midnight_reschedules_next_day() {
        let channel = IntentChannel::<4>::new();
        let mut lamp = lamp(&channel, &DaylightConfig::LAMP);

        lamp.tick(at(23, 40), ms(0));
        assert_eq!(lamp.armed().len(), 1);
        assert_eq!(lamp.armed()[0].action, TransitionAction::Reschedule);

        lamp.tick(on_day(21, 0, 0), ms(50));
        assert_eq!(lamp.armed().len(), 5);
        assert_eq!(lamp.next_transition().unwrap().fire_at, on_day(21, 5, 0));
        assert_eq!(lamp.last_report().unwrap().armed, 5);
    }

    #[test]
    fn test_toggle_is_instant() {
        let channel = IntentChannel::<4>::new();
        let sender = channel.sender();
        let mut lamp = lamp(&channel, &DaylightConfig::LAMP);

        lamp.tick(at(12, 0), ms(0));
        sender.toggle().unwrap();
        assert_eq!(lamp.tick(at(12, 0), ms(50)), 1023);
        assert!(lamp.diagnostics().contains("Toggled, target 1023"));

        sender.toggle().unwrap();
        assert_eq!(lamp.tick(at(12, 1), ms(100)), 0);
    }

    #[test]
    fn test_alarm_change_takes_effect_on_reschedule() {
        let channel = IntentChannel::<4>::new();
        let sender = channel.sender();
        let alarm = Rc::new(Cell::new(AlarmOverride::UNSET));
        let source = {
            let alarm = Rc::clone(&alarm);
            move || Some(alarm.get())
        };
        let mut lamp = Lamp::new(
            channel.receiver(),
            source,
            Log::new(),
            SolarTable::new(&FLAT),
            &DaylightConfig::LAMP,
        );

        lamp.tick(at(0, 0), ms(0));
        assert_eq!(lamp.next_transition().unwrap().fire_at, at(5, 0));

        alarm.set(AlarmOverride::new(7, 0));
        sender.reschedule().unwrap();
        lamp.tick(at(0, 1), ms(50));
        assert_eq!(lamp.next_transition().unwrap().fire_at, at(7, 0));
        assert!(lamp.last_report().unwrap().plan.unwrap().alarm_applied);
    }

    #[test]
    fn test_daylight_follows_curve() {
        let channel = IntentChannel::<4>::new();
        let mut lamp = lamp(&channel, &DaylightConfig::DISPLAY);
        assert_eq!(lamp.mode(), LampMode::Daylight);

        // Boots straight onto the curve
        assert_eq!(lamp.tick(at(12, 0), ms(0)), 500);
        assert_eq!(lamp.state().target, 500);

        lamp.tick(at(21, 30), ms(50));
        assert_eq!(lamp.state().target, 255);
        assert_eq!(lamp.state().current, 500);
    }

    #[test]
    fn test_switch_to_daylight_snaps_to_curve() {
        let channel = IntentChannel::<4>::new();
        let sender = channel.sender();
        let mut lamp = lamp(&channel, &DaylightConfig::LAMP);

        assert_eq!(lamp.tick(at(12, 0), ms(0)), 0);
        sender.set_mode(LampMode::Daylight).unwrap();
        assert_eq!(lamp.tick(at(12, 0), ms(50)), 1023);
    }

    #[test]
    fn test_daylight_ignores_scheduled_fades() {
        let channel = IntentChannel::<4>::new();
        let mut lamp = lamp(&channel, &DaylightConfig::DISPLAY);

        lamp.tick(at(4, 0), ms(0));
        lamp.tick(at(5, 0), ms(50));
        assert_eq!(lamp.state().target, 10);
        assert!(!lamp.diagnostics().contains("Fading On"));
    }

    #[test]
    fn test_daylight_toggle_suspends_curve() {
        let channel = IntentChannel::<4>::new();
        let sender = channel.sender();
        let mut lamp = lamp(&channel, &DaylightConfig::DISPLAY);

        lamp.tick(at(12, 0), ms(0));
        sender.toggle().unwrap();
        assert_eq!(lamp.tick(at(12, 0), ms(50)), 10);
        assert_eq!(lamp.tick(at(12, 1), ms(100)), 10);
        assert_eq!(lamp.state().target, 10);

        sender.toggle().unwrap();
        assert_eq!(lamp.tick(at(12, 2), ms(150)), 500);
    }

    #[test]
    fn test_switch_to_scheduled_mode_reschedules() {
        let channel = IntentChannel::<4>::new();
        let sender = channel.sender();
        let mut lamp = lamp(&channel, &DaylightConfig::DISPLAY);

        lamp.tick(at(5, 10), ms(0));
        sender.set_mode(LampMode::Scheduled).unwrap();
        lamp.tick(at(5, 15), ms(50));

        assert_eq!(lamp.mode(), LampMode::Scheduled);
        // Halfway between 10 and 500
        assert_eq!(lamp.state().current, 255);
        assert_eq!(lamp.state().target, 500);
        assert!(lamp.diagnostics().contains("Switched to Scheduled mode"));
    }

    #[test]
    fn test_switch_to_scheduled_outside_fade_goes_dark() {
        let channel = IntentChannel::<4>::new();
        let sender = channel.sender();
        let mut lamp = lamp(&channel, &DaylightConfig::DISPLAY);

        lamp.tick(at(12, 0), ms(0));
        sender.set_mode(LampMode::Scheduled).unwrap();
        lamp.tick(at(12, 0), ms(50));
        assert_eq!(lamp.state().target, 10);
    }

    fn late_lamp<const N: usize>(channel: &IntentChannel<N>) -> Lamp<'_, AlarmOverride, Log, N> {
        Lamp::new(
            channel.receiver(),
            AlarmOverride::UNSET,
            Log::new(),
            SolarTable::new(&LATE),
            &DaylightConfig::LAMP,
        )
    }

    #[test]
    fn test_late_sunset_fades_off_after_midnight() {
        let channel = IntentChannel::<4>::new();
        let mut lamp = late_lamp(&channel);
        let step = 1759;

        lamp.tick(at(22, 0), ms(0));
        assert_eq!(lamp.armed().len(), 3);

        lamp.tick(at(22, 6), ms(1000));
        assert_eq!(lamp.tick(at(23, 0), ms(1000 + 1100 * step)), 1023);

        // The midnight pass must keep the pending fade off
        lamp.tick(on_day(21, 0, 0), ms(1000 + 1101 * step));
        assert!(lamp.armed().iter().any(|transition| {
            transition.fire_at == on_day(21, 0, 6) && transition.action == TransitionAction::FadeOff
        }));
        assert_eq!(lamp.state().target, 1023);

        lamp.tick(on_day(21, 0, 10), ms(1000 + 1200 * step));
        assert_eq!(lamp.state().target, 0);

        assert_eq!(lamp.tick(on_day(21, 1, 0), ms(1000 + 3300 * step)), 0);
        assert_eq!(lamp.state().target, 0);
    }

    #[test]
    fn test_boot_after_midnight_inside_late_hold() {
        let channel = IntentChannel::<4>::new();
        let mut lamp = late_lamp(&channel);

        let report = lamp.start(on_day(21, 0, 3));
        assert_eq!(report.armed, 6);
        assert_eq!(lamp.state().current, 1023);
        assert_eq!(lamp.state().target, 1023);

        let next = lamp.next_transition().unwrap();
        assert_eq!(next.fire_at, on_day(21, 0, 6));
        assert_eq!(next.action, TransitionAction::FadeOff);
    }

    #[test]
    fn test_boot_after_midnight_inside_late_fade_down() {
        let channel = IntentChannel::<4>::new();
        let mut lamp = late_lamp(&channel);

        lamp.start(on_day(21, 0, 20));
        assert_eq!(lamp.state().current, 1023);
        assert_eq!(lamp.state().target, 0);
    }

    #[derive(Default)]
    struct Recorder(Vec<BrightnessLevel>);

    impl OutputDriver for Recorder {
        fn write(&mut self, level: BrightnessLevel) {
            self.0.push(level);
        }
    }

    #[test]
    fn test_tick_scheduler_writes_changes_only() {
        let channel = IntentChannel::<4>::new();
        let sender = channel.sender();
        let time = Cell::new(at(12, 0));
        let clock = || time.get();
        let mut scheduler = TickScheduler::with_period(
            lamp(&channel, &DaylightConfig::LAMP),
            clock,
            Recorder::default(),
            Duration::from_millis(50),
        );

        let result = scheduler.tick(ms(0));
        assert_eq!(result.level, 0);
        assert_eq!(result.sleep_duration, Duration::from_millis(50));
        scheduler.tick(ms(50));
        assert_eq!(scheduler.output().0, [0]);

        sender.toggle().unwrap();
        time.set(at(12, 1));
        let result = scheduler.tick(ms(100));
        assert_eq!(result.level, 1023);
        assert_eq!(scheduler.output().0, [0, 1023]);
        assert_eq!(scheduler.lamp().state().current, 1023);
    }

    #[test]
    fn test_tick_scheduler_skips_backlog() {
        let channel = IntentChannel::<4>::new();
        let time = Cell::new(at(12, 0));
        let mut scheduler = TickScheduler::with_period(
            lamp(&channel, &DaylightConfig::LAMP),
            || time.get(),
            Recorder::default(),
            Duration::from_millis(50),
        );

        scheduler.tick(ms(0));
        let result = scheduler.tick(ms(1000));
        assert_eq!(result.next_deadline, ms(1050));
        assert_eq!(result.sleep_duration, Duration::from_millis(50));

        let result = scheduler.tick(ms(1060));
        assert_eq!(result.next_deadline, ms(1100));
        assert_eq!(result.sleep_duration, Duration::from_millis(40));
    }
}
