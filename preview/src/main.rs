//! Desktop preview app for myrtio-daylight
//!
//! Simulates a lamp on an accelerated wall clock: shows the output level,
//! the daylight curve of the simulated day, armed transitions and the
//! diagnostics log. All state changes go through the intent channel.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant as StdInstant;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use eframe::egui::{self};
use myrtio_daylight::calendar::day_of_year_at;
use myrtio_daylight::curve::level;
use myrtio_daylight::{
    AlarmOverride, AlarmSource, DaylightConfig, DiagnosticsLog, Instant, IntentChannel,
    IntentSender, Lamp, LampMode, SolarTable,
};

/// Intent channel size
const INTENT_CHANNEL_SIZE: usize = 16;

/// Static intent channel for communication between UI and lamp
static INTENTS_CHANNEL: IntentChannel<INTENT_CHANNEL_SIZE> =
    IntentChannel::<INTENT_CHANNEL_SIZE>::new();

type PreviewLog = DiagnosticsLog<128, 96>;

/// Curve resolution in minutes
const CURVE_SLOT_MINUTES: u16 = 10;

/// Height of the curve plot in pixels
const CURVE_HEIGHT: f32 = 120.0;

/// Alarm shared between the UI and the lamp, like a settings store
#[derive(Clone, Default)]
struct SharedAlarm(Rc<Cell<AlarmOverride>>);

impl AlarmSource for SharedAlarm {
    fn alarm_override(&self) -> Option<AlarmOverride> {
        Some(self.0.get())
    }
}

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_title("Daylight Lamp Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "myrtio-daylight-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new()))),
    )
}

fn simulation_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 20)
        .and_then(|date| date.and_hms_opt(4, 45, 0))
        .unwrap_or_default()
}

struct PreviewApp {
    /// The lamp instance
    lamp: Lamp<'static, SharedAlarm, PreviewLog, INTENT_CHANNEL_SIZE>,
    /// Intent sender for UI changes
    intent_sender: IntentSender<'static, INTENT_CHANNEL_SIZE>,
    /// Alarm handle shared with the lamp
    alarm: SharedAlarm,
    table: SolarTable,
    config: DaylightConfig,

    // UI state (tracked to detect changes and send intents)
    /// Wall-clock time the simulation started at
    start: NaiveDateTime,
    /// Synthetic time in milliseconds since `start`
    t_ms: u64,
    /// Real time reference for delta time
    last_frame: StdInstant,
    /// Whether the clock is running
    playing: bool,
    /// Time scale multiplier (1.0 = realtime)
    time_scale: f32,
    mode: LampMode,
    alarm_enabled: bool,
    alarm_hour: u8,
    alarm_minute: u8,
}

impl PreviewApp {
    fn new() -> Self {
        let config = DaylightConfig::LAMP;
        let table = SolarTable::default();
        let alarm = SharedAlarm::default();
        let lamp = Lamp::new(
            INTENTS_CHANNEL.receiver(),
            alarm.clone(),
            PreviewLog::new(),
            table,
            &config,
        );

        Self {
            lamp,
            intent_sender: INTENTS_CHANNEL.sender(),
            alarm,
            table,
            config,
            start: simulation_start(),
            t_ms: 0,
            last_frame: StdInstant::now(),
            playing: true,
            time_scale: 60.0,
            mode: config.mode,
            alarm_enabled: false,
            alarm_hour: 7,
            alarm_minute: 0,
        }
    }

    /// Simulated local time
    fn now(&self) -> NaiveDateTime {
        #[allow(clippy::cast_possible_wrap)]
        let elapsed = TimeDelta::milliseconds(self.t_ms as i64);
        self.start + elapsed
    }

    /// Push the alarm editor state into the shared store and reschedule
    fn send_alarm_change(&self) {
        let alarm = if self.alarm_enabled {
            AlarmOverride::new(self.alarm_hour, self.alarm_minute)
        } else {
            AlarmOverride::UNSET
        };
        self.alarm.0.set(alarm);
        let _ = self.intent_sender.reschedule();
    }

    /// Jump the clock forward
    fn skip(&mut self, minutes: u64) {
        self.t_ms = self.t_ms.saturating_add(minutes * 60_000);
    }

    /// Update synthetic time based on wall clock and time scale
    fn update_time(&mut self) {
        let now = StdInstant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.playing {
            let delta_ms_f64 = delta.as_secs_f64() * 1000.0 * f64::from(self.time_scale);
            let delta_ms_f64 = if delta_ms_f64.is_finite() {
                #[allow(clippy::cast_precision_loss)]
                delta_ms_f64.clamp(0.0, u64::MAX as f64)
            } else {
                0.0
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let delta_ms = delta_ms_f64 as u64;
            self.t_ms = self.t_ms.saturating_add(delta_ms);
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // <PlaybackControls>
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    if ui
                        .button(if self.playing { "⏸ Pause" } else { "▶ Play" })
                        .clicked()
                    {
                        self.playing = !self.playing;
                    }
                    if ui.button("+15 min").clicked() {
                        self.skip(15);
                    }
                    if ui.button("+1 h").clicked() {
                        self.skip(60);
                    }
                });

                ui.add_space(4.0);
                ui.label(format!("Time: {}", self.now().format("%Y-%m-%d %H:%M:%S")));

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.label("Speed:");
                    ui.add(egui::Slider::new(&mut self.time_scale, 1.0..=3600.0).logarithmic(true));
                });
            });
            // </PlaybackControls>
            ui.add_space(16.0);
            // <LampControls>
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    ui.label("Mode:");
                    let old_mode = self.mode;
                    ui.selectable_value(&mut self.mode, LampMode::Scheduled, "scheduled");
                    ui.selectable_value(&mut self.mode, LampMode::Daylight, "daylight");
                    if self.mode != old_mode {
                        let _ = self.intent_sender.set_mode(self.mode);
                    }
                });

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    if ui.button("Toggle").clicked() {
                        let _ = self.intent_sender.toggle();
                    }
                    if ui.button("Reschedule").clicked() {
                        let _ = self.intent_sender.reschedule();
                    }
                    if ui.button("Rotate log").clicked() {
                        self.lamp.diagnostics_mut().rotate();
                    }
                });

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    let before = (self.alarm_enabled, self.alarm_hour, self.alarm_minute);
                    ui.checkbox(&mut self.alarm_enabled, "Alarm");
                    ui.add(egui::DragValue::new(&mut self.alarm_hour).range(0u8..=23u8));
                    ui.label(":");
                    ui.add(egui::DragValue::new(&mut self.alarm_minute).range(0u8..=59u8));
                    if (self.alarm_enabled, self.alarm_hour, self.alarm_minute) != before {
                        self.send_alarm_change();
                    }
                });
            });
            // </LampControls>
        });
    }

    fn show_output(&self, ui: &mut egui::Ui) {
        let state = self.lamp.state();
        let range = self.config.brightness;

        ui.horizontal(|ui| {
            let (response, painter) =
                ui.allocate_painter(egui::vec2(96.0, 96.0), egui::Sense::hover());
            #[allow(clippy::cast_possible_truncation)]
            let gray = (u32::from(state.current) * 255 / u32::from(range.max())) as u8;
            painter.rect_filled(response.rect, 8.0, egui::Color32::from_gray(gray));

            ui.vertical(|ui| {
                ui.label(format!("Current: {}", state.current));
                ui.label(format!("Target: {}", state.target));
                ui.label(format!("Mode: {:?}", self.lamp.mode()));
                if let Some(report) = self.lamp.last_report() {
                    ui.label(format!(
                        "Last pass: armed {}, skipped {}",
                        report.armed, report.skipped
                    ));
                }
            });
        });
    }

    /// Daylight curve of the simulated day with the current time marked
    fn show_curve(&self, ui: &mut egui::Ui) {
        let now = self.now();
        let solar = self.table.lookup(day_of_year_at(&now).clamped_index());
        let range = self.config.brightness;
        ui.label(format!(
            "Sunrise {:02}:{:02}, sunset {:02}:{:02}",
            solar.sunrise / 60,
            solar.sunrise % 60,
            solar.sunset / 60,
            solar.sunset % 60
        ));

        let slots = 24 * 60 / CURVE_SLOT_MINUTES;
        let width = ui.available_width();
        let (response, painter) =
            ui.allocate_painter(egui::vec2(width, CURVE_HEIGHT), egui::Sense::hover());
        let origin = response.rect.min;
        let slot_width = width / f32::from(slots);
        #[allow(clippy::cast_possible_truncation)]
        let now_slot = (now.hour() * 60 + now.minute()) as u16 / CURVE_SLOT_MINUTES;

        for slot in 0..slots {
            let value = level(
                slot * CURVE_SLOT_MINUTES,
                solar,
                range,
                self.config.curve_window_minutes,
            );
            let height = CURVE_HEIGHT * f32::from(value) / f32::from(range.max());
            let rect = egui::Rect::from_min_max(
                egui::pos2(origin.x + f32::from(slot) * slot_width, origin.y + CURVE_HEIGHT - height),
                egui::pos2(origin.x + f32::from(slot + 1) * slot_width - 1.0, origin.y + CURVE_HEIGHT),
            );
            let color = if slot == now_slot {
                egui::Color32::from_rgb(255, 180, 100)
            } else {
                egui::Color32::from_gray(120)
            };
            painter.rect_filled(rect, 0.0, color);
        }
    }

    fn show_transitions(&self, ui: &mut egui::Ui) {
        ui.label("Armed transitions:");
        let mut armed = self.lamp.armed().to_vec();
        armed.sort_by_key(|transition| transition.fire_at);
        for transition in armed {
            ui.label(format!(
                "{}  {} ({:?})",
                transition.fire_at.format("%m-%d %H:%M"),
                transition.label,
                transition.action
            ));
        }
    }

    fn show_log(&self, ui: &mut egui::Ui) {
        ui.label("Diagnostics:");
        egui::ScrollArea::vertical()
            .max_height(200.0)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in self.lamp.diagnostics().lines() {
                    ui.monospace(line);
                }
            });
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Update synthetic time
        self.update_time();

        // Tick the lamp on simulated time
        let now = self.now();
        self.lamp.tick(now, Instant::from_millis(self.t_ms));

        // Request continuous repaint for animation
        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_controls(ui);
            ui.add_space(16.0);
            self.show_output(ui);
            ui.add_space(16.0);
            self.show_curve(ui);
            ui.add_space(16.0);
            ui.horizontal_top(|ui| {
                ui.vertical(|ui| self.show_transitions(ui));
                ui.add_space(24.0);
                ui.vertical(|ui| self.show_log(ui));
            });
        });
    }
}
