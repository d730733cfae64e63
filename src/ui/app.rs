use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};
use eframe::egui::{
    self, Align, Color32, Layout, RichText, ScrollArea, TextEdit, TopBottomPanel, Ui,
};
use log::warn;

use crate::alarm::lifecycle::AlarmLifecycle;
use crate::history::HistoryStore;
use crate::recommend::{self, Category, RecommendOutcome, YoutubeSearch};
use crate::sound::SoundPlayer;

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const STATUS_TTL: Duration = Duration::from_secs(3);
const TEST_ALARM_DELAY_SECS: i64 = 3;
const LOGGED_TIME_FORMAT: &str = "%H:%M:%S";

pub fn run_gui(
    history: HistoryStore,
    sound: SoundPlayer,
    search: Option<YoutubeSearch>,
) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Wakelink")
            .with_inner_size([780.0, 560.0])
            .with_min_inner_size([560.0, 420.0]),
        ..Default::default()
    };

    let app = WakelinkApp::new(history, sound, search);
    eframe::run_native(
        "Wakelink",
        native_options,
        Box::new(move |cc| {
            configure_theme(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow!("failed to launch Wakelink window: {err}"))?;

    Ok(())
}

fn configure_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(Color32::from_rgb(232, 228, 242));
    visuals.panel_fill = Color32::from_rgb(18, 14, 26);
    visuals.window_fill = Color32::from_rgb(24, 18, 34);
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(22, 16, 30);
    visuals.widgets.inactive.bg_fill = Color32::from_rgb(32, 24, 44);
    visuals.widgets.hovered.bg_fill = Color32::from_rgb(52, 38, 70);
    visuals.widgets.active.bg_fill = Color32::from_rgb(74, 52, 100);
    visuals.selection.bg_fill = Color32::from_rgb(150, 92, 196);
    visuals.hyperlink_color = Color32::from_rgb(226, 150, 120);
    ctx.set_visuals(visuals);
}

enum FetchReply {
    Picked { category: Category, url: String },
    Empty { category: Category },
    Failed { category: Category, message: String },
}

struct WakelinkApp {
    lifecycle: AlarmLifecycle,
    history: HistoryStore,
    sound: SoundPlayer,
    search: Option<Arc<YoutubeSearch>>,
    alarm_time_input: String,
    link_input: String,
    status_message: Option<(String, Instant)>,
    fetch_tx: Sender<FetchReply>,
    fetch_rx: Receiver<FetchReply>,
}

impl WakelinkApp {
    fn new(history: HistoryStore, sound: SoundPlayer, search: Option<YoutubeSearch>) -> Self {
        let (fetch_tx, fetch_rx) = channel();
        Self {
            lifecycle: AlarmLifecycle::new(),
            history,
            sound,
            search: search.map(Arc::new),
            alarm_time_input: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            link_input: String::new(),
            status_message: None,
            fetch_tx,
            fetch_rx,
        }
    }

    fn set_status(&mut self, text: impl Into<String>, ttl: Duration) {
        self.status_message = Some((text.into(), Instant::now() + ttl));
    }

    fn arm_from_form(&mut self, now: DateTime<Local>) -> Result<String> {
        let naive = parse_alarm_datetime(self.alarm_time_input.trim())?;
        let target = resolve_local_datetime(naive)
            .ok_or_else(|| anyhow!("'{naive}' does not exist in the local timezone"))?;
        self.lifecycle.arm_at(target, now);
        Ok(format!("Alarm set for {}", format_clock_time(target)))
    }

    fn arm_test_from_form(&mut self, now: DateTime<Local>) -> String {
        let selected = parse_alarm_datetime(self.alarm_time_input.trim())
            .ok()
            .and_then(resolve_local_datetime)
            .unwrap_or(now);
        self.lifecycle
            .arm_after(chrono::Duration::seconds(TEST_ALARM_DELAY_SECS), selected, now);
        format!(
            "Alarm rings in {TEST_ALARM_DELAY_SECS} seconds (logged as {})",
            format_clock_time(selected)
        )
    }

    fn stop_alarm(&mut self) {
        if let Some(armed_time) = self.lifecycle.armed_time() {
            self.history
                .append(format_clock_time(armed_time), self.link_input.clone());
        }
        self.sound.stop();
        self.lifecycle.stop();

        let link = self.link_input.trim().to_string();
        if !link.is_empty() {
            if let Err(err) = open::that(&link) {
                warn!("could not open {link}: {err}");
                self.set_status(format!("Could not open link: {err}"), STATUS_TTL);
                return;
            }
        }
        self.set_status("Alarm stopped.", STATUS_TTL);
    }

    fn request_recommendation(&mut self, category: Category) {
        let Some(search) = &self.search else {
            self.set_status(
                "YOUTUBE_API_KEY is not set; enter a link manually.",
                STATUS_TTL,
            );
            return;
        };

        let search = Arc::clone(search);
        let tx = self.fetch_tx.clone();
        thread::spawn(move || {
            let reply = match recommend::recommend(search.as_ref(), category) {
                Ok(RecommendOutcome::Picked(url)) => FetchReply::Picked { category, url },
                Ok(RecommendOutcome::Empty) => FetchReply::Empty { category },
                Err(err) => FetchReply::Failed {
                    category,
                    message: err.to_string(),
                },
            };
            let _ = tx.send(reply);
        });
        self.set_status(
            format!("Searching for a {} video...", category.label().to_lowercase()),
            STATUS_TTL,
        );
    }

    // Replies land whenever they arrive; the link text is overwritten
    // regardless of the current lifecycle state.
    fn drain_fetch_replies(&mut self) {
        while let Ok(reply) = self.fetch_rx.try_recv() {
            match reply {
                FetchReply::Picked { category, url } => {
                    self.link_input = url;
                    self.set_status(
                        format!("Picked a {} video.", category.label().to_lowercase()),
                        STATUS_TTL,
                    );
                }
                FetchReply::Empty { category } => {
                    self.set_status(
                        format!(
                            "No {} results; link unchanged.",
                            category.label().to_lowercase()
                        ),
                        STATUS_TTL,
                    );
                }
                FetchReply::Failed { category, message } => {
                    warn!(
                        "recommendation fetch for {} failed: {message}",
                        category.label()
                    );
                    self.set_status(format!("Recommendation failed: {message}"), STATUS_TTL);
                }
            }
        }
    }

    fn show_header(&mut self, ui: &mut Ui, now: DateTime<Local>) {
        ui.horizontal_wrapped(|ui| {
            ui.label(
                RichText::new("Wakelink")
                    .size(26.0)
                    .color(Color32::from_rgb(226, 150, 120))
                    .strong(),
            );
            ui.separator();
            ui.label(
                RichText::new(now.format("%H:%M:%S").to_string())
                    .size(26.0)
                    .color(Color32::from_rgb(255, 222, 148))
                    .strong(),
            );
            ui.label(
                RichText::new(now.format("%A, %B %d %Y").to_string())
                    .size(16.0)
                    .color(Color32::from_rgb(176, 166, 196)),
            );
        });

        if self.lifecycle.is_ringing() {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("ALARM RINGING")
                        .size(18.0)
                        .color(Color32::from_rgb(255, 104, 104))
                        .strong(),
                );
                if ui
                    .add(
                        egui::Button::new(
                            RichText::new("Stop Alarm")
                                .color(Color32::from_rgb(255, 226, 226))
                                .strong(),
                        )
                        .fill(Color32::from_rgb(128, 28, 36)),
                    )
                    .clicked()
                {
                    self.stop_alarm();
                }
            });
        } else if self.lifecycle.is_armed()
            && let Some(armed_time) = self.lifecycle.armed_time()
        {
            ui.label(
                RichText::new(format!("Alarm set for {}", format_clock_time(armed_time)))
                    .color(Color32::from_rgb(150, 222, 160))
                    .strong(),
            );
        }

        if let Some((msg, _)) = &self.status_message {
            ui.label(
                RichText::new(msg)
                    .color(Color32::from_rgb(222, 196, 140))
                    .strong(),
            );
        }
    }

    fn show_controls(&mut self, ui: &mut Ui, now: DateTime<Local>) {
        ui.heading(
            RichText::new("Alarm")
                .color(Color32::from_rgb(192, 146, 232))
                .strong(),
        );
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Alarm time");
            ui.add(TextEdit::singleline(&mut self.alarm_time_input).desired_width(180.0));
        });
        ui.horizontal(|ui| {
            if ui
                .add(
                    egui::Button::new(RichText::new("Set Alarm").strong())
                        .fill(Color32::from_rgb(58, 36, 86))
                        .min_size(egui::vec2(130.0, 26.0)),
                )
                .clicked()
            {
                match self.arm_from_form(now) {
                    Ok(msg) => self.set_status(msg, STATUS_TTL),
                    Err(err) => self.set_status(format!("Set alarm failed: {err}"), STATUS_TTL),
                }
            }
            if ui
                .add(
                    egui::Button::new(RichText::new("Set Alarm in 3 Seconds").strong())
                        .fill(Color32::from_rgb(40, 52, 92))
                        .min_size(egui::vec2(170.0, 26.0)),
                )
                .clicked()
            {
                let msg = self.arm_test_from_form(now);
                self.set_status(msg, STATUS_TTL);
            }
        });
        if self.lifecycle.pending_count() > 0
            && ui
                .button(format!(
                    "Cancel {} pending alarm(s)",
                    self.lifecycle.pending_count()
                ))
                .clicked()
        {
            let cancelled = self.lifecycle.cancel_pending();
            self.set_status(format!("Cancelled {cancelled} pending alarm(s)."), STATUS_TTL);
        }

        ui.separator();
        ui.heading(
            RichText::new("Video Link")
                .color(Color32::from_rgb(192, 146, 232))
                .strong(),
        );
        ui.add(
            TextEdit::singleline(&mut self.link_input)
                .hint_text("Enter video link")
                .desired_width(f32::INFINITY),
        );
        ui.horizontal(|ui| {
            for category in Category::ALL {
                if ui
                    .add(
                        egui::Button::new(RichText::new(category.label()).strong())
                            .fill(Color32::from_rgb(36, 74, 52)),
                    )
                    .clicked()
                {
                    self.request_recommendation(category);
                }
            }
        });
    }

    fn show_log(&mut self, ui: &mut Ui) {
        ui.heading(
            RichText::new("Alarm Log")
                .color(Color32::from_rgb(192, 146, 232))
                .strong(),
        );
        ui.add_space(4.0);

        if self.history.is_empty() {
            ui.label(
                RichText::new("No completed alarms yet.")
                    .color(Color32::from_rgb(255, 190, 106))
                    .strong(),
            );
            return;
        }

        ScrollArea::vertical().id_salt("log_scroll").show(ui, |ui| {
            egui::Grid::new("log_grid")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui| {
                    ui.label(RichText::new("Time").strong());
                    ui.label(RichText::new("Link").strong());
                    ui.end_row();

                    for entry in self.history.entries() {
                        ui.label(RichText::new(entry.time.clone()).monospace());
                        if entry.video_link.is_empty() {
                            ui.label("-");
                        } else {
                            ui.hyperlink_to("Watch", &entry.video_link);
                        }
                        ui.end_row();
                    }
                });
        });
    }
}

impl eframe::App for WakelinkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some((_, expires_at)) = &self.status_message
            && Instant::now() >= *expires_at
        {
            self.status_message = None;
        }

        self.drain_fetch_replies();

        let now = Local::now();
        let outcome = self.lifecycle.tick(now);
        for _ in 0..outcome.fired {
            self.sound.play();
        }
        if outcome.fired > 0 {
            self.set_status("Alarm ringing.", STATUS_TTL);
        }

        TopBottomPanel::top("header")
            .resizable(false)
            .show(ctx, |ui| self.show_header(ui, now));

        egui::SidePanel::right("controls_panel")
            .resizable(true)
            .min_width(300.0)
            .default_width(340.0)
            .show(ctx, |ui| self.show_controls(ui, now));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.with_layout(Layout::top_down(Align::Min), |ui| self.show_log(ui));
        });

        ctx.request_repaint_after(TICK_INTERVAL);
    }
}

fn format_clock_time(datetime: DateTime<Local>) -> String {
    datetime.format(LOGGED_TIME_FORMAT).to_string()
}

fn parse_alarm_datetime(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M"))
        .map_err(|_| anyhow!("invalid datetime '{input}'"))
}

fn resolve_local_datetime(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(first, _second) => Some(first),
        LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alarm_datetime_parser_accepts_iso_and_space_variants() {
        assert!(parse_alarm_datetime("2026-08-06T07:30:00").is_ok());
        assert!(parse_alarm_datetime("2026-08-06 07:30:00").is_ok());
        assert!(parse_alarm_datetime("2026-08-06T07:30").is_ok());
        assert!(parse_alarm_datetime("seven thirty").is_err());
    }

    #[test]
    fn plain_datetime_resolves_in_the_local_timezone() {
        let naive = parse_alarm_datetime("2026-01-15T12:00:00").expect("valid datetime");
        let resolved = resolve_local_datetime(naive).expect("resolvable");
        assert_eq!(resolved.naive_local(), naive);
    }

    #[test]
    fn clock_time_format_matches_the_logged_format() {
        let naive = parse_alarm_datetime("2026-08-06T07:05:09").expect("valid datetime");
        let resolved = resolve_local_datetime(naive).expect("resolvable");
        assert_eq!(format_clock_time(resolved), "07:05:09");
    }
}
