//! Lyrics window: the egui/eframe application.
//!
//! # Architecture
//!
//! [`LyricsApp`] is the top-level [`eframe::App`]. It owns the two input
//! fields ([`InputForm`]) and a [`SubmissionController`]; everything else it
//! shows is read from the [`SharedState`] once per frame into a [`ViewModel`].
//!
//! A click on "Generate Lyrics" calls [`SubmissionController::begin`] on the
//! UI thread, so the button is disabled from the very next frame, and spawns
//! [`SubmissionController::complete`] on the tokio runtime.
//!
//! # Layout
//!
//! | Element | Shown when |
//! |---------|------------|
//! | URL field, file field, "Generate Lyrics" | always |
//! | Error line | `SubmissionState::Failed` |
//! | Song title | non-empty title |
//! | Play / Pause | an `audioUrl` is bound |
//! | Lyrics box | non-empty lyrics |

use std::path::Path;
use std::time::Duration;

use eframe::egui;

use crate::config::AppConfig;
use crate::submission::{
    lock_state, AppState, InputForm, ServiceHealth, SharedState, SubmissionController,
};

const SUBMIT_LABEL: &str = "Generate Lyrics";
const SUBMIT_BUSY_LABEL: &str = "Transcribing...";

// ---------------------------------------------------------------------------
// ViewModel
// ---------------------------------------------------------------------------

/// A copy of the shared state taken under one short lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub busy: bool,
    pub submit_label: &'static str,
    pub error: String,
    pub title: String,
    pub lyrics: String,
    /// `Some(label)` when a track is bound and the play/pause control shows.
    pub playback_label: Option<&'static str>,
    pub playing: bool,
    pub position: Option<Duration>,
    pub health: ServiceHealth,
}

impl ViewModel {
    pub fn from_state(state: &AppState) -> Self {
        let busy = state.loading || state.submission.is_in_flight();
        let playback = &state.playback;
        Self {
            busy,
            submit_label: if busy { SUBMIT_BUSY_LABEL } else { SUBMIT_LABEL },
            error: state.submission.error_message(),
            title: state.submission.song_title().to_string(),
            lyrics: state.submission.lyrics_text().to_string(),
            playback_label: playback.is_bound().then(|| playback.state().control_label()),
            playing: playback.is_playing(),
            position: playback.position(),
            health: state.service_health,
        }
    }
}

// ---------------------------------------------------------------------------
// LyricsApp
// ---------------------------------------------------------------------------

/// The lyrics transcriber window.
pub struct LyricsApp {
    // ── Input ────────────────────────────────────────────────────────────
    form: InputForm,
    /// Contents of the file path text box, applied with "Load".
    path_input: String,
    /// Problem with the last file selection, shown under the file field.
    input_error: Option<String>,

    // ── Submission ───────────────────────────────────────────────────────
    controller: SubmissionController,
    runtime: tokio::runtime::Handle,

    /// Application configuration (read-only after startup).
    config: AppConfig,
}

impl LyricsApp {
    /// * `controller` — drives submissions against the shared state.
    /// * `runtime`    — tokio runtime the network calls are spawned on.
    /// * `config`     — loaded application configuration.
    pub fn new(
        controller: SubmissionController,
        runtime: tokio::runtime::Handle,
        config: AppConfig,
    ) -> Self {
        Self {
            form: InputForm::default(),
            path_input: String::new(),
            input_error: None,
            controller,
            runtime,
            config,
        }
    }

    fn state(&self) -> &SharedState {
        self.controller.state()
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn submit(&mut self) {
        let Some(request) = self.controller.begin(self.form.selection()) else {
            return;
        };
        let controller = self.controller.clone();
        self.runtime.spawn(async move {
            controller.complete(request).await;
        });
    }

    fn toggle_playback(&self) {
        lock_state(self.state()).playback.toggle();
    }

    fn load_typed_path(&mut self) {
        let path = self.path_input.trim().to_string();
        if path.is_empty() {
            return;
        }
        let result = self.form.select_path(Path::new(&path));
        self.record_selection(result);
    }

    /// Select files dropped onto the window this frame. The last usable one wins.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let result = match (&file.path, &file.bytes) {
                (Some(path), _) => {
                    self.path_input = path.display().to_string();
                    self.form.select_path(path)
                }
                (None, Some(bytes)) => self.form.select_bytes(&file.name, bytes.to_vec()),
                (None, None) => continue,
            };
            self.record_selection(result);
        }
    }

    fn record_selection(&mut self, result: Result<(), crate::submission::InputError>) {
        match result {
            Ok(()) => self.input_error = None,
            Err(e) => {
                log::warn!("file selection rejected: {e}");
                self.input_error = Some(e.to_string());
            }
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_header(&self, ui: &mut egui::Ui, view: &ViewModel) {
        ui.horizontal(|ui| {
            ui.heading("🎵 AI Lyrics Transcriber");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let color = match view.health {
                    ServiceHealth::Unknown => egui::Color32::GRAY,
                    ServiceHealth::Healthy => egui::Color32::from_rgb(80, 200, 120),
                    ServiceHealth::Degraded => egui::Color32::from_rgb(230, 200, 80),
                    ServiceHealth::Unreachable => egui::Color32::from_rgb(255, 136, 68),
                };
                ui.label(egui::RichText::new("●").color(color))
                    .on_hover_text(format!("{}\n{}", view.health.label(), self.config.service.base_url));
            });
        });
    }

    fn draw_inputs(&mut self, ui: &mut egui::Ui, view: &ViewModel) {
        ui.add(
            egui::TextEdit::singleline(&mut self.form.url)
                .hint_text("Paste a YouTube URL...")
                .desired_width(f32::INFINITY),
        );

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .hint_text("Path to an .mp3 file, or drop one here"),
            );
            let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Load").clicked() || entered {
                self.load_typed_path();
            }
            if self.form.file.is_some() && ui.small_button("x").on_hover_text("Clear file").clicked()
            {
                self.form.clear_file();
                self.path_input.clear();
            }
        });

        if let Some(file) = &self.form.file {
            ui.label(
                egui::RichText::new(format!("Selected: {}", file.name))
                    .color(egui::Color32::from_rgb(140, 140, 140))
                    .size(11.0),
            );
        }
        if let Some(err) = &self.input_error {
            ui.label(
                egui::RichText::new(err.as_str())
                    .color(egui::Color32::from_rgb(255, 136, 68))
                    .size(11.0),
            );
        }

        ui.add_space(6.0);
        let button = egui::Button::new(view.submit_label);
        if ui.add_enabled(!view.busy, button).clicked() {
            self.submit();
        }
    }

    fn draw_result(&self, ui: &mut egui::Ui, view: &ViewModel) {
        if !view.error.is_empty() {
            ui.add_space(6.0);
            ui.label(
                egui::RichText::new(view.error.as_str())
                    .color(egui::Color32::from_rgb(255, 100, 100)),
            );
        }

        if !view.title.is_empty() {
            ui.add_space(8.0);
            ui.label(egui::RichText::new(format!("🎶 {}", view.title)).size(18.0).strong());
        }

        if let Some(label) = view.playback_label {
            ui.horizontal(|ui| {
                if ui.button(label).clicked() {
                    self.toggle_playback();
                }
                if let Some(pos) = view.position {
                    let secs = pos.as_secs();
                    ui.label(
                        egui::RichText::new(format!("{}:{:02}", secs / 60, secs % 60))
                            .color(egui::Color32::from_rgb(140, 140, 140)),
                    );
                }
            });
        }

        if !view.lyrics.is_empty() {
            ui.add_space(8.0);
            egui::Frame::group(ui.style()).show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.label(view.lyrics.as_str());
                    });
            });
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for LyricsApp {
    /// Called every frame by eframe. Forwards end-of-track, snapshots the
    /// shared state, then renders.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        let view = {
            let mut st = lock_state(self.state());
            st.playback.poll_ended();
            ViewModel::from_state(&st)
        };

        // Nothing pushes frames from the runtime, so keep polling while a
        // request or a track is running.
        if view.busy || view.playing {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if view.health == ServiceHealth::Unknown {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_header(ui, &view);
            ui.separator();
            self.draw_inputs(ui, &view);
            self.draw_result(ui, &view);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let mut st = lock_state(self.state());
        st.playback.unbind();
        log::info!("lyrics window closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
