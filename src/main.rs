//! Application entry point for Lyrically.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk, then apply the `LYRICALLY_API_URL`
//!    override. On first run the defaults are written out first.
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Open the default audio output. Without one the app still runs; tracks
//!    just cannot be played.
//! 5. Build the shared state, the HTTP service client and the
//!    [`SubmissionController`].
//! 6. Spawn the `/health` check on the runtime.
//! 7. Run [`eframe::run_native`], which blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use anyhow::Context as _;
use eframe::egui;
use lyrically::{
    api::{HttpTranscriptionService, TranscriptionService},
    app::LyricsApp,
    config::{AppConfig, AppPaths},
    playback::{open_default_output, MediaBackend, PlaybackController, RodioBackend},
    submission::{new_shared_state, SubmissionController},
};

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Lyrically")
        .with_inner_size([width, height])
        .with_min_inner_size([360.0, 320.0])
        .with_drag_and_drop(true);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Lyrically starting up");

    // 2. Configuration. First run leaves an editable settings file behind.
    let settings_file = AppPaths::new().settings_file;
    if !settings_file.exists() {
        match AppConfig::default().save_to(&settings_file) {
            Ok(()) => log::info!("Wrote default settings to {}", settings_file.display()),
            Err(e) => log::warn!("Could not write {} ({e})", settings_file.display()),
        }
    }
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        let mut config = AppConfig::default();
        config.apply_env_override(std::env::var(lyrically::config::API_URL_ENV).ok());
        config
    });

    // 3. Tokio runtime (network calls and track downloads)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Audio output. The stream must outlive every sink, so it is held
    //    until `main` returns.
    let (_output_stream, backend): (_, Option<Arc<dyn MediaBackend>>) = match open_default_output()
    {
        Ok((stream, handle)) => {
            log::info!("Audio output opened");
            let backend: Arc<dyn MediaBackend> = Arc::new(RodioBackend::new(
                handle,
                rt.handle().clone(),
                config.playback.volume,
            ));
            (Some(stream), Some(backend))
        }
        Err(e) => {
            log::warn!("{e}; playback disabled");
            (None, None)
        }
    };

    // 5. State, service, controller
    let state = new_shared_state(PlaybackController::new(backend));
    let http = HttpTranscriptionService::from_config(&config.service);
    log::info!("Transcription service: {}", http.base_url());
    let service: Arc<dyn TranscriptionService> = Arc::new(http);
    let controller = SubmissionController::new(state, service);

    // 6. Health check
    {
        let controller = controller.clone();
        rt.spawn(async move {
            controller.check_health().await;
        });
    }

    // 7. Build the egui app and run it (blocks until the window is closed)
    let app = LyricsApp::new(controller, rt.handle().clone(), config.clone());
    let options = native_options(&config);

    eframe::run_native("Lyrically", options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("window error: {e}"))
}
