//! Configuration module for the Lyrically client.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the service
//! connection, playback and window, `AppPaths` for the platform config
//! directory, and TOML persistence via `AppConfig::load` / `AppConfig::save_to`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, PlaybackConfig, ServiceConfig, UiConfig, API_URL_ENV, DEFAULT_BASE_URL};
