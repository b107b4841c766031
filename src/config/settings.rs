//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Service address used when neither the settings file nor the environment
/// provide one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";

/// Environment variable that overrides [`ServiceConfig::base_url`].
pub const API_URL_ENV: &str = "LYRICALLY_API_URL";

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Connection settings for the remote transcription service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the service, e.g. `http://localhost:5001`.
    ///
    /// Endpoints (`/api/upload`, `/api/transcribe`, `/health`) are joined onto
    /// it with [`ServiceConfig::endpoint`].
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

impl ServiceConfig {
    /// Join `path` onto the base URL, tolerating a trailing `/` on the base.
    ///
    /// ```
    /// use lyrically::config::ServiceConfig;
    ///
    /// let cfg = ServiceConfig { base_url: "http://host:5001/".into() };
    /// assert_eq!(cfg.endpoint("/api/upload"), "http://host:5001/api/upload");
    /// ```
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Settings for the audio track returned with each transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Output volume (0.0 – 1.0) applied to every bound track.
    pub volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { volume: 1.0 }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Keep the window floating above all other windows.
    pub always_on_top: bool,
    /// Initial inner window size `(width, height)` in points.
    pub window_size: (f32, f32),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            always_on_top: false,
            window_size: (520.0, 640.0),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use lyrically::config::AppConfig;
///
/// // Load (returns Default when file is missing, env override applied)
/// let config = AppConfig::load().unwrap();
/// println!("service: {}", config.service.base_url);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote transcription service connection.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Audio playback settings.
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Window settings.
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml` and
    /// apply the [`API_URL_ENV`] override.
    ///
    /// Returns the defaults when the file does not exist yet (first run).
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&AppPaths::new().settings_file)?;
        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Replace the service base URL with `value` when it is set and
    /// non-empty.
    pub fn apply_env_override(&mut self, value: Option<String>) {
        match value {
            Some(url) if !url.trim().is_empty() => {
                log::debug!("config: service URL overridden by {API_URL_ENV}");
                self.service.base_url = url.trim().to_string();
            }
            _ => {}
        }
    }

    /// Write the configuration to `path` as TOML, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.service.base_url, loaded.service.base_url);
        assert_eq!(original.playback.volume, loaded.playback.volume);
        assert_eq!(original.ui.always_on_top, loaded.ui.always_on_top);
        assert_eq!(original.ui.window_size, loaded.ui.window_size);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn partial_file_fills_missing_sections_with_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[service]\nbase_url = \"https://lyrics.example\"\n")
            .expect("write");

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.service.base_url, "https://lyrics.example");
        assert_eq!(config.playback.volume, 1.0);
        assert!(!config.ui.always_on_top);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.service.base_url, "http://localhost:5001");
        assert_eq!(cfg.playback.volume, 1.0);
        assert_eq!(cfg.ui.window_size, (520.0, 640.0));
    }

    #[test]
    fn env_override_replaces_base_url() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_override(Some("https://api.lyrically.app".into()));
        assert_eq!(cfg.service.base_url, "https://api.lyrically.app");
    }

    #[test]
    fn empty_env_override_is_ignored() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_override(Some("   ".into()));
        assert_eq!(cfg.service.base_url, DEFAULT_BASE_URL);

        cfg.apply_env_override(None);
        assert_eq!(cfg.service.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn endpoint_joins_with_and_without_trailing_slash() {
        let plain = ServiceConfig {
            base_url: "http://localhost:5001".into(),
        };
        let slashed = ServiceConfig {
            base_url: "http://localhost:5001/".into(),
        };
        assert_eq!(plain.endpoint("/api/transcribe"), "http://localhost:5001/api/transcribe");
        assert_eq!(slashed.endpoint("api/transcribe"), "http://localhost:5001/api/transcribe");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.service.base_url = "https://backend.example:8443".into();
        cfg.playback.volume = 0.4;
        cfg.ui.always_on_top = true;
        cfg.ui.window_size = (800.0, 900.0);

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.service.base_url, "https://backend.example:8443");
        assert!((loaded.playback.volume - 0.4).abs() < f32::EPSILON);
        assert!(loaded.ui.always_on_top);
        assert_eq!(loaded.ui.window_size, (800.0, 900.0));
    }
}
