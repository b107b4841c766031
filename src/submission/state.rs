//! Submission state machine and shared application state.
//!
//! [`SubmissionState`] drives the submission controller's state machine. The
//! UI reads it via [`SharedState`] to render the result, the error line and
//! the enabled/disabled state of the submit button.
//!
//! [`AppState`] is the single source of truth for everything the UI needs:
//! the submission phase and its payload, the loading flag, the playback
//! controller for the bound track, and the last health check result.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<AppState>>`, cheap to clone
//! and safe to share between the UI thread and the runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::api::Transcript;
use crate::playback::PlaybackController;

// ---------------------------------------------------------------------------
// SubmissionError
// ---------------------------------------------------------------------------

/// User-facing submission failures. `Display` is the exact message shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Neither a file nor a URL was provided; nothing was sent.
    #[error("Please provide a YouTube URL or upload an MP3 file.")]
    MissingInput,

    /// The request was sent and failed for any reason.
    #[error("Something went wrong. Please try again.")]
    RequestFailed,
}

// ---------------------------------------------------------------------------
// SubmissionState
// ---------------------------------------------------------------------------

/// States of a submission.
///
/// ```text
/// Idle ──submit──▶ InFlight ──2xx + valid body──▶ Succeeded(transcript)
///                     │
///                     └──any failure──▶ Failed(RequestFailed)
/// Idle ──submit, no input──▶ Failed(MissingInput)
/// Succeeded / Failed ──submit──▶ InFlight (previous payload cleared)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Succeeded(Transcript),
    Failed(SubmissionError),
}

impl SubmissionState {
    /// Returns `true` while a request is outstanding.
    ///
    /// The UI uses this to disable the submit button.
    ///
    /// ```
    /// use lyrically::submission::SubmissionState;
    ///
    /// assert!(!SubmissionState::Idle.is_in_flight());
    /// assert!(SubmissionState::InFlight.is_in_flight());
    /// ```
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionState::InFlight)
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        match self {
            SubmissionState::Succeeded(t) => Some(t),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<SubmissionError> {
        match self {
            SubmissionState::Failed(e) => Some(*e),
            _ => None,
        }
    }

    /// Song title, empty unless `Succeeded`.
    pub fn song_title(&self) -> &str {
        self.transcript().map_or("", |t| t.title.as_str())
    }

    /// Lyrics, empty unless `Succeeded`.
    pub fn lyrics_text(&self) -> &str {
        self.transcript().map_or("", |t| t.lyrics.as_str())
    }

    /// Track URL, empty unless `Succeeded`.
    pub fn audio_url(&self) -> &str {
        self.transcript().map_or("", |t| t.audio_url.as_str())
    }

    /// Error message, empty unless `Failed`.
    pub fn error_message(&self) -> String {
        self.error().map(|e| e.to_string()).unwrap_or_default()
    }

    /// A short human-readable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "Idle",
            SubmissionState::InFlight => "Transcribing",
            SubmissionState::Succeeded(_) => "Done",
            SubmissionState::Failed(_) => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// ServiceHealth
// ---------------------------------------------------------------------------

/// Outcome of the start-up check of the service's `/health` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceHealth {
    #[default]
    Unknown,
    Healthy,
    /// The service answered but did not report itself healthy.
    Degraded,
    Unreachable,
}

impl ServiceHealth {
    /// Hover text for the status dot.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceHealth::Unknown => "Checking service...",
            ServiceHealth::Healthy => "Service reachable",
            ServiceHealth::Degraded => "Service degraded",
            ServiceHealth::Unreachable => "Service unreachable",
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state, the single source of truth for the UI.
///
/// Held behind [`SharedState`] (`Arc<Mutex<AppState>>`). The submission
/// controller mutates it; the egui update loop reads it each frame.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current phase of the submission and its payload.
    pub submission: SubmissionState,

    /// Set when a submission starts, cleared when it finishes either way.
    pub loading: bool,

    /// Play/pause state and the element bound to the current `audioUrl`.
    pub playback: PlaybackController,

    /// Result of the health check run at start-up.
    pub service_health: ServiceHealth,
}

impl AppState {
    pub fn new(playback: PlaybackController) -> Self {
        Self {
            submission: SubmissionState::Idle,
            loading: false,
            playback,
            service_health: ServiceHealth::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`].
///
/// Cheap to clone (`Arc` clone). Lock with [`lock_state`] for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<AppState>>;

/// Construct a new [`SharedState`] around `playback`.
pub fn new_shared_state(playback: PlaybackController) -> SharedState {
    Arc::new(Mutex::new(AppState::new(playback)))
}

/// Lock the shared state, recovering the data if a previous holder panicked.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackState;

    fn transcript() -> Transcript {
        Transcript {
            title: "Title".into(),
            lyrics: "Lyrics".into(),
            audio_url: "http://h/temp/t.mp3".into(),
        }
    }

    #[test]
    fn only_in_flight_is_in_flight() {
        assert!(!SubmissionState::Idle.is_in_flight());
        assert!(SubmissionState::InFlight.is_in_flight());
        assert!(!SubmissionState::Succeeded(transcript()).is_in_flight());
        assert!(!SubmissionState::Failed(SubmissionError::RequestFailed).is_in_flight());
    }

    #[test]
    fn payload_accessors_are_empty_outside_succeeded() {
        for state in [
            SubmissionState::Idle,
            SubmissionState::InFlight,
            SubmissionState::Failed(SubmissionError::MissingInput),
        ] {
            assert_eq!(state.song_title(), "");
            assert_eq!(state.lyrics_text(), "");
            assert_eq!(state.audio_url(), "");
        }
    }

    #[test]
    fn succeeded_exposes_payload() {
        let state = SubmissionState::Succeeded(transcript());
        assert_eq!(state.song_title(), "Title");
        assert_eq!(state.lyrics_text(), "Lyrics");
        assert_eq!(state.audio_url(), "http://h/temp/t.mp3");
        assert_eq!(state.error_message(), "");
    }

    #[test]
    fn error_messages_are_user_facing_text() {
        assert_eq!(
            SubmissionState::Failed(SubmissionError::MissingInput).error_message(),
            "Please provide a YouTube URL or upload an MP3 file."
        );
        assert_eq!(
            SubmissionState::Failed(SubmissionError::RequestFailed).error_message(),
            "Something went wrong. Please try again."
        );
        assert_eq!(SubmissionState::Idle.error_message(), "");
    }

    #[test]
    fn labels() {
        assert_eq!(SubmissionState::Idle.label(), "Idle");
        assert_eq!(SubmissionState::InFlight.label(), "Transcribing");
        assert_eq!(SubmissionState::Succeeded(transcript()).label(), "Done");
        assert_eq!(SubmissionState::Failed(SubmissionError::MissingInput).label(), "Error");
    }

    #[test]
    fn health_labels() {
        assert_eq!(ServiceHealth::Unknown.label(), "Checking service...");
        assert_eq!(ServiceHealth::Healthy.label(), "Service reachable");
        assert_eq!(ServiceHealth::Degraded.label(), "Service degraded");
        assert_eq!(ServiceHealth::Unreachable.label(), "Service unreachable");
    }

    #[test]
    fn app_state_defaults() {
        let state = AppState::default();
        assert_eq!(state.submission, SubmissionState::Idle);
        assert!(!state.loading);
        assert_eq!(state.playback.state(), PlaybackState::Stopped);
        assert_eq!(state.service_health, ServiceHealth::Unknown);
    }

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    #[test]
    fn shared_state_can_be_cloned_and_mutated() {
        let state = new_shared_state(PlaybackController::default());
        let state2 = Arc::clone(&state);

        lock_state(&state).submission = SubmissionState::InFlight;
        assert!(lock_state(&state2).submission.is_in_flight());
    }
}
