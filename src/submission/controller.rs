//! Submission controller: input, one service call, result state.
//!
//! [`SubmissionController`] owns a [`SharedState`] handle and a
//! [`TranscriptionService`].
//!
//! # Submission flow
//!
//! ```text
//! begin(input)                                   [UI thread, one lock]
//!   ├─ InFlight already? → refuse, nothing changes
//!   ├─ clear payload + error, InFlight, loading = true
//!   ├─ playback.force_stop() + unbind()
//!   └─ branch
//!        ├─ File → PendingRequest::Upload
//!        ├─ Url  → PendingRequest::Transcribe
//!        └─ None → Failed(MissingInput), loading = false, no request
//!
//! complete(request)                              [tokio task]
//!   ├─ service.upload / service.transcribe      (lock NOT held)
//!   └─ one lock:
//!        ├─ Ok  → Succeeded(transcript) + playback.bind(audioUrl)
//!        ├─ Err → Failed(RequestFailed)
//!        └─ loading = false
//! ```
//!
//! There is no cancellation and no timeout: a request runs until the service
//! answers or the transport fails.

use std::sync::Arc;

use crate::api::{AudioFile, TranscriptionService};

use super::input::InputSelection;
use super::state::{lock_state, ServiceHealth, SharedState, SubmissionError, SubmissionState};

// ---------------------------------------------------------------------------
// PendingRequest
// ---------------------------------------------------------------------------

/// The single network call an accepted submission will make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRequest {
    Upload(AudioFile),
    Transcribe(String),
}

// ---------------------------------------------------------------------------
// SubmissionController
// ---------------------------------------------------------------------------

/// Drives submissions against the transcription service.
///
/// Cheap to clone; clones share the same state and service.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use lyrically::api::HttpTranscriptionService;
/// use lyrically::config::AppConfig;
/// use lyrically::playback::PlaybackController;
/// use lyrically::submission::{new_shared_state, InputSelection, SubmissionController};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let state = new_shared_state(PlaybackController::default());
/// let service = Arc::new(HttpTranscriptionService::from_config(&config.service));
///
/// let controller = SubmissionController::new(state, service);
/// controller
///     .submit(InputSelection::Url("https://youtu.be/dQw4w9WgXcQ".into()))
///     .await;
/// # }
/// ```
#[derive(Clone)]
pub struct SubmissionController {
    state: SharedState,
    service: Arc<dyn TranscriptionService>,
}

impl SubmissionController {
    pub fn new(state: SharedState, service: Arc<dyn TranscriptionService>) -> Self {
        Self { state, service }
    }

    /// The state this controller mutates.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Run a whole submission: [`begin`](Self::begin) then
    /// [`complete`](Self::complete).
    pub async fn submit(&self, input: InputSelection) {
        if let Some(request) = self.begin(input) {
            self.complete(request).await;
        }
    }

    /// Start a submission.
    ///
    /// Returns the request to send, or `None` when the submission was refused
    /// (one already in flight) or failed validation (`MissingInput`).
    pub fn begin(&self, input: InputSelection) -> Option<PendingRequest> {
        let mut st = lock_state(&self.state);

        if st.submission.is_in_flight() {
            log::warn!("submission: refused, a request is already in flight");
            return None;
        }

        let previous = st.submission.label();
        st.submission = SubmissionState::InFlight;
        st.loading = true;
        st.playback.force_stop();
        st.playback.unbind();

        match input {
            InputSelection::File(file) => {
                log::debug!("submission: {previous} → InFlight (upload {:?})", file.name);
                Some(PendingRequest::Upload(file))
            }
            InputSelection::Url(url) => {
                log::debug!("submission: {previous} → InFlight (transcribe {url:?})");
                Some(PendingRequest::Transcribe(url))
            }
            InputSelection::None => {
                log::debug!("submission: no input, nothing sent");
                st.submission = SubmissionState::Failed(SubmissionError::MissingInput);
                st.loading = false;
                None
            }
        }
    }

    /// Send `request` and apply its outcome.
    pub async fn complete(&self, request: PendingRequest) {
        let result = match &request {
            PendingRequest::Upload(file) => self.service.upload(file).await,
            PendingRequest::Transcribe(url) => self.service.transcribe(url).await,
        };

        let mut st = lock_state(&self.state);
        match result {
            Ok(transcript) => {
                log::info!("submission: transcribed {:?}", transcript.title);
                st.playback.bind(&transcript.audio_url);
                st.submission = SubmissionState::Succeeded(transcript);
            }
            Err(e) => {
                log::error!("submission failed: {e}");
                st.submission = SubmissionState::Failed(SubmissionError::RequestFailed);
            }
        }
        st.loading = false;
    }

    /// Check the service once and record the outcome in the shared state.
    pub async fn check_health(&self) -> ServiceHealth {
        let health = match self.service.health().await {
            Ok(status) if status.is_healthy() => {
                log::info!("service healthy ({})", status.service);
                ServiceHealth::Healthy
            }
            Ok(status) => {
                log::warn!("service reports status {:?}", status.status);
                ServiceHealth::Degraded
            }
            Err(e) => {
                log::warn!("service health check failed: {e}");
                ServiceHealth::Unreachable
            }
        };
        lock_state(&self.state).service_health = health;
        health
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
