//! Submission side of the lyrics window.
//!
//! # Architecture
//!
//! ```text
//! InputForm (url, file)
//!        │ selection()
//!        ▼
//! InputSelection ──▶ SubmissionController::begin     [UI thread]
//!                           │ PendingRequest
//!                           ▼
//!                    SubmissionController::complete  [tokio task]
//!                           │
//!                           ├─ TranscriptionService::upload / transcribe
//!                           └─ PlaybackController::bind(audioUrl)
//!
//! SharedState (Arc<Mutex<AppState>>) ←─── read by egui update() each frame
//! ```

pub mod controller;
pub mod input;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{PendingRequest, SubmissionController};
pub use input::{is_mp3_path, InputError, InputForm, InputSelection};
pub use state::{
    lock_state, new_shared_state, AppState, ServiceHealth, SharedState, SubmissionError,
    SubmissionState,
};
