//! Client side of the remote transcription service.
//!
//! This module provides:
//! * [`TranscriptionService`]: async trait implemented by service backends.
//! * [`HttpTranscriptionService`]: reqwest client for `/api/upload`,
//!   `/api/transcribe` and `/health`.
//! * [`Transcript`], [`AudioFile`], [`HealthStatus`]: wire types.
//! * [`ApiError`]: error variants for service calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use lyrically::api::{HttpTranscriptionService, TranscriptionService};
//! use lyrically::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let service = HttpTranscriptionService::from_config(&config.service);
//!
//!     let transcript = service
//!         .transcribe("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await
//!         .unwrap();
//!     println!("{}\n\n{}", transcript.title, transcript.lyrics);
//! }
//! ```

pub mod client;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiError, HttpTranscriptionService, TranscriptionService};
pub use types::{AudioFile, HealthStatus, TranscribeRequest, Transcript};

// test-only re-export so the submission tests can reach the mock without the
// full `client::` path.
#[cfg(test)]
pub use client::{MockCall, MockResponse, MockTranscriptionService};
