//! Playback of the track returned with a transcript.
//!
//! # Architecture
//!
//! ```text
//! PlaybackController ── owns ──▶ Box<dyn MediaElement>   (one per audioUrl)
//!        │                              ▲
//!        └── opens through ─▶ MediaBackend
//!                              └─ RodioBackend → RodioElement (rodio::Sink)
//! ```

pub mod controller;
pub mod element;
pub mod rodio_element;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{PlaybackController, PlaybackState};
pub use element::{MediaBackend, MediaElement, PlaybackError};
pub use rodio_element::{open_default_output, RodioBackend, RodioElement};

#[cfg(test)]
pub use element::{FakeBackend, FakeHandle, FakeMediaElement};
