//! Media element abstraction.
//!
//! # Overview
//!
//! [`MediaElement`] is the interface the [`PlaybackController`] drives: one
//! playable track bound to the current `audioUrl`. It mirrors the handful of
//! `<audio>` operations the client needs (play, pause, rewind, paused flag,
//! ended flag, current position).
//!
//! [`MediaBackend`] creates elements for a URL. The production backend is
//! [`RodioBackend`](crate::playback::RodioBackend); the test doubles
//! [`FakeMediaElement`] / [`FakeBackend`] (available under `#[cfg(test)]`)
//! record every call so state-machine tests can check the element against
//! the controller.
//!
//! [`PlaybackController`]: crate::playback::PlaybackController

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors that can arise while binding or loading a track.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No audio output device could be opened.
    #[error("audio output unavailable: {0}")]
    Output(#[from] rodio::StreamError),

    /// A sink could not be attached to the output stream.
    #[error("failed to create audio sink: {0}")]
    Sink(#[from] rodio::PlayError),

    /// The track could not be fetched from its URL.
    #[error("failed to download track: {0}")]
    Download(String),

    /// The fetched bytes are not a decodable audio stream.
    #[error("failed to decode track: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

impl From<reqwest::Error> for PlaybackError {
    fn from(e: reqwest::Error) -> Self {
        PlaybackError::Download(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// MediaElement / MediaBackend traits
// ---------------------------------------------------------------------------

/// A single playable track.
///
/// # Contract
///
/// - A freshly opened element is paused at position 0.
/// - `play` on an element that has ended restarts it from position 0.
/// - `rewind` moves to position 0 without changing the paused flag.
/// - `has_ended` reports natural end of stream (or a load failure, which the
///   element treats as an immediately ended track).
/// - An ended element reports `is_paused() == true`.
pub trait MediaElement: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn rewind(&mut self);
    fn is_paused(&self) -> bool;
    fn has_ended(&self) -> bool;
    fn position(&self) -> Duration;
}

/// Factory for [`MediaElement`]s.
pub trait MediaBackend: Send + Sync {
    /// Create an element for `url`, paused at position 0.
    fn open(&self, url: &str) -> Result<Box<dyn MediaElement>, PlaybackError>;
}

// Compile-time assertion: both traits must be usable as trait objects.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn MediaElement>, _: Box<dyn MediaBackend>) {}
};

// ---------------------------------------------------------------------------
// FakeMediaElement / FakeBackend  (test-only)
// ---------------------------------------------------------------------------

/// Observable state of a [`FakeMediaElement`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct FakeMediaState {
    pub url: String,
    pub paused: bool,
    pub ended: bool,
    pub position: Duration,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub rewind_calls: usize,
    pub dropped: bool,
}

/// An in-memory element whose state is shared with the test through a
/// cloneable handle.
#[cfg(test)]
pub struct FakeMediaElement {
    state: std::sync::Arc<std::sync::Mutex<FakeMediaState>>,
}

#[cfg(test)]
impl FakeMediaElement {
    pub fn new(url: &str) -> (Self, FakeHandle) {
        let state = std::sync::Arc::new(std::sync::Mutex::new(FakeMediaState {
            url: url.to_string(),
            paused: true,
            ended: false,
            position: Duration::ZERO,
            play_calls: 0,
            pause_calls: 0,
            rewind_calls: 0,
            dropped: false,
        }));
        (
            Self {
                state: std::sync::Arc::clone(&state),
            },
            FakeHandle { state },
        )
    }
}

#[cfg(test)]
impl MediaElement for FakeMediaElement {
    fn play(&mut self) {
        let mut st = self.state.lock().unwrap();
        if st.ended {
            st.ended = false;
            st.position = Duration::ZERO;
        }
        st.paused = false;
        st.play_calls += 1;
    }

    fn pause(&mut self) {
        let mut st = self.state.lock().unwrap();
        st.paused = true;
        st.pause_calls += 1;
    }

    fn rewind(&mut self) {
        let mut st = self.state.lock().unwrap();
        st.position = Duration::ZERO;
        st.ended = false;
        st.rewind_calls += 1;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    fn has_ended(&self) -> bool {
        self.state.lock().unwrap().ended
    }

    fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }
}

#[cfg(test)]
impl Drop for FakeMediaElement {
    fn drop(&mut self) {
        if let Ok(mut st) = self.state.lock() {
            st.dropped = true;
        }
    }
}

/// Test-side view of a [`FakeMediaElement`].
#[cfg(test)]
#[derive(Clone)]
pub struct FakeHandle {
    state: std::sync::Arc<std::sync::Mutex<FakeMediaState>>,
}

#[cfg(test)]
impl FakeHandle {
    pub fn snapshot(&self) -> FakeMediaState {
        self.state.lock().unwrap().clone()
    }

    /// Simulate playback progress.
    pub fn advance(&self, by: Duration) {
        self.state.lock().unwrap().position += by;
    }

    /// Simulate the natural end of the stream.
    pub fn finish(&self) {
        let mut st = self.state.lock().unwrap();
        st.ended = true;
        st.paused = true;
    }
}

/// Backend handing out [`FakeMediaElement`]s and remembering their handles.
#[cfg(test)]
#[derive(Default)]
pub struct FakeBackend {
    opened: std::sync::Mutex<Vec<FakeHandle>>,
    fail: bool,
}

#[cfg(test)]
impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `open` always fails.
    pub fn failing() -> Self {
        Self {
            opened: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn opened(&self) -> Vec<FakeHandle> {
        self.opened.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<FakeHandle> {
        self.opened.lock().unwrap().last().cloned()
    }
}

#[cfg(test)]
impl MediaBackend for FakeBackend {
    fn open(&self, url: &str) -> Result<Box<dyn MediaElement>, PlaybackError> {
        if self.fail {
            return Err(PlaybackError::Download(format!("cannot open {url}")));
        }
        let (element, handle) = FakeMediaElement::new(url);
        self.opened.lock().unwrap().push(handle);
        Ok(Box::new(element))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
