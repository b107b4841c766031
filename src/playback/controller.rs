//! Playback state machine.
//!
//! [`PlaybackController`] keeps [`PlaybackState`] consistent with the single
//! bound [`MediaElement`].
//!
//! ```text
//! Stopped ──toggle──▶ Playing
//! Playing ──toggle──▶ Stopped
//! Playing ──track ended──▶ Stopped
//! any     ──force_stop──▶ Stopped   (pause + rewind to 0)
//! ```
//!
//! The element is bound to the current `audioUrl` by [`bind`] and dropped by
//! [`unbind`]. Both leave the controller `Stopped`.
//!
//! [`bind`]: PlaybackController::bind
//! [`unbind`]: PlaybackController::unbind

use std::sync::Arc;
use std::time::Duration;

use super::element::{MediaBackend, MediaElement};

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// Whether the bound track is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

impl PlaybackState {
    /// Label for the play/pause control.
    pub fn control_label(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "Play",
            PlaybackState::Playing => "Pause",
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackController
// ---------------------------------------------------------------------------

/// Owns the bound media element and its play/pause state.
pub struct PlaybackController {
    state: PlaybackState,
    element: Option<Box<dyn MediaElement>>,
    bound_url: Option<String>,
    backend: Option<Arc<dyn MediaBackend>>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("bound_url", &self.bound_url)
            .field("has_element", &self.element.is_some())
            .field("has_backend", &self.backend.is_some())
            .finish()
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PlaybackController {
    /// Create a controller that opens elements through `backend`.
    ///
    /// With `None` (no audio output available) binding never produces an
    /// element and [`toggle`](Self::toggle) stays a no-op.
    pub fn new(backend: Option<Arc<dyn MediaBackend>>) -> Self {
        Self {
            state: PlaybackState::Stopped,
            element: None,
            bound_url: None,
            backend,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// `true` when an element is bound and can be toggled.
    pub fn is_bound(&self) -> bool {
        self.element.is_some()
    }

    /// URL of the bound track, if any.
    pub fn bound_url(&self) -> Option<&str> {
        self.bound_url.as_deref()
    }

    /// Current position of the bound element.
    pub fn position(&self) -> Option<Duration> {
        self.element.as_ref().map(|e| e.position())
    }

    /// Flip between playing and paused. No-op when nothing is bound.
    pub fn toggle(&mut self) {
        let Some(element) = self.element.as_mut() else {
            log::debug!("playback: toggle ignored, no element bound");
            return;
        };

        match self.state {
            PlaybackState::Playing => {
                element.pause();
                self.state = PlaybackState::Stopped;
            }
            PlaybackState::Stopped => {
                element.play();
                self.state = PlaybackState::Playing;
            }
        }
        log::debug!("playback: toggled → {:?}", self.state);
    }

    /// End-of-stream signal from the element.
    pub fn on_track_ended(&mut self) {
        log::debug!("playback: track ended");
        self.state = PlaybackState::Stopped;
    }

    /// Pause the bound element, rewind it to the start and enter `Stopped`.
    pub fn force_stop(&mut self) {
        if let Some(element) = self.element.as_mut() {
            element.pause();
            element.rewind();
        }
        self.state = PlaybackState::Stopped;
    }

    /// Bind a fresh element for `url`, replacing any previous one.
    ///
    /// The controller is `Stopped` afterwards whether or not the element
    /// could be opened.
    pub fn bind(&mut self, url: &str) {
        self.unbind();
        self.bound_url = Some(url.to_string());

        let Some(backend) = self.backend.as_ref() else {
            log::warn!("playback: no audio output, track {url} will not be playable");
            return;
        };

        match backend.open(url) {
            Ok(element) => {
                log::debug!("playback: bound {url}");
                self.element = Some(element);
            }
            Err(e) => {
                log::warn!("playback: could not open {url}: {e}");
            }
        }
    }

    /// Drop the bound element (if any) and enter `Stopped`.
    pub fn unbind(&mut self) {
        if let Some(mut element) = self.element.take() {
            element.pause();
        }
        self.bound_url = None;
        self.state = PlaybackState::Stopped;
    }

    /// Forward the element's end-of-stream to [`on_track_ended`].
    ///
    /// Called once per UI frame. Returns `true` when a transition happened.
    ///
    /// [`on_track_ended`]: Self::on_track_ended
    pub fn poll_ended(&mut self) -> bool {
        let ended = self.is_playing() && self.element.as_ref().is_some_and(|e| e.has_ended());
        if ended {
            self.on_track_ended();
        }
        ended
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::element::FakeBackend;

    fn bound_controller(url: &str) -> (PlaybackController, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::new());
        let mut ctl = PlaybackController::new(Some(backend.clone() as Arc<dyn MediaBackend>));
        ctl.bind(url);
        (ctl, backend)
    }

    #[test]
    fn starts_stopped_and_unbound() {
        let ctl = PlaybackController::default();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(!ctl.is_bound());
        assert!(ctl.position().is_none());
    }

    #[test]
    fn toggle_without_element_is_noop() {
        let mut ctl = PlaybackController::default();
        ctl.toggle();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
    }

    #[test]
    fn toggle_round_trip_keeps_paused_flag_in_sync() {
        let (mut ctl, backend) = bound_controller("http://h/temp/a.mp3");
        let element = backend.last().unwrap();

        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(element.snapshot().paused);

        ctl.toggle();
        assert_eq!(ctl.state(), PlaybackState::Playing);
        assert!(!element.snapshot().paused);

        ctl.toggle();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(element.snapshot().paused);
    }

    #[test]
    fn force_stop_pauses_and_rewinds() {
        let (mut ctl, backend) = bound_controller("u");
        let element = backend.last().unwrap();

        ctl.toggle();
        element.advance(Duration::from_secs(42));
        assert_eq!(ctl.position(), Some(Duration::from_secs(42)));

        ctl.force_stop();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        let snap = element.snapshot();
        assert!(snap.paused);
        assert_eq!(snap.position, Duration::ZERO);
        assert_eq!(snap.rewind_calls, 1);
    }

    #[test]
    fn force_stop_without_element_is_safe() {
        let mut ctl = PlaybackController::default();
        ctl.force_stop();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
    }

    #[test]
    fn track_end_stops_playing_controller() {
        let (mut ctl, backend) = bound_controller("u");
        let element = backend.last().unwrap();

        ctl.toggle();
        assert!(!ctl.poll_ended());

        element.finish();
        assert!(ctl.poll_ended());
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(element.snapshot().paused);

        // Already stopped: nothing more to forward.
        assert!(!ctl.poll_ended());
    }

    #[test]
    fn play_after_end_restarts_from_zero() {
        let (mut ctl, backend) = bound_controller("u");
        let element = backend.last().unwrap();

        ctl.toggle();
        element.advance(Duration::from_secs(200));
        element.finish();
        ctl.poll_ended();

        ctl.toggle();
        assert_eq!(ctl.state(), PlaybackState::Playing);
        let snap = element.snapshot();
        assert!(!snap.paused);
        assert_eq!(snap.position, Duration::ZERO);
    }

    #[test]
    fn on_track_ended_is_unconditional() {
        let mut ctl = PlaybackController::default();
        ctl.on_track_ended();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
    }

    #[test]
    fn rebind_drops_previous_element_and_stops() {
        let (mut ctl, backend) = bound_controller("first");
        let first = backend.last().unwrap();
        ctl.toggle();

        ctl.bind("second");
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert_eq!(ctl.bound_url(), Some("second"));
        assert!(first.snapshot().dropped);
        assert!(first.snapshot().paused);

        let second = backend.last().unwrap();
        assert_eq!(second.snapshot().url, "second");
        assert!(second.snapshot().paused);
    }

    #[test]
    fn unbind_clears_url_and_element() {
        let (mut ctl, backend) = bound_controller("u");
        ctl.toggle();
        ctl.unbind();

        assert!(!ctl.is_bound());
        assert!(ctl.bound_url().is_none());
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(backend.last().unwrap().snapshot().dropped);
    }

    #[test]
    fn failed_open_leaves_url_but_no_element() {
        let backend: Arc<dyn MediaBackend> = Arc::new(FakeBackend::failing());
        let mut ctl = PlaybackController::new(Some(backend));
        ctl.bind("http://h/missing.mp3");

        assert_eq!(ctl.bound_url(), Some("http://h/missing.mp3"));
        assert!(!ctl.is_bound());
        ctl.toggle();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
    }

    #[test]
    fn control_label() {
        assert_eq!(PlaybackState::Stopped.control_label(), "Play");
        assert_eq!(PlaybackState::Playing.control_label(), "Pause");
    }
}
