//! Speaker output via `rodio`.
//!
//! [`RodioBackend`] opens one [`RodioElement`] per bound `audioUrl`. Each
//! element owns a `rodio::Sink` on the shared output stream and starts
//! fetching the track in the background as soon as it is created, the way an
//! `<audio src>` element preloads. Until the bytes arrive the element is a
//! paused, empty sink; `play` during that window takes effect once the
//! decoded source is queued.
//!
//! The downloaded bytes are cached so rewinding (and replaying after the end)
//! re-queues a fresh decoder instead of seeking.

use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::element::{MediaBackend, MediaElement, PlaybackError};

/// Open the default output device.
///
/// The returned `OutputStream` must be kept alive for as long as anything
/// plays; dropping it silences every sink created from the handle.
pub fn open_default_output() -> Result<(OutputStream, OutputStreamHandle), PlaybackError> {
    Ok(OutputStream::try_default()?)
}

// ---------------------------------------------------------------------------
// RodioBackend
// ---------------------------------------------------------------------------

/// Creates [`RodioElement`]s on a shared output stream.
#[derive(Clone)]
pub struct RodioBackend {
    output: OutputStreamHandle,
    runtime: tokio::runtime::Handle,
    client: reqwest::Client,
    volume: f32,
}

impl RodioBackend {
    /// * `output`  — handle of the stream opened by [`open_default_output`].
    /// * `runtime` — tokio runtime the track downloads are spawned on.
    /// * `volume`  — sink volume, clamped to `0.0 ..= 1.0`.
    pub fn new(output: OutputStreamHandle, runtime: tokio::runtime::Handle, volume: f32) -> Self {
        Self {
            output,
            runtime,
            client: reqwest::Client::new(),
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl MediaBackend for RodioBackend {
    fn open(&self, url: &str) -> Result<Box<dyn MediaElement>, PlaybackError> {
        let sink = Sink::try_new(&self.output)?;
        sink.pause();
        sink.set_volume(self.volume);

        let element = RodioElement {
            sink: Arc::new(sink),
            track: Arc::new(Mutex::new(TrackSlot::default())),
        };

        let sink = Arc::clone(&element.sink);
        let track = Arc::clone(&element.track);
        let client = self.client.clone();
        let url = url.to_string();

        self.runtime.spawn(async move {
            let fetched = fetch_track(&client, &url).await;
            store_download(&sink, &track, &url, fetched);
        });

        Ok(Box::new(element))
    }
}

async fn fetch_track(client: &reqwest::Client, url: &str) -> Result<Arc<[u8]>, PlaybackError> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    Ok(Arc::from(&bytes[..]))
}

/// Hand a finished download to the element, unless it was dropped meanwhile.
fn store_download(
    sink: &Sink,
    track: &Mutex<TrackSlot>,
    url: &str,
    fetched: Result<Arc<[u8]>, PlaybackError>,
) {
    let mut slot = lock(track);
    if slot.released {
        log::debug!("playback: discarding late download of {url}");
        return;
    }

    match fetched.and_then(|bytes| queue_source(sink, &bytes).map(|()| bytes)) {
        Ok(bytes) => {
            log::debug!("playback: loaded {url} ({} bytes)", bytes.len());
            slot.audio = Some(bytes);
        }
        Err(e) => {
            log::warn!("playback: {e}");
            slot.failed = true;
        }
    }
}

fn queue_source(sink: &Sink, audio: &Arc<[u8]>) -> Result<(), PlaybackError> {
    let source = Decoder::new(Cursor::new(Arc::clone(audio)))?;
    sink.append(source);
    Ok(())
}

fn lock(track: &Mutex<TrackSlot>) -> MutexGuard<'_, TrackSlot> {
    track.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// RodioElement
// ---------------------------------------------------------------------------

/// Download state shared between the element and its loader task.
#[derive(Default)]
struct TrackSlot {
    /// Encoded track, present once the download succeeded.
    audio: Option<Arc<[u8]>>,
    /// Download or decode failed; reported as an ended track.
    failed: bool,
    /// The element was dropped; the loader must not touch the sink.
    released: bool,
}

/// One track playing through a `rodio::Sink`.
pub struct RodioElement {
    sink: Arc<Sink>,
    track: Arc<Mutex<TrackSlot>>,
}

impl RodioElement {
    /// Replace whatever is queued with a fresh decoder at position 0.
    fn requeue(&self, audio: &Arc<[u8]>) {
        // `clear` also pauses the sink.
        self.sink.clear();
        if let Err(e) = queue_source(&self.sink, audio) {
            log::warn!("playback: {e}");
        }
    }
}

impl MediaElement for RodioElement {
    fn play(&mut self) {
        let slot = lock(&self.track);
        if let Some(audio) = slot.audio.as_ref() {
            if self.sink.empty() {
                self.requeue(audio);
            }
        }
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn rewind(&mut self) {
        let slot = lock(&self.track);
        if let Some(audio) = slot.audio.as_ref() {
            let was_paused = self.sink.is_paused();
            self.requeue(audio);
            if !was_paused {
                self.sink.play();
            }
        }
    }

    /// An ended track counts as paused, even though rodio leaves the sink
    /// in its playing state once the queue runs dry.
    fn is_paused(&self) -> bool {
        self.sink.is_paused() || self.has_ended()
    }

    fn has_ended(&self) -> bool {
        let slot = lock(&self.track);
        slot.failed || (slot.audio.is_some() && self.sink.empty())
    }

    fn position(&self) -> Duration {
        if self.sink.empty() {
            Duration::ZERO
        } else {
            self.sink.get_pos()
        }
    }
}

impl Drop for RodioElement {
    fn drop(&mut self) {
        lock(&self.track).released = true;
        self.sink.stop();
    }
}
