//! Lyrically: a desktop client for a lyrics transcription service.
//!
//! Submit a web-video URL or an `.mp3` file, read back the song title and
//! transcribed lyrics, and play the returned track.

pub mod api;
pub mod app;
pub mod config;
pub mod playback;
pub mod submission;
