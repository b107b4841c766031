//! Wire types exchanged with the transcription service.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Successful response of both `/api/upload` and `/api/transcribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Song title (video title, or the uploaded file's stem).
    pub title: String,
    /// Transcribed lyrics as plain text.
    pub lyrics: String,
    /// Address the service serves the extracted MP3 from.
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
}

/// JSON body of `POST /api/transcribe`.
#[derive(Debug, Clone, Serialize)]
pub struct TranscribeRequest<'a> {
    pub url: &'a str,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// An audio file picked by the user, held in memory until it is uploaded.
///
/// The contents are [`Bytes`], so handing the file from the form to a
/// submission and on to the multipart body never copies it.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioFile {
    /// File name sent as the multipart filename; the service derives the
    /// song title from its stem.
    pub name: String,
    pub bytes: Bytes,
}

impl AudioFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read `path` fully into memory.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = Bytes::from(std::fs::read(path)?);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".into());
        Ok(Self { name, bytes })
    }
}

impl std::fmt::Debug for AudioFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_reads_camel_case_audio_url() {
        let json = r#"{"lyrics":"la la","title":"Song","audioUrl":"http://h/temp/a.mp3"}"#;
        let t: Transcript = serde_json::from_str(json).unwrap();
        assert_eq!(t.title, "Song");
        assert_eq!(t.lyrics, "la la");
        assert_eq!(t.audio_url, "http://h/temp/a.mp3");
    }

    #[test]
    fn transcript_missing_field_is_rejected() {
        let json = r#"{"lyrics":"la la","title":"Song"}"#;
        assert!(serde_json::from_str::<Transcript>(json).is_err());
    }

    #[test]
    fn transcribe_request_serialises_url_field() {
        let body = serde_json::to_value(TranscribeRequest {
            url: "https://youtu.be/abc",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "url": "https://youtu.be/abc" }));
    }

    #[test]
    fn health_status() {
        let ok: HealthStatus =
            serde_json::from_str(r#"{"status":"healthy","service":"lyrically-backend"}"#).unwrap();
        assert!(ok.is_healthy());

        let bad: HealthStatus = serde_json::from_str(r#"{"status":"degraded"}"#).unwrap();
        assert!(!bad.is_healthy());
        assert!(bad.service.is_empty());
    }

    #[test]
    fn audio_file_from_path_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("My Song.mp3");
        std::fs::write(&path, [0xFFu8, 0xFB, 0x90, 0x00]).unwrap();

        let file = AudioFile::from_path(&path).unwrap();
        assert_eq!(file.name, "My Song.mp3");
        assert_eq!(file.bytes.len(), 4);
    }

    #[test]
    fn audio_file_debug_omits_bytes() {
        let file = AudioFile::new("a.mp3", vec![1u8, 2, 3]);
        assert_eq!(format!("{file:?}"), r#"AudioFile { name: "a.mp3", len: 3 }"#);
    }
}
