//! Core `TranscriptionService` trait and the reqwest-backed implementation.
//!
//! `HttpTranscriptionService` talks to the lyrics backend:
//!
//! * `POST {base}/api/upload`     — multipart, field `file`
//! * `POST {base}/api/transcribe` — JSON `{ "url": … }`
//! * `GET  {base}/health`         — liveness check
//!
//! The base address comes from [`ServiceConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use reqwest::multipart;
use thiserror::Error;

use crate::api::types::{AudioFile, HealthStatus, TranscribeRequest, Transcript};
use crate::config::ServiceConfig;

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the transcription service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The service answered with a non-2xx status.
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// The response body was not the expected JSON shape.
    #[error("failed to parse service response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Status(status.as_u16())
        } else {
            ApiError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TranscriptionService trait
// ---------------------------------------------------------------------------

/// Async interface to the remote transcription service.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn TranscriptionService>` between the UI thread and the runtime.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Upload an audio file and transcribe it.
    async fn upload(&self, file: &AudioFile) -> Result<Transcript, ApiError>;

    /// Ask the service to fetch the audio behind `url` and transcribe it.
    async fn transcribe(&self, url: &str) -> Result<Transcript, ApiError>;

    /// Query the service's health endpoint.
    async fn health(&self) -> Result<HealthStatus, ApiError>;
}

// ---------------------------------------------------------------------------
// HttpTranscriptionService
// ---------------------------------------------------------------------------

/// Talks to the lyrics backend over HTTP(S).
///
/// # No timeout
/// The client is built without a request timeout: a slow transcription keeps
/// the submission in flight until the service answers or the connection
/// drops.
pub struct HttpTranscriptionService {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl HttpTranscriptionService {
    /// Build a service client from application config.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lyrically/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn read_transcript(response: reqwest::Response) -> Result<Transcript, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<Transcript>(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TranscriptionService for HttpTranscriptionService {
    async fn upload(&self, file: &AudioFile) -> Result<Transcript, ApiError> {
        let url = self.config.endpoint("/api/upload");
        log::debug!("api: POST {url} ({} bytes, {:?})", file.bytes.len(), file.name);

        // `Bytes` clones share the buffer, so the upload body is not a copy.
        let len = file.bytes.len() as u64;
        let part = multipart::Part::stream_with_length(reqwest::Body::from(file.bytes.clone()), len)
            .file_name(file.name.clone())
            .mime_str("audio/mpeg")?;
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        Self::read_transcript(response).await
    }

    async fn transcribe(&self, video_url: &str) -> Result<Transcript, ApiError> {
        let url = self.config.endpoint("/api/transcribe");
        log::debug!("api: POST {url} url={video_url:?}");

        let response = self
            .client
            .post(&url)
            .json(&TranscribeRequest { url: video_url })
            .send()
            .await?;
        Self::read_transcript(response).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.config.endpoint("/health");
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MockTranscriptionService  (test-only)
// ---------------------------------------------------------------------------

/// Which endpoint a [`MockTranscriptionService`] call went to.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Upload(String),
    Transcribe(String),
    Health,
}

/// Canned outcome for a [`MockTranscriptionService`].
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockResponse {
    Ok(Transcript),
    Status(u16),
    Transport,
    Malformed,
}

/// A test double that records every call and answers with a canned response.
///
/// An optional hook runs at the moment a request "goes out", which lets
/// tests inspect shared state right before the network call.
#[cfg(test)]
pub struct MockTranscriptionService {
    response: std::sync::Mutex<MockResponse>,
    calls: std::sync::Mutex<Vec<MockCall>>,
    /// `status` reported by `/health`; `None` fails the call at transport level.
    health_status: std::sync::Mutex<Option<String>>,
    on_request: Option<Box<dyn Fn() + Send + Sync>>,
}

#[cfg(test)]
impl MockTranscriptionService {
    pub fn new(response: MockResponse) -> Self {
        Self {
            response: std::sync::Mutex::new(response),
            calls: std::sync::Mutex::new(Vec::new()),
            health_status: std::sync::Mutex::new(Some("healthy".into())),
            on_request: None,
        }
    }

    /// Mock that succeeds with the given fields.
    pub fn ok(title: &str, lyrics: &str, audio_url: &str) -> Self {
        Self::new(MockResponse::Ok(Transcript {
            title: title.into(),
            lyrics: lyrics.into(),
            audio_url: audio_url.into(),
        }))
    }

    pub fn on_request(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_request = Some(Box::new(hook));
        self
    }

    /// Swap the canned response for subsequent calls.
    pub fn respond_with(&self, response: MockResponse) {
        *self.response.lock().unwrap() = response;
    }

    /// Swap the `/health` answer; `None` makes the check fail.
    pub fn respond_to_health(&self, status: Option<&str>) {
        *self.health_status.lock().unwrap() = status.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: MockCall) -> Result<Transcript, ApiError> {
        if let Some(hook) = &self.on_request {
            hook();
        }
        self.calls.lock().unwrap().push(call);
        match self.response.lock().unwrap().clone() {
            MockResponse::Ok(t) => Ok(t),
            MockResponse::Status(code) => Err(ApiError::Status(code)),
            MockResponse::Transport => Err(ApiError::Request("connection refused".into())),
            MockResponse::Malformed => Err(ApiError::Parse("expected value at line 1".into())),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TranscriptionService for MockTranscriptionService {
    async fn upload(&self, file: &AudioFile) -> Result<Transcript, ApiError> {
        self.answer(MockCall::Upload(file.name.clone()))
    }

    async fn transcribe(&self, url: &str) -> Result<Transcript, ApiError> {
        self.answer(MockCall::Transcribe(url.to_string()))
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.calls.lock().unwrap().push(MockCall::Health);
        match self.health_status.lock().unwrap().clone() {
            Some(status) => Ok(HealthStatus {
                status,
                service: "mock".into(),
            }),
            None => Err(ApiError::Request("connection refused".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one connection on a loopback port, capture the raw request and
    /// answer with `status_line` + `body`.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];

            // Read headers, then as much body as Content-Length announces.
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });

        (base_url, handle)
    }

    fn service_for(base_url: &str) -> HttpTranscriptionService {
        HttpTranscriptionService::from_config(&ServiceConfig {
            base_url: base_url.into(),
        })
    }

    const OK_BODY: &str =
        r#"{"lyrics":"hello darkness","title":"Sound","audioUrl":"http://127.0.0.1:5001/temp/x.mp3"}"#;

    #[test]
    fn service_is_object_safe() {
        let service: Box<dyn TranscriptionService> =
            Box::new(HttpTranscriptionService::from_config(&ServiceConfig::default()));
        drop(service);
    }

    #[tokio::test]
    async fn transcribe_posts_json_url() {
        let (base, server) = serve_once("HTTP/1.1 200 OK", OK_BODY).await;
        let service = service_for(&base);

        let transcript = service.transcribe("https://youtu.be/xyz").await.unwrap();
        assert_eq!(transcript.title, "Sound");
        assert_eq!(transcript.lyrics, "hello darkness");
        assert_eq!(transcript.audio_url, "http://127.0.0.1:5001/temp/x.mp3");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/transcribe "));
        assert!(request.contains(r#"{"url":"https://youtu.be/xyz"}"#));
    }

    #[tokio::test]
    async fn upload_sends_multipart_file_field() {
        let (base, server) = serve_once("HTTP/1.1 200 OK", OK_BODY).await;
        let service = service_for(&base);

        let file = AudioFile::new("track.mp3", b"ID3fake-mp3-bytes".to_vec());
        let transcript = service.upload(&file).await.unwrap();
        assert_eq!(transcript.title, "Sound");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/upload "));
        assert!(request.to_ascii_lowercase().contains("multipart/form-data"));
        assert!(request.contains(r#"name="file""#));
        assert!(request.contains(r#"filename="track.mp3""#));
        assert!(request.contains("ID3fake-mp3-bytes"));
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let (base, _server) =
            serve_once("HTTP/1.1 500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let err = service_for(&base).transcribe("https://youtu.be/a").await.unwrap_err();
        assert!(matches!(err, ApiError::Status(500)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_body_maps_to_parse() {
        let (base, _server) = serve_once("HTTP/1.1 200 OK", r#"{"lyrics":"only"}"#).await;
        let err = service_for(&base).transcribe("https://youtu.be/a").await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn closed_port_maps_to_request_error() {
        // Bind then drop to get a loopback port nobody listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let service = service_for(&format!("http://127.0.0.1:{port}"));
        let err = service.transcribe("https://youtu.be/a").await.unwrap_err();
        assert!(matches!(err, ApiError::Request(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn health_reads_status() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"status":"healthy","service":"lyrically-backend"}"#,
        )
        .await;
        let health = service_for(&base).health().await.unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.service, "lyrically-backend");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /health "));
    }
}
