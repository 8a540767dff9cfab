//! Speech-to-text client.
//!
//! Wraps either the hosted OpenAI transcription API or a self-hosted
//! instance reachable at `{endpoint}/transcribe`. Both receive the same
//! logical parameters (model, language hint, response format, temperature)
//! as multipart form fields alongside the audio file.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{info, warn};

use zackly_core::formats::{self, audio_format_list};
use zackly_core::{BotError, SpeechToText, Transcription};

pub const WHISPER_MODEL: &str = "whisper-1";
pub const WHISPER_RESPONSE_FORMAT: &str = "json";
pub const WHISPER_TEMPERATURE: f32 = 0.0;

const HOSTED_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const STAGE: &str = "transcription";

/// Which transcription backend to talk to.
pub enum WhisperBackend {
    /// Hosted OpenAI API, bearer-authenticated.
    Hosted { api_key: String },
    /// Self-hosted instance; requests go to `{endpoint}/transcribe`.
    SelfHosted { endpoint: String },
}

pub struct WhisperClient {
    http: Client,
    backend: WhisperBackend,
    model: String,
    language: Option<String>,
    response_format: String,
    temperature: f32,
    timeout: Duration,
}

impl WhisperClient {
    pub fn new(backend: WhisperBackend, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            backend,
            model: WHISPER_MODEL.to_string(),
            language: None,
            response_format: WHISPER_RESPONSE_FORMAT.to_string(),
            temperature: WHISPER_TEMPERATURE,
            timeout,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn try_transcribe(&self, audio_path: &Path) -> Result<String, BotError> {
        // Pre-flight: existence and format checks happen before any network call.
        if tokio::fs::metadata(audio_path).await.is_err() {
            return Err(BotError::Validation(format!(
                "audio file not found: {}",
                audio_path.display()
            )));
        }

        let ext = audio_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !formats::is_supported_audio(&ext) {
            return Err(BotError::Validation(format!(
                "unsupported file format: {ext}. Supported formats: {}",
                audio_format_list()
            )));
        }

        let bytes = tokio::fs::read(audio_path).await.map_err(|e| {
            BotError::Validation(format!("failed to read {}: {e}", audio_path.display()))
        })?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_from_ext(&ext))
            .map_err(|e| BotError::Validation(e.to_string()))?;
        let mut form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", self.response_format.clone())
            .text("temperature", self.temperature.to_string());
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let request = match &self.backend {
            WhisperBackend::Hosted { api_key } => {
                info!(model = %self.model, "transcribing via hosted API");
                self.http.post(HOSTED_URL).bearer_auth(api_key)
            }
            WhisperBackend::SelfHosted { endpoint } => {
                let url = format!("{}/transcribe", endpoint.trim_end_matches('/'));
                info!(model = %self.model, %url, "transcribing via self-hosted instance");
                self.http.post(url)
            }
        };

        let response = request
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                BotError::from_outbound(STAGE, e.is_timeout(), self.timeout.as_secs(), e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| BotError::Transport {
            stage: STAGE,
            message: e.to_string(),
        })?;
        if !status.is_success() {
            return Err(BotError::Transport {
                stage: STAGE,
                message: format!("backend returned {status}: {body}"),
            });
        }

        extract_text(&self.response_format, &body)
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(&self, audio_path: &Path) -> Transcription {
        let start = Instant::now();
        match self.try_transcribe(audio_path).await {
            Ok(text) => Transcription::ok(text, start.elapsed()),
            Err(err) => {
                warn!(path = %audio_path.display(), error = %err, "transcription degraded");
                Transcription::degraded(&err)
            }
        }
    }
}

/// Pull the transcript out of a backend response.
///
/// Tolerant by contract: a JSON response yields its `text` field, an
/// unexpected JSON shape is returned whole, any other format is taken as
/// the raw body.
fn extract_text(response_format: &str, body: &str) -> Result<String, BotError> {
    if body.trim().is_empty() {
        return Err(BotError::EmptyResult(
            "transcription backend returned an empty body".into(),
        ));
    }
    if response_format != "json" {
        return Ok(body.to_string());
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("text").and_then(|t| t.as_str()) {
            Some(text) => Ok(text.to_string()),
            None => Ok(value.to_string()),
        },
        Err(_) => Ok(body.to_string()),
    }
}

fn mime_from_ext(ext: &str) -> &'static str {
    match ext {
        "mp3" | "mpga" => "audio/mpeg",
        "mp4" | "m4a" => "audio/mp4",
        "mpeg" => "video/mpeg",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zackly_core::Outcome;

    fn client() -> WhisperClient {
        // Endpoint is never reached in these tests: validation fails first.
        WhisperClient::new(
            WhisperBackend::SelfHosted {
                endpoint: "http://127.0.0.1:1".into(),
            },
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn missing_file_degrades_without_network() {
        let result = client().transcribe(Path::new("/nonexistent/audio.wav")).await;
        match result.outcome {
            Outcome::Degraded { error } => assert!(error.contains("not found"), "{error}"),
            Outcome::Ok => panic!("expected degraded result"),
        }
    }

    #[tokio::test]
    async fn unsupported_extension_degrades_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"not audio").unwrap();

        let result = client().transcribe(&path).await;
        match result.outcome {
            Outcome::Degraded { error } => {
                assert!(error.contains("unsupported file format"), "{error}")
            }
            Outcome::Ok => panic!("expected degraded result"),
        }
        assert!(result.text.contains("unsupported file format"));
    }

    #[test]
    fn extracts_json_text_field() {
        let text = extract_text("json", r#"{"text": "hello world"}"#).unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn falls_back_to_whole_response_without_text_field() {
        let text = extract_text("json", r#"{"segments": []}"#).unwrap();
        assert!(text.contains("segments"));
    }

    #[test]
    fn plain_format_returns_raw_body() {
        let text = extract_text("text", "raw transcript").unwrap();
        assert_eq!(text, "raw transcript");
    }

    #[test]
    fn empty_body_is_an_empty_result_error() {
        let err = extract_text("json", "   ").unwrap_err();
        assert!(matches!(err, BotError::EmptyResult(_)));
    }

    #[test]
    fn mime_mapping_covers_registry() {
        for fmt in zackly_core::formats::AUDIO_FORMATS {
            assert_ne!(mime_from_ext(fmt), "application/octet-stream", "{fmt}");
        }
    }
}
