//! Per-event orchestration.
//!
//! One `MessageService` per inbound mention; it owns the event, the reply
//! sink, and the injected clients, and guarantees exactly one terminal
//! reply per pipeline request whatever the downstream stages do.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};
use uuid::Uuid;

use zackly_core::formats::{audio_format_list, text_format_list};
use zackly_core::{
    AttachmentFetcher, BotError, MentionEvent, Reply, ReplySink, SpeechToText, TextProcessor,
    TextRefiner, Transcription,
};

/// Remote clients injected once at startup.
pub struct Services {
    pub fetcher: Arc<dyn AttachmentFetcher>,
    pub stt: Arc<dyn SpeechToText>,
    pub proofreader: Arc<dyn TextRefiner>,
    pub summarizer: Arc<dyn TextRefiner>,
    pub processor: Arc<dyn TextProcessor>,
}

pub struct MessageService {
    event: MentionEvent,
    say: Arc<dyn ReplySink>,
    services: Arc<Services>,
}

impl MessageService {
    pub fn new(event: MentionEvent, say: Arc<dyn ReplySink>, services: Arc<Services>) -> Self {
        Self {
            event,
            say,
            services,
        }
    }

    pub async fn do_ping(&self) -> Result<()> {
        info!("pong");
        self.say.send(Reply::text("pong")).await
    }

    pub async fn do_help(&self) -> Result<()> {
        let usage = format!(
            "Need a transcription or a summary? Mention `@zackly` and upload an audio file.\n\
             - Transcription only: `@zackly transcribe`\n\
             - Summary only: `@zackly summary`\n\
             - Supported audio formats: {}\n\
             - Supported text formats: {}",
            audio_format_list(),
            text_format_list(),
        );
        let blocks = serde_json::json!([{
            "type": "section",
            "text": { "type": "mrkdwn", "text": usage }
        }]);
        self.say
            .send(Reply::with_blocks("Need a transcription or a summary?", blocks))
            .await
    }

    pub async fn do_otherwise(&self) -> Result<()> {
        self.say
            .send(Reply::in_thread(
                "Command not recognized. Mention `@zackly`, attach an audio file, \
                 and try `@zackly help` for the available commands.",
                self.event.thread_anchor(),
            ))
            .await
    }

    /// Transcribe the attachment, proofread the transcript, reply once.
    pub async fn request_transcription(&self) -> Result<()> {
        self.ack("Transcription request accepted.").await;

        let transcription = self.fetch_transcript().await;
        let text = if transcription.outcome.is_degraded() {
            transcription.text
        } else {
            self.services
                .proofreader
                .refine(&transcription.text)
                .await
                .text
        };
        self.terminal_reply(text).await
    }

    /// Transcribe the attachment, summarize the transcript, reply once.
    pub async fn request_summary(&self) -> Result<()> {
        self.ack("Summary request accepted.").await;

        let transcription = self.fetch_transcript().await;
        let text = if transcription.outcome.is_degraded() {
            transcription.text
        } else {
            self.services
                .summarizer
                .refine(&transcription.text)
                .await
                .text
        };
        self.terminal_reply(text).await
    }

    /// Bare audio upload: transcribe, then proofread + summarize in one
    /// combined pass, falling back to the bare transcript when the combined
    /// stage degrades.
    pub async fn request_both(&self) -> Result<()> {
        self.ack("Transcription and summary request accepted.").await;

        let transcription = self.fetch_transcript().await;
        if transcription.outcome.is_degraded() {
            return self.terminal_reply(transcription.text).await;
        }

        let processed = self.services.processor.process(&transcription.text).await;
        let text = if processed.outcome.is_degraded() {
            transcription.text
        } else {
            format!(
                "*Transcript*\n{}\n\n*Summary*\n{}",
                processed.corrected, processed.summary
            )
        };
        self.terminal_reply(text).await
    }

    /// Latency hiding: the downstream calls may take seconds, so the
    /// acknowledgement goes out first. Delivery failure is logged, not
    /// propagated — the pipeline still owes a terminal reply.
    async fn ack(&self, text: &str) {
        let reply = Reply::in_thread(text, self.event.thread_anchor());
        if let Err(err) = self.say.send(reply).await {
            warn!("acknowledgement reply failed: {err:#}");
        }
    }

    async fn terminal_reply(&self, text: String) -> Result<()> {
        self.say
            .send(Reply::in_thread(text, self.event.thread_anchor()))
            .await
    }

    /// Download the first attachment to a scoped temp file and transcribe it.
    ///
    /// The temp file is removed when the guard drops, on every path.
    async fn fetch_transcript(&self) -> Transcription {
        let Some(file) = self.event.first_file() else {
            return Transcription::degraded(&BotError::Validation("no file attached".into()));
        };
        let Some(url) = file.url_private_download.as_deref() else {
            return Transcription::degraded(&BotError::Validation(
                "attachment has no download URL".into(),
            ));
        };
        let ext = file.filetype.as_deref().unwrap_or("bin");

        let temp = TempAudio::new(ext);
        if let Err(err) = self.services.fetcher.download(url, temp.path()).await {
            let err = BotError::Transport {
                stage: "download",
                message: format!("{err:#}"),
            };
            warn!(%url, error = %err, "attachment download failed");
            return Transcription::degraded(&err);
        }

        self.services.stt.transcribe(temp.path()).await
    }
}

/// Scoped temporary audio file: the path is reserved on creation and the
/// file, if it was ever written, is removed on drop.
struct TempAudio {
    path: PathBuf,
}

impl TempAudio {
    fn new(ext: &str) -> Self {
        let path = std::env::temp_dir().join(format!("audio_{}.{ext}", Uuid::new_v4()));
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempAudio {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "temporary file deleted"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!(
                path = %self.path.display(),
                "failed to delete temporary file: {err}"
            ),
        }
    }
}
