use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::event::Reply;
use crate::result::{Processed, Refinement, Transcription};

/// Destination for outbound replies (one per inbound event).
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, reply: Reply) -> Result<()>;
}

/// Downloads a remotely hosted attachment to a local path.
///
/// Fails on non-success HTTP status; the caller owns deletion of `dest`.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Converts a local audio file to text.
///
/// Never fails past this boundary: errors come back as a degraded
/// [`Transcription`].
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Transcription;
}

/// Single-purpose text refinement (proofread or summarize).
#[async_trait]
pub trait TextRefiner: Send + Sync {
    async fn refine(&self, text: &str) -> Refinement;
}

/// Combined proofread + summarize in one pass.
#[async_trait]
pub trait TextProcessor: Send + Sync {
    async fn process(&self, text: &str) -> Processed;
}
