//! Slack Web API client: posting messages and downloading attachments.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use zackly_core::{AttachmentFetcher, Reply, ReplySink};

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

#[derive(Serialize)]
struct PostMessageBody<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

/// Authenticated client for the Slack Web API.
pub struct SlackClient {
    http: Client,
    bot_token: String,
    timeout: Duration,
}

impl SlackClient {
    pub fn new(bot_token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            bot_token: bot_token.into(),
            timeout,
        }
    }

    /// Send a reply via `chat.postMessage`.
    pub async fn post_message(&self, channel: &str, reply: &Reply) -> Result<()> {
        let body = PostMessageBody {
            channel,
            text: &reply.text,
            blocks: reply.blocks.as_ref(),
            thread_ts: reply.thread_ts.as_deref(),
        };

        let res = self
            .http
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.bot_token)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("chat.postMessage request failed")?;

        let status = res.status();
        if !status.is_success() {
            let err = res.text().await.unwrap_or_default();
            anyhow::bail!("chat.postMessage returned {}: {}", status, err);
        }

        // Slack reports API-level failures with 200 + ok=false.
        let parsed: PostMessageResponse = res
            .json()
            .await
            .context("chat.postMessage response was not JSON")?;
        if !parsed.ok {
            anyhow::bail!(
                "chat.postMessage rejected: {}",
                parsed.error.unwrap_or_else(|| "unknown_error".into())
            );
        }

        debug!(channel, "posted message");
        Ok(())
    }

    /// Download a private attachment to `dest`, authenticated with the bot token.
    ///
    /// The caller owns deletion of `dest`.
    pub async fn download_file(&self, url: &str, dest: &Path) -> Result<()> {
        info!(url, "downloading attachment");

        let res = self
            .http
            .get(url)
            .bearer_auth(&self.bot_token)
            .timeout(self.timeout)
            .send()
            .await
            .context("attachment download request failed")?;

        let status = res.status();
        if !status.is_success() {
            anyhow::bail!("attachment download returned {}", status);
        }

        let bytes = res
            .bytes()
            .await
            .context("failed to read attachment body")?;
        tokio::fs::write(dest, &bytes)
            .await
            .with_context(|| format!("failed to write {}", dest.display()))?;

        info!(path = %dest.display(), size = bytes.len(), "attachment saved");
        Ok(())
    }
}

#[async_trait]
impl AttachmentFetcher for SlackClient {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.download_file(url, dest).await
    }
}

/// Per-event reply sink bound to the originating channel.
pub struct SlackReplySink {
    client: Arc<SlackClient>,
    channel: String,
}

impl SlackReplySink {
    pub fn new(client: Arc<SlackClient>, channel: impl Into<String>) -> Self {
        Self {
            client,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl ReplySink for SlackReplySink {
    async fn send(&self, reply: Reply) -> Result<()> {
        self.client.post_message(&self.channel, &reply).await
    }
}
