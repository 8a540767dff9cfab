use serde::Deserialize;

/// One `app_mention` event, validated at the webhook boundary.
///
/// Owned by the orchestration service for the lifetime of a single request;
/// nothing here survives past the terminal reply.
#[derive(Debug, Clone, Deserialize)]
pub struct MentionEvent {
    /// Raw message text including the leading `<@...>` mention token.
    pub text: Option<String>,
    pub channel: String,
    /// Message timestamp — doubles as the thread anchor for replies.
    pub ts: String,
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub files: Vec<SlackFile>,
}

impl MentionEvent {
    /// Files past the first are ignored by policy.
    pub fn first_file(&self) -> Option<&SlackFile> {
        self.files.first()
    }

    /// Timestamp replies should thread under.
    pub fn thread_anchor(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

/// Reference to a remotely hosted attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackFile {
    pub url_private_download: Option<String>,
    pub filetype: Option<String>,
    pub name: Option<String>,
}

/// Outbound reply, either plain text or block-formatted, optionally
/// anchored to a thread.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub blocks: Option<serde_json::Value>,
    pub thread_ts: Option<String>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            blocks: None,
            thread_ts: None,
        }
    }

    pub fn in_thread(text: impl Into<String>, thread_ts: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            blocks: None,
            thread_ts: Some(thread_ts.into()),
        }
    }

    pub fn with_blocks(text: impl Into<String>, blocks: serde_json::Value) -> Self {
        Self {
            text: text.into(),
            blocks: Some(blocks),
            thread_ts: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_file_only() {
        let event: MentionEvent = serde_json::from_value(serde_json::json!({
            "text": "<@U123> transcribe",
            "channel": "C1",
            "ts": "1700000000.000100",
            "files": [
                {"url_private_download": "https://x/a.wav", "filetype": "wav"},
                {"url_private_download": "https://x/b.mp3", "filetype": "mp3"}
            ]
        }))
        .unwrap();
        assert_eq!(event.first_file().unwrap().filetype.as_deref(), Some("wav"));
    }

    #[test]
    fn thread_anchor_prefers_thread_ts() {
        let event: MentionEvent = serde_json::from_value(serde_json::json!({
            "text": "ping",
            "channel": "C1",
            "ts": "2.0",
            "thread_ts": "1.0"
        }))
        .unwrap();
        assert_eq!(event.thread_anchor(), "1.0");
    }

    #[test]
    fn files_default_to_empty() {
        let event: MentionEvent = serde_json::from_value(serde_json::json!({
            "text": "ping",
            "channel": "C1",
            "ts": "2.0"
        }))
        .unwrap();
        assert!(event.first_file().is_none());
    }
}
