//! Slack Events API webhook.
//!
//! Verifies `X-Slack-Signature`, answers `url_verification` challenges, and
//! forwards `app_mention` events to the bot over an mpsc channel.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use zackly_core::{MentionEvent, SlackFile};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SlackConfig {
    pub signing_secret: String,
    pub webhook_path: String,
}

// ---------------------------------------------------------------------------
// Axum state
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct AppState {
    config: SlackConfig,
    events_tx: mpsc::Sender<MentionEvent>,
}

// ---------------------------------------------------------------------------
// Slack wire types
// ---------------------------------------------------------------------------

/// Top-level event envelope from the Slack Events API.
#[derive(Deserialize, Debug)]
struct SlackEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    /// Present on `url_verification` challenges.
    challenge: Option<String>,
    /// Present on `event_callback`.
    event: Option<SlackEventWire>,
}

#[derive(Deserialize, Debug)]
struct SlackEventWire {
    #[serde(rename = "type")]
    event_type: String,
    text: Option<String>,
    channel: Option<String>,
    ts: Option<String>,
    thread_ts: Option<String>,
    /// If set this is a bot message — ignore.
    bot_id: Option<String>,
    #[serde(default)]
    files: Vec<SlackFile>,
}

impl SlackEventWire {
    fn into_mention(self) -> Option<MentionEvent> {
        let channel = self.channel?;
        let ts = self.ts?;
        Some(MentionEvent {
            text: self.text,
            channel,
            ts,
            thread_ts: self.thread_ts,
            files: self.files,
        })
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct SlackAdapter {
    config: SlackConfig,
    events_tx: mpsc::Sender<MentionEvent>,
}

impl SlackAdapter {
    pub fn new(config: SlackConfig, events_tx: mpsc::Sender<MentionEvent>) -> Self {
        Self { config, events_tx }
    }

    pub fn build_router(&self) -> Router {
        let state = AppState {
            config: self.config.clone(),
            events_tx: self.events_tx.clone(),
        };
        Router::new()
            .route(&self.config.webhook_path, post(handle_slack_event))
            .with_state(state)
    }
}

// ---------------------------------------------------------------------------
// Webhook handler
// ---------------------------------------------------------------------------

async fn handle_slack_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    // 1. Verify Slack signature (HMAC-SHA256 over timestamp + body)
    if !verify_slack_signature(&headers, &body, &state.config.signing_secret) {
        warn!("[Slack] Invalid signature — rejecting webhook");
        return (StatusCode::UNAUTHORIZED, "invalid_signature").into_response();
    }

    // 2. Parse JSON
    let envelope: SlackEnvelope = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(err) => {
            error!("[Slack] Failed to parse event envelope: {}", err);
            return (StatusCode::BAD_REQUEST, "bad_json").into_response();
        }
    };

    // 3. URL-verification challenge (required at initial setup)
    if envelope.event_type == "url_verification" {
        if let Some(challenge) = envelope.challenge {
            return (StatusCode::OK, challenge).into_response();
        }
    }

    if envelope.event_type != "event_callback" {
        return (StatusCode::OK, "ignored").into_response();
    }

    let Some(wire) = envelope.event else {
        return (StatusCode::OK, "no_event").into_response();
    };

    // 4. Only real user mentions trigger the pipeline
    if wire.event_type != "app_mention" || wire.bot_id.is_some() {
        return (StatusCode::OK, "ignored").into_response();
    }

    let Some(mention) = wire.into_mention() else {
        return (StatusCode::OK, "incomplete_event").into_response();
    };

    info!(
        channel = %mention.channel,
        ts = %mention.ts,
        files = mention.files.len(),
        "[Slack] Mention received"
    );

    // Reply to Slack immediately; the pipeline runs in the bot worker.
    let _ = state.events_tx.send(mention).await;

    (StatusCode::OK, "ok").into_response()
}

/// Verify the `X-Slack-Signature` header using HMAC-SHA256.
fn verify_slack_signature(headers: &HeaderMap, body: &[u8], signing_secret: &str) -> bool {
    let Some(sig) = header_str(headers, "x-slack-signature") else {
        return false;
    };
    let Some(ts) = header_str(headers, "x-slack-request-timestamp") else {
        return false;
    };
    compute_signature(signing_secret, ts, body)
        .map(|computed| computed == sig)
        .unwrap_or(false)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn compute_signature(signing_secret: &str, ts: &str, body: &[u8]) -> Option<String> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let base = format!("v0:{}:{}", ts, std::str::from_utf8(body).ok()?);
    let mut mac = Hmac::<Sha256>::new_from_slice(signing_secret.as_bytes()).ok()?;
    mac.update(base.as_bytes());
    Some(format!("v0={}", hex::encode(mac.finalize().into_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn accepts_valid_signature() {
        let secret = "8f742231b10e8888abcd99yyyzzz85a5";
        let body = b"{\"type\":\"event_callback\"}";
        let ts = "1700000000";
        let sig = compute_signature(secret, ts, body).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("x-slack-signature", HeaderValue::from_str(&sig).unwrap());
        headers.insert("x-slack-request-timestamp", HeaderValue::from_static("1700000000"));
        assert!(verify_slack_signature(&headers, body, secret));
    }

    #[test]
    fn rejects_wrong_secret() {
        let body = b"{}";
        let ts = "1700000000";
        let sig = compute_signature("secret-a", ts, body).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("x-slack-signature", HeaderValue::from_str(&sig).unwrap());
        headers.insert("x-slack-request-timestamp", HeaderValue::from_static("1700000000"));
        assert!(!verify_slack_signature(&headers, body, "secret-b"));
    }

    #[test]
    fn rejects_missing_headers() {
        assert!(!verify_slack_signature(&HeaderMap::new(), b"{}", "secret"));
    }

    #[test]
    fn parses_mention_with_files() {
        let wire: SlackEventWire = serde_json::from_value(serde_json::json!({
            "type": "app_mention",
            "text": "<@U123> summary",
            "channel": "C42",
            "ts": "1700000000.000100",
            "files": [{"url_private_download": "https://x/a.wav", "filetype": "wav"}]
        }))
        .unwrap();
        let mention = wire.into_mention().unwrap();
        assert_eq!(mention.channel, "C42");
        assert_eq!(mention.first_file().unwrap().filetype.as_deref(), Some("wav"));
    }

    #[test]
    fn drops_event_without_channel() {
        let wire: SlackEventWire = serde_json::from_value(serde_json::json!({
            "type": "app_mention",
            "text": "hi",
            "ts": "1.0"
        }))
        .unwrap();
        assert!(wire.into_mention().is_none());
    }
}
