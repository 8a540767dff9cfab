//! Environment-sourced runtime configuration.

use anyhow::{bail, Result};
use serde::Deserialize;

/// zackly runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Log level used when RUST_LOG is unset
    pub log_level: String,

    // Slack
    pub slack_bot_token: String,
    pub slack_signing_secret: String,
    pub slack_webhook_path: String,

    // OpenAI
    pub openai_api_key: String,
    /// Chat model used for proofreading and summarization
    pub openai_model: String,

    // Whisper
    /// Base URL of a self-hosted transcription instance
    pub whisper_local_endpoint: Option<String>,
    /// Prefer the self-hosted instance over the hosted API
    pub whisper_local_instance: bool,
    /// Language hint passed to the transcription backend
    pub whisper_language: String,

    /// Deadline applied to every outbound HTTP call, in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3456,
            log_level: "info".to_string(),
            slack_bot_token: String::new(),
            slack_signing_secret: String::new(),
            slack_webhook_path: "/webhooks/slack".to_string(),
            openai_api_key: String::new(),
            openai_model: "gpt-4o".to_string(),
            whisper_local_endpoint: None,
            whisper_local_instance: false,
            whisper_language: "ja".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            bind_address: std::env::var("ZACKLY_BIND").unwrap_or(defaults.bind_address),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            slack_bot_token: std::env::var("SLACK_BOT_TOKEN").unwrap_or_default(),
            slack_signing_secret: std::env::var("SLACK_SIGNING_SECRET").unwrap_or_default(),
            slack_webhook_path: std::env::var("SLACK_WEBHOOK_PATH")
                .unwrap_or(defaults.slack_webhook_path),
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            whisper_local_endpoint: std::env::var("WHISPER_LOCAL_ENDPOINT")
                .ok()
                .filter(|s| !s.is_empty()),
            whisper_local_instance: std::env::var("WHISPER_LOCAL_INSTANCE")
                .map(|v| v == "true")
                .unwrap_or(false),
            whisper_language: std::env::var("WHISPER_LANGUAGE").unwrap_or(defaults.whisper_language),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    /// Reject configurations the runtime cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.slack_bot_token.is_empty() {
            bail!("SLACK_BOT_TOKEN is not set");
        }
        if self.slack_signing_secret.is_empty() {
            bail!("SLACK_SIGNING_SECRET is not set");
        }
        if self.openai_api_key.is_empty() && !self.whisper_local_instance {
            bail!("OPENAI_API_KEY is not set and no self-hosted instance is configured");
        }
        if self.whisper_local_instance && self.whisper_local_endpoint.is_none() {
            bail!("WHISPER_LOCAL_INSTANCE is enabled but WHISPER_LOCAL_ENDPOINT is not set");
        }
        if self.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            slack_bot_token: "xoxb-test".into(),
            slack_signing_secret: "secret".into(),
            openai_api_key: "sk-test".into(),
            ..Config::default()
        }
    }

    #[test]
    fn default_port_matches_listening_port() {
        assert_eq!(Config::default().port, 3456);
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn missing_bot_token_fails() {
        let config = Config {
            slack_bot_token: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn local_instance_requires_endpoint() {
        let config = Config {
            whisper_local_instance: true,
            whisper_local_endpoint: None,
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn local_instance_can_replace_api_key() {
        let config = Config {
            openai_api_key: String::new(),
            whisper_local_instance: true,
            whisper_local_endpoint: Some("http://localhost:9000".into()),
            ..valid()
        };
        assert!(config.validate().is_ok());
    }
}
