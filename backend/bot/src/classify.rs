//! Command classification for inbound mentions.
//!
//! Pure and total: every (text, filetype) pair maps to exactly one intent,
//! evaluated as an ordered list of guarded rules.

use once_cell::sync::Lazy;
use regex::Regex;

use zackly_core::formats;

static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<@[a-z0-9_]+>\s*").unwrap());
static PING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ping$").unwrap());
static HELP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^help$").unwrap());
static TRANSCRIBE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^transcribe$").unwrap());
static SUMMARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(summary|summarize)$").unwrap());

/// The classified purpose of an inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Ping,
    Help,
    Transcribe,
    Summarize,
    /// Audio attached with no command text: both transcription and summary
    /// are assumed desired.
    PendingBoth,
    Unrecognized,
}

/// Strip a single leading mention token and surrounding whitespace.
///
/// An empty result is "no text", distinct from text that fails to match.
pub fn normalize_mention(text: Option<&str>) -> Option<String> {
    let lowered = text?.to_lowercase();
    let stripped = MENTION.replace(&lowered, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Map normalized text plus the attached file's type to an intent.
/// First match wins.
pub fn classify(text: Option<&str>, filetype: Option<&str>) -> Intent {
    let audio = filetype.map(formats::is_supported_audio).unwrap_or(false);
    match (text, filetype) {
        (Some(t), None) if PING.is_match(t) => Intent::Ping,
        (Some(t), None) if HELP.is_match(t) => Intent::Help,
        (Some(t), Some(_)) if audio && TRANSCRIBE.is_match(t) => Intent::Transcribe,
        (Some(t), Some(_)) if audio && SUMMARY.is_match(t) => Intent::Summarize,
        (None, Some(_)) if audio => Intent::PendingBoth,
        _ => Intent::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_mention_token() {
        assert_eq!(normalize_mention(Some("<@U123> ping")).as_deref(), Some("ping"));
        assert_eq!(
            normalize_mention(Some("<@U123>   Transcribe  ")).as_deref(),
            Some("transcribe")
        );
    }

    #[test]
    fn normalize_empty_inputs() {
        assert_eq!(normalize_mention(None), None);
        assert_eq!(normalize_mention(Some("   ")), None);
        assert_eq!(normalize_mention(Some("<@U123>")), None);
    }

    #[test]
    fn normalize_keeps_plain_text() {
        assert_eq!(normalize_mention(Some("PING")).as_deref(), Some("ping"));
    }

    #[test]
    fn ping_requires_no_file() {
        assert_eq!(classify(Some("ping"), None), Intent::Ping);
        assert_eq!(classify(Some("ping"), Some("mp3")), Intent::Unrecognized);
    }

    #[test]
    fn help_requires_no_file() {
        assert_eq!(classify(Some("help"), None), Intent::Help);
        assert_eq!(classify(Some("help"), Some("wav")), Intent::Unrecognized);
    }

    #[test]
    fn transcribe_requires_supported_audio() {
        assert_eq!(classify(Some("transcribe"), Some("mp3")), Intent::Transcribe);
        // Unsupported format with otherwise-matching text falls through.
        assert_eq!(classify(Some("transcribe"), Some("pdf")), Intent::Unrecognized);
        assert_eq!(classify(Some("transcribe"), None), Intent::Unrecognized);
    }

    #[test]
    fn summary_variants() {
        assert_eq!(classify(Some("summary"), Some("wav")), Intent::Summarize);
        assert_eq!(classify(Some("summarize"), Some("m4a")), Intent::Summarize);
        assert_eq!(classify(Some("summary"), Some("txt")), Intent::Unrecognized);
    }

    #[test]
    fn bare_audio_upload_requests_both() {
        assert_eq!(classify(None, Some("webm")), Intent::PendingBoth);
        assert_eq!(classify(None, Some("pdf")), Intent::Unrecognized);
        assert_eq!(classify(None, None), Intent::Unrecognized);
    }

    #[test]
    fn classification_is_pure() {
        for _ in 0..3 {
            assert_eq!(classify(Some("ping"), None), Intent::Ping);
            assert_eq!(classify(Some("garbage"), Some("wav")), Intent::Unrecognized);
        }
    }
}
