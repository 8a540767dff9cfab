//! Registry of file formats the bot accepts.

/// Audio formats the speech-to-text backend accepts.
pub const AUDIO_FORMATS: &[&str] = &["mp3", "mp4", "mpeg", "mpga", "m4a", "wav", "webm"];

/// Text formats accepted for refinement-only requests.
pub const TEXT_FORMATS: &[&str] = &["txt"];

/// Case-insensitive membership test against the audio format set.
pub fn is_supported_audio(filetype: &str) -> bool {
    let lowered = filetype.to_ascii_lowercase();
    AUDIO_FORMATS.contains(&lowered.as_str())
}

/// Comma-separated audio format list for user-facing messages.
pub fn audio_format_list() -> String {
    AUDIO_FORMATS.join(", ")
}

/// Comma-separated text format list for user-facing messages.
pub fn text_format_list() -> String {
    TEXT_FORMATS.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_audio_formats() {
        for fmt in AUDIO_FORMATS {
            assert!(is_supported_audio(fmt));
        }
    }

    #[test]
    fn is_case_insensitive() {
        assert!(is_supported_audio("WAV"));
        assert!(is_supported_audio("Mp3"));
    }

    #[test]
    fn rejects_non_audio() {
        assert!(!is_supported_audio("pdf"));
        assert!(!is_supported_audio("txt"));
        assert!(!is_supported_audio(""));
    }
}
