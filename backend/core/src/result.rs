use std::time::Duration;

use crate::error::BotError;

/// Whether a pipeline stage produced its real output or fell back.
///
/// Degraded results still carry usable text (the original input, or the
/// error message for transcription) so downstream stages continue without
/// special-casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Degraded { error: String },
}

impl Outcome {
    pub fn degraded(error: impl ToString) -> Self {
        Outcome::Degraded {
            error: error.to_string(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }
}

/// Result of one speech-to-text run.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub duration: Duration,
    pub outcome: Outcome,
}

impl Transcription {
    pub fn ok(text: impl Into<String>, duration: Duration) -> Self {
        Self {
            text: text.into(),
            duration,
            outcome: Outcome::Ok,
        }
    }

    /// The error message becomes the text so the terminal reply can show it.
    pub fn degraded(error: &BotError) -> Self {
        Self {
            text: error.to_string(),
            duration: Duration::ZERO,
            outcome: Outcome::degraded(error),
        }
    }
}

/// Result of one proofreading or summarization run.
#[derive(Debug, Clone)]
pub struct Refinement {
    pub original: String,
    pub text: String,
    pub duration: Duration,
    pub outcome: Outcome,
}

impl Refinement {
    pub fn ok(original: impl Into<String>, text: impl Into<String>, duration: Duration) -> Self {
        Self {
            original: original.into(),
            text: text.into(),
            duration,
            outcome: Outcome::Ok,
        }
    }

    /// Falls back to the original input as the produced text.
    pub fn degraded(original: impl Into<String>, error: &BotError) -> Self {
        let original = original.into();
        Self {
            text: original.clone(),
            original,
            duration: Duration::ZERO,
            outcome: Outcome::degraded(error),
        }
    }
}

/// Result of the combined proofread + summarize pass.
#[derive(Debug, Clone)]
pub struct Processed {
    pub original: String,
    pub corrected: String,
    pub summary: String,
    pub duration: Duration,
    pub outcome: Outcome,
}

impl Processed {
    pub fn ok(
        original: impl Into<String>,
        corrected: impl Into<String>,
        summary: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            original: original.into(),
            corrected: corrected.into(),
            summary: summary.into(),
            duration,
            outcome: Outcome::Ok,
        }
    }

    /// Both legs fall back to the original input.
    pub fn degraded(original: impl Into<String>, error: &BotError) -> Self {
        let original = original.into();
        Self {
            corrected: original.clone(),
            summary: original.clone(),
            original,
            duration: Duration::ZERO,
            outcome: Outcome::degraded(error),
        }
    }
}
