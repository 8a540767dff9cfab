use thiserror::Error;

/// Top-level error type for the zackly pipeline.
///
/// None of these are fatal to the process: clients catch at their own
/// boundary and convert the error into a degraded result, so the user
/// always receives a reply.
#[derive(Debug, Error)]
pub enum BotError {
    /// Rejected before any network call (unsupported format, missing file).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Download or remote API call failed — network error or non-success status.
    #[error("{stage} transport error: {message}")]
    Transport { stage: &'static str, message: String },

    /// An outbound call exceeded its deadline.
    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: &'static str, secs: u64 },

    /// The remote call succeeded but returned no usable text.
    #[error("empty result: {0}")]
    EmptyResult(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BotError {
    /// Classify a reqwest-shaped failure into `Timeout` or `Transport`.
    ///
    /// Kept here so every client maps outbound failures the same way.
    pub fn from_outbound(stage: &'static str, timed_out: bool, secs: u64, message: String) -> Self {
        if timed_out {
            BotError::Timeout { stage, secs }
        } else {
            BotError::Transport { stage, message }
        }
    }
}
