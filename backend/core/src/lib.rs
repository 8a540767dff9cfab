pub mod error;
pub mod event;
pub mod formats;
pub mod result;
pub mod traits;

pub use error::BotError;
pub use event::{MentionEvent, Reply, SlackFile};
pub use result::{Outcome, Processed, Refinement, Transcription};
pub use traits::{AttachmentFetcher, ReplySink, SpeechToText, TextProcessor, TextRefiner};
