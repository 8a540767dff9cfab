pub mod client;
pub mod events;

pub use client::{SlackClient, SlackReplySink};
pub use events::{SlackAdapter, SlackConfig};
