//! Event dispatch and orchestration for the zackly bot.

pub mod classify;
pub mod service;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error};

use zackly_core::{MentionEvent, ReplySink};

pub use classify::{Intent, classify, normalize_mention};
pub use service::{MessageService, Services};

/// Classify one mention and run the matching pipeline to its terminal reply.
pub async fn handle_mention(
    event: MentionEvent,
    say: Arc<dyn ReplySink>,
    services: Arc<Services>,
) {
    let normalized = normalize_mention(event.text.as_deref());
    let intent = classify(
        normalized.as_deref(),
        event.first_file().and_then(|f| f.filetype.as_deref()),
    );
    debug!(?intent, text = ?normalized, "dispatching mention");

    let service = MessageService::new(event, say, services);
    let result = match intent {
        Intent::Ping => service.do_ping().await,
        Intent::Help => service.do_help().await,
        Intent::Transcribe => service.request_transcription().await,
        Intent::Summarize => service.request_summary().await,
        Intent::PendingBoth => service.request_both().await,
        Intent::Unrecognized => service.do_otherwise().await,
    };
    if let Err(err) = result {
        error!("reply delivery failed: {err:#}");
    }
}

/// Consume mention events and run each pipeline in its own task.
///
/// Events share no mutable state; `make_sink` binds a reply sink to the
/// originating channel per event.
pub async fn run_worker<F>(
    mut events_rx: mpsc::Receiver<MentionEvent>,
    services: Arc<Services>,
    make_sink: F,
) where
    F: Fn(&MentionEvent) -> Arc<dyn ReplySink> + Send + Sync + 'static,
{
    while let Some(event) = events_rx.recv().await {
        let say = make_sink(&event);
        let services = services.clone();
        tokio::spawn(async move {
            handle_mention(event, say, services).await;
        });
    }
}
