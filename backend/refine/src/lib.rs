//! LLM text refinement: proofreading, summarization, and the combined
//! proofread + summarize pass used for bare audio uploads.
//!
//! All three clients share one degrade convention: on any remote failure the
//! result carries the original input text plus a `Degraded` outcome, so the
//! pipeline always has something to reply with.

pub mod chat;
pub mod prompts;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{info, warn};

use chat::{ChatClient, CompletionRequest};
use zackly_core::{Processed, Refinement, TextProcessor, TextRefiner};

/// Sampling temperature shared by all refinement calls.
pub const REFINE_TEMPERATURE: f32 = 0.3;
/// Proofreading may need to reproduce the whole transcript.
pub const PROOFREAD_MAX_TOKENS: u32 = 4000;
/// Summaries are expected to be shorter than their input.
pub const SUMMARY_MAX_TOKENS: u32 = 2000;

pub struct Proofreader {
    chat: Arc<ChatClient>,
    model: String,
}

impl Proofreader {
    pub fn new(chat: Arc<ChatClient>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    fn request<'a>(&'a self, text: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            system_prompt: prompts::PROOFREADING_PROMPT,
            user_text: text,
            temperature: REFINE_TEMPERATURE,
            max_tokens: PROOFREAD_MAX_TOKENS,
        }
    }
}

#[async_trait]
impl TextRefiner for Proofreader {
    async fn refine(&self, text: &str) -> Refinement {
        if text.trim().is_empty() {
            return Refinement::ok(text, "", Duration::ZERO);
        }
        info!("proofreading transcript");
        let start = Instant::now();
        match self.chat.complete(&self.request(text)).await {
            Ok(corrected) => Refinement::ok(text, corrected, start.elapsed()),
            Err(err) => {
                warn!(error = %err, "proofreading degraded, keeping original text");
                Refinement::degraded(text, &err)
            }
        }
    }
}

pub struct Summarizer {
    chat: Arc<ChatClient>,
    model: String,
}

impl Summarizer {
    pub fn new(chat: Arc<ChatClient>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    fn request<'a>(&'a self, text: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            system_prompt: prompts::SUMMARIZATION_PROMPT,
            user_text: text,
            temperature: REFINE_TEMPERATURE,
            max_tokens: SUMMARY_MAX_TOKENS,
        }
    }
}

#[async_trait]
impl TextRefiner for Summarizer {
    async fn refine(&self, text: &str) -> Refinement {
        if text.trim().is_empty() {
            return Refinement::ok(text, "", Duration::ZERO);
        }
        info!("summarizing transcript");
        let start = Instant::now();
        match self.chat.complete(&self.request(text)).await {
            Ok(summary) => Refinement::ok(text, summary, start.elapsed()),
            Err(err) => {
                warn!(error = %err, "summarization degraded, keeping original text");
                Refinement::degraded(text, &err)
            }
        }
    }
}

/// Proofread and summarize in one pass; the two completions run
/// concurrently and are joined before the result is assembled.
pub struct CombinedProcessor {
    proofreader: Proofreader,
    summarizer: Summarizer,
}

impl CombinedProcessor {
    pub fn new(chat: Arc<ChatClient>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            proofreader: Proofreader::new(chat.clone(), model.clone()),
            summarizer: Summarizer::new(chat, model),
        }
    }
}

#[async_trait]
impl TextProcessor for CombinedProcessor {
    async fn process(&self, text: &str) -> Processed {
        if text.trim().is_empty() {
            return Processed::ok(text, "", "", Duration::ZERO);
        }
        info!("proofreading and summarizing transcript");
        let start = Instant::now();
        let proofread_request = self.proofreader.request(text);
        let summary_request = self.summarizer.request(text);
        let (corrected, summary) = tokio::join!(
            self.proofreader.chat.complete(&proofread_request),
            self.summarizer.chat.complete(&summary_request),
        );
        match (corrected, summary) {
            (Ok(corrected), Ok(summary)) => {
                Processed::ok(text, corrected, summary, start.elapsed())
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "combined processing degraded, keeping original text");
                Processed::degraded(text, &err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zackly_core::Outcome;

    // Unroutable endpoint: any request that does reach the network fails fast.
    fn chat() -> Arc<ChatClient> {
        Arc::new(
            ChatClient::new("sk-test", Duration::from_secs(2))
                .with_base_url("http://127.0.0.1:1"),
        )
    }

    #[tokio::test]
    async fn empty_input_short_circuits_proofreader() {
        let result = Proofreader::new(chat(), "gpt-4o").refine("   ").await;
        assert_eq!(result.outcome, Outcome::Ok);
        assert!(result.text.is_empty());
    }

    #[tokio::test]
    async fn empty_input_short_circuits_summarizer() {
        let result = Summarizer::new(chat(), "gpt-4o").refine("").await;
        assert_eq!(result.outcome, Outcome::Ok);
        assert!(result.text.is_empty());
    }

    #[tokio::test]
    async fn empty_input_short_circuits_combined() {
        let result = CombinedProcessor::new(chat(), "gpt-4o").process("").await;
        assert_eq!(result.outcome, Outcome::Ok);
        assert!(result.corrected.is_empty());
        assert!(result.summary.is_empty());
    }

    #[tokio::test]
    async fn remote_failure_degrades_to_original_text() {
        let result = Proofreader::new(chat(), "gpt-4o")
            .refine("transcript body")
            .await;
        assert!(result.outcome.is_degraded());
        assert_eq!(result.text, "transcript body");
        assert_eq!(result.original, "transcript body");
    }

    #[tokio::test]
    async fn combined_failure_keeps_original_in_both_legs() {
        let result = CombinedProcessor::new(chat(), "gpt-4o")
            .process("transcript body")
            .await;
        assert!(result.outcome.is_degraded());
        assert_eq!(result.corrected, "transcript body");
        assert_eq!(result.summary, "transcript body");
    }
}
