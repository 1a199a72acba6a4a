//! The generate module wraps a text-generation model behind the single
//! `prompt → text` call every other stage needs.

use std::time::Duration;

use anyhow::Result;
use llm::builder::LLMBuilder;
use llm::chat::{ChatMessage, ChatProvider};
use llm::LLMProvider;
use log::trace;
use once_cell::sync::Lazy;
use rate_guard::{RateLimit, StdTokenBucket, TokenBucketBuilder};
use regex::Regex;

use crate::constants::{DEFAULT_TIMEOUT_MS, THINK_STRIPPER};

static THINK_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(THINK_STRIPPER).expect("Failed to compile THINK_STRIPPER regex"));

/// Context containing shared data for text-generation calls
pub struct GenerationContext<'a> {
    /// LLM model to send prompts to
    pub model: &'a dyn ChatProvider,
    /// Rate limiter for controlling request frequency
    pub rate_limiter: Option<&'a StdTokenBucket>,
    /// Deadline for a single model call
    pub timeout: Duration,
}

impl<'a> GenerationContext<'a> {
    #[must_use]
    pub fn new(model: &'a dyn ChatProvider) -> Self {
        Self {
            model,
            rate_limiter: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

/// Builds the model from a configured builder.
///
/// Temperature is applied here so every prompt sent through the returned
/// model uses it.
///
/// # Errors
///
/// Returns an error if the backend rejects the builder settings.
pub fn build_model(llm_builder: LLMBuilder, temperature: f32) -> Result<Box<dyn LLMProvider>> {
    llm_builder
        .temperature(temperature)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build LLM model: {}", e))
}

/// Creates a token bucket allowing `rpm` requests per minute.
#[must_use]
pub fn rate_limiter(rpm: u32) -> Option<StdTokenBucket> {
    let capacity = u64::from(rpm.max(1));
    let refill_interval = Duration::from_secs_f64(60.0 / capacity as f64);

    TokenBucketBuilder::builder()
        .capacity(capacity)
        .refill_amount(1_u64)
        .refill_every(refill_interval)
        .with_time(rate_guard::StdTimeSource::new())
        .with_precision::<rate_guard::Nanos>()
        .build()
        .ok()
}

/// Sends a single prompt to the model and returns its answer with any
/// `<think>` block removed and whitespace trimmed.
///
/// # Errors
///
/// Returns an error if the model call fails or does not answer within
/// `ctx.timeout`.
pub async fn generate(ctx: &GenerationContext<'_>, prompt: &str) -> Result<String> {
    let messages = vec![ChatMessage::user().content(prompt).build()];

    if let Some(limiter) = ctx.rate_limiter {
        while limiter.try_acquire(1).is_err() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    trace!("Prompt: {prompt}");

    let response = tokio::time::timeout(ctx.timeout, ctx.model.chat(&messages))
        .await
        .map_err(|_| anyhow::anyhow!("LLM timed out after {:?}.", ctx.timeout))?
        .map_err(|err| anyhow::anyhow!("LLM error: {err}."))?
        .to_string();

    trace!("Response: {response}");

    Ok(strip_thinking(&response))
}

/// Removes a leading `<think>...</think>` block and trims the rest.
#[must_use]
pub fn strip_thinking(response: &str) -> String {
    THINK_STRIPPER_REGEX
        .replace_all(response, "")
        .trim()
        .to_owned()
}
