//! Provider adapters: the only modules that talk to language-model APIs.
//!
//! ARCHITECTURAL RULE: no other module may call a provider API directly.
//! The orchestrator owns routing (primary first, secondary on failure);
//! adapters own wire formats, parameter shaping, and cost accounting.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

/// Which concrete provider produced a completion. Reported back to callers
/// in response metadata so fallback generations are attributable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

/// Sampling parameters forwarded to an adapter.
///
/// Adapters are free to pin or ignore fields that their API surface does not
/// expose; the primary pins temperature for tone consistency, the secondary
/// accepts the prompt only.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A successful completion from a provider, with token accounting.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Completion {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Adapter-level failure. Transport problems, API rejections, rate limiting,
/// and empty completions all surface here; the orchestrator decides whether
/// to fall back.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Provider returned an empty completion")]
    EmptyCompletion,
}

/// A text-generation provider.
///
/// `cost_usd` must be a pure function of token counts so it can be unit
/// tested without network access.
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Completion, ProviderError>;

    fn cost_usd(&self, prompt_tokens: u32, completion_tokens: u32) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ProviderKind::OpenAi).unwrap(),
            r#""openai""#
        );
        assert_eq!(
            serde_json::to_string(&ProviderKind::Anthropic).unwrap(),
            r#""anthropic""#
        );
    }

    #[test]
    fn test_completion_total_tokens() {
        let c = Completion {
            text: "hello".to_string(),
            model: "test".to_string(),
            prompt_tokens: 120,
            completion_tokens: 80,
        };
        assert_eq!(c.total_tokens(), 200);
    }
}
