//! Secondary provider: the Anthropic Messages API.
//!
//! Invoked by the orchestrator only after the primary fails. The parameter
//! surface is narrower than the primary's: the adapter accepts the prompt
//! only, with a fixed model and a fixed output budget.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::providers::{Completion, GenerationParams, ProviderError, ProviderKind, TextProvider};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The fixed fallback model.
pub const MODEL: &str = "claude-3-haiku-20240307";
const MAX_TOKENS: u32 = 1024;
const MAX_RETRIES: u32 = 3;

/// Single blended rate per 1000 tokens (prompt and completion priced alike).
pub const BLENDED_COST_PER_1K: f64 = 0.02;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    /// Text of the first text block, if any.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The fallback generation adapter.
#[derive(Clone)]
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Pure cost model: one blended per-token rate.
    pub fn blended_cost(total_tokens: u32) -> f64 {
        f64::from(total_tokens) / 1000.0 * BLENDED_COST_PER_1K
    }

    /// Sends the prompt. This is the adapter's whole parameter surface;
    /// model and output budget are fixed.
    async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let request_body = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<ProviderError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Anthropic call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ProviderError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Anthropic API returned {}: {}", status, body);
                last_error = Some(ProviderError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(ProviderError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let messages: MessagesResponse = response
                .json()
                .await
                .map_err(ProviderError::Http)?;

            let text = messages.text().map(str::trim).unwrap_or_default().to_string();

            if text.is_empty() {
                return Err(ProviderError::EmptyCompletion);
            }

            debug!(
                "Anthropic call succeeded: input_tokens={}, output_tokens={}",
                messages.usage.input_tokens, messages.usage.output_tokens
            );

            return Ok(Completion {
                text,
                model: messages.model,
                prompt_tokens: messages.usage.input_tokens,
                completion_tokens: messages.usage.output_tokens,
            });
        }

        Err(last_error.unwrap_or(ProviderError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait::async_trait]
impl TextProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        MODEL
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<Completion, ProviderError> {
        // Narrow surface: sampling params are not forwarded.
        self.complete(prompt).await
    }

    fn cost_usd(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        Self::blended_cost(prompt_tokens + completion_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blended_cost_1000_tokens_is_0_02() {
        let cost = AnthropicProvider::blended_cost(1000);
        assert!((cost - 0.02).abs() < 1e-9, "expected 0.02, got {cost}");
    }

    #[test]
    fn test_trait_cost_matches_blended_split() {
        let p = AnthropicProvider::new("sk-ant-test".to_string(), 5);
        let split = p.cost_usd(400, 600);
        let blended = AnthropicProvider::blended_cost(1000);
        assert!((split - blended).abs() < 1e-9);
    }

    #[test]
    fn test_messages_response_text_extraction() {
        let json = r#"{
            "model": "claude-3-haiku-20240307",
            "content": [
                {"type": "thinking", "text": null},
                {"type": "text", "text": "First text block"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), Some("First text block"));
        assert_eq!(parsed.usage.output_tokens, 5);
    }

    #[test]
    fn test_messages_response_no_text_block() {
        let json = r#"{
            "model": "claude-3-haiku-20240307",
            "content": [],
            "usage": {"input_tokens": 10, "output_tokens": 0}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), None);
    }
}
