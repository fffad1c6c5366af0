//! Primary provider: OpenAI chat completions.
//!
//! Temperature is pinned to a fixed value regardless of the caller's hint:
//! output tone stays stable across requests, at the cost of some creativity.
//! The caller's max-token limit is honored.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::providers::{Completion, GenerationParams, ProviderError, ProviderKind, TextProvider};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all primary generations.
pub const MODEL: &str = "gpt-4";
/// Pinned sampling temperature. The caller's hint is accepted in the
/// interface but not forwarded.
pub const PINNED_TEMPERATURE: f32 = 0.7;
const MAX_RETRIES: u32 = 3;

/// Cost per 1000 prompt tokens, in USD.
pub const PROMPT_COST_PER_1K: f64 = 0.03;
/// Cost per 1000 completion tokens, in USD.
pub const COMPLETION_COST_PER_1K: f64 = 0.06;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    usage: ChatUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// The primary generation adapter. Retries on 429 and 5xx with exponential
/// backoff before surfacing a `ProviderError` to the orchestrator.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    fn request_body<'a>(&self, prompt: &'a str, params: &GenerationParams) -> ChatRequest<'a> {
        ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            // Pinned; params.temperature is deliberately not forwarded.
            temperature: PINNED_TEMPERATURE,
            max_tokens: params.max_tokens,
        }
    }
}

#[async_trait::async_trait]
impl TextProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        MODEL
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Completion, ProviderError> {
        let request_body = self.request_body(prompt, params);

        let mut last_error: Option<ProviderError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "OpenAI call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(OPENAI_API_URL)
                .bearer_auth(&self.api_key)
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
                warn!("OpenAI API returned {}: {}", status, body);
                last_error = Some(ProviderError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OpenAiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(ProviderError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat: ChatResponse = response
                .json()
                .await
                .map_err(ProviderError::Http)?;

            let text = chat
                .choices
                .first()
                .and_then(|c| c.message.content.as_deref())
                .map(str::trim)
                .unwrap_or_default()
                .to_string();

            if text.is_empty() {
                return Err(ProviderError::EmptyCompletion);
            }

            debug!(
                "OpenAI call succeeded: prompt_tokens={}, completion_tokens={}",
                chat.usage.prompt_tokens, chat.usage.completion_tokens
            );

            return Ok(Completion {
                text,
                model: chat.model,
                prompt_tokens: chat.usage.prompt_tokens,
                completion_tokens: chat.usage.completion_tokens,
            });
        }

        Err(last_error.unwrap_or(ProviderError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Pure cost model: distinct prompt and completion rates.
    fn cost_usd(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        f64::from(prompt_tokens) / 1000.0 * PROMPT_COST_PER_1K
            + f64::from(completion_tokens) / 1000.0 * COMPLETION_COST_PER_1K
    }
}
