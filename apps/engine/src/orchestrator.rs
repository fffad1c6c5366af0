//! Generation Orchestrator: owns the request queue and the provider
//! fallback path.
//!
//! Flow: enqueue → drain (FIFO, bounded in-flight) → build prompt → primary
//! adapter → secondary adapter on failure → parse → response envelope.
//!
//! Every enqueued request resolves to exactly one `GenerationResponse`,
//! success or error; callers never see a raw exception. Requests are
//! dispatched in submission order, but completion order is not guaranteed;
//! correlate by request id. The caller's provider preference is advisory
//! only: routing is always primary-first with fallback.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::models::{GenerationMetadata, GenerationRequest, GenerationResponse};
use crate::parser;
use crate::personalization::PersonalizationSource;
use crate::prompts;
use crate::providers::{
    AnthropicProvider, GenerationParams, OpenAiProvider, TextProvider,
};

/// A request waiting for a provider slot, paired with its completion handle.
struct QueueEntry {
    request: GenerationRequest,
    reply: oneshot::Sender<GenerationResponse>,
}

#[derive(Default)]
struct QueueState {
    queue: VecDeque<QueueEntry>,
    active: usize,
}

/// Dependency-injected orchestrator instance. Cheap to clone: clones share
/// the same queue and counters.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    primary: Arc<dyn TextProvider>,
    secondary: Arc<dyn TextProvider>,
    personalization: Arc<dyn PersonalizationSource>,
    max_concurrent: usize,
    state: Mutex<QueueState>,
}

impl GenerationOrchestrator {
    pub fn new(
        primary: Arc<dyn TextProvider>,
        secondary: Arc<dyn TextProvider>,
        personalization: Arc<dyn PersonalizationSource>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                primary,
                secondary,
                personalization,
                max_concurrent: max_concurrent.max(1),
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// Wires the real adapters from configuration.
    pub fn from_config(
        config: &EngineConfig,
        personalization: Arc<dyn PersonalizationSource>,
    ) -> Self {
        let primary = Arc::new(OpenAiProvider::new(
            config.openai_api_key.clone(),
            config.request_timeout_secs,
        ));
        let secondary = Arc::new(AnthropicProvider::new(
            config.anthropic_api_key.clone(),
            config.request_timeout_secs,
        ));
        Self::new(
            primary,
            secondary,
            personalization,
            config.max_concurrent_requests,
        )
    }

    /// Enqueues a request and waits for its envelope. Malformed
    /// customization is rejected before a queue slot is consumed.
    pub async fn generate_content(&self, request: GenerationRequest) -> GenerationResponse {
        if let Err(reason) = request.customization.validate(request.content_type) {
            warn!("Rejecting generation request {}: {}", request.id, reason);
            return GenerationResponse::failure(
                request.id,
                EngineError::Validation(reason).into(),
            );
        }

        let request_id = request.id;
        let (reply, receiver) = oneshot::channel();
        {
            let mut state = self.lock_state();
            state.queue.push_back(QueueEntry { request, reply });
            debug!("Request {} enqueued (depth {})", request_id, state.queue.len());
        }
        self.drain();

        match receiver.await {
            Ok(response) => response,
            Err(_) => GenerationResponse::failure(
                request_id,
                EngineError::Internal(anyhow::anyhow!(
                    "completion handle dropped without a response"
                ))
                .into(),
            ),
        }
    }

    /// Rejects every not-yet-dispatched request with a queue-cleared error.
    /// Requests already handed to a provider are unaffected.
    pub fn clear_queue(&self) {
        let drained: Vec<QueueEntry> = {
            let mut state = self.lock_state();
            state.queue.drain(..).collect()
        };
        if drained.is_empty() {
            return;
        }
        info!("Clearing generation queue: rejecting {} pending requests", drained.len());
        for entry in drained {
            let response =
                GenerationResponse::failure(entry.request.id, EngineError::QueueCleared.into());
            let _ = entry.reply.send(response);
        }
    }

    pub fn queue_depth(&self) -> usize {
        self.lock_state().queue.len()
    }

    pub fn active_count(&self) -> usize {
        self.lock_state().active
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        // A panicked dispatch task cannot leave the queue unusable.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Pops and dispatches entries while in-flight capacity allows. Pop and
    /// counter increment happen under a single lock acquisition so two drain
    /// cycles cannot claim the same entry or slot.
    fn drain(&self) {
        loop {
            let entry = {
                let mut state = self.lock_state();
                if state.active >= self.inner.max_concurrent {
                    return;
                }
                let Some(entry) = state.queue.pop_front() else {
                    return;
                };
                state.active += 1;
                entry
            };

            let orchestrator = self.clone();
            tokio::spawn(async move {
                let response = orchestrator.dispatch(entry.request).await;
                let _ = entry.reply.send(response);
                // Slot release runs whether dispatch succeeded or not.
                {
                    let mut state = orchestrator.lock_state();
                    state.active -= 1;
                }
                orchestrator.drain();
            });
        }
    }

    /// One request, end to end: personalization → prompt → primary adapter →
    /// secondary on failure → parse → envelope.
    async fn dispatch(&self, request: GenerationRequest) -> GenerationResponse {
        info!(
            "Dispatching generation {} ({})",
            request.id, request.content_type
        );

        let personalization = match request.caller_id {
            Some(caller_id) => match self.inner.personalization.get_context(caller_id).await {
                Ok(context) => context,
                Err(e) => {
                    // A broken story store must not block generation.
                    warn!("Personalization lookup failed for {}: {e:#}", request.id);
                    None
                }
            },
            None => None,
        };

        let prompt = prompts::build_prompt(&request, personalization.as_ref());
        let params = GenerationParams {
            temperature: request.customization.temperature,
            max_tokens: request.customization.max_tokens,
        };

        let started = Instant::now();
        let (completion, provider) = match self.inner.primary.generate(&prompt, &params).await {
            Ok(completion) => (completion, Arc::clone(&self.inner.primary)),
            Err(primary_error) => {
                warn!(
                    "Primary provider failed for {} ({}); falling back to secondary",
                    request.id, primary_error
                );
                match self.inner.secondary.generate(&prompt, &params).await {
                    Ok(completion) => (completion, Arc::clone(&self.inner.secondary)),
                    Err(secondary_error) => {
                        let error = EngineError::ProvidersExhausted {
                            primary: primary_error,
                            secondary: secondary_error,
                        };
                        warn!("Generation {} failed: {}", request.id, error);
                        return GenerationResponse::failure(request.id, error.into());
                    }
                }
            }
        };

        let outcome = parser::parse(
            &completion.text,
            request.content_type,
            request.expected_variants(),
        );
        if outcome.degraded {
            warn!(
                "Generation {} recovered through fallback parsing (lower confidence)",
                request.id
            );
        }

        let metadata = GenerationMetadata {
            provider: provider.kind(),
            model: completion.model.clone(),
            tokens_used: completion.total_tokens(),
            processing_ms: started.elapsed().as_millis() as u64,
            cost_usd: provider.cost_usd(completion.prompt_tokens, completion.completion_tokens),
        };
        info!(
            "Generation {} complete via {} in {}ms ({} tokens)",
            request.id,
            metadata.provider.as_str(),
            metadata.processing_ms,
            metadata.tokens_used
        );

        GenerationResponse::success(request.id, outcome.content, metadata, outcome.degraded)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::task::JoinSet;

    use super::*;
    use crate::errors::ErrorKind;
    use crate::models::{
        ContentType, CustomizationOptions, ParsedContent, ProviderPreference, ResponseStatus,
    };
    use crate::personalization::NullPersonalization;
    use crate::providers::{Completion, ProviderError, ProviderKind};

    // ────────────────────────────────────────────────────────────────────
    // Test providers
    // ────────────────────────────────────────────────────────────────────

    /// Returns fixed text after an optional delay, tracking call counts and
    /// peak concurrency.
    struct StaticProvider {
        kind: ProviderKind,
        text: String,
        delay: Duration,
        calls: AtomicUsize,
        active: AtomicUsize,
        peak: AtomicUsize,
        served_topics: Mutex<Vec<String>>,
    }

    impl StaticProvider {
        fn new(kind: ProviderKind, text: &str) -> Arc<Self> {
            Self::with_delay(kind, text, Duration::from_millis(0))
        }

        fn with_delay(kind: ProviderKind, text: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                kind,
                text: text.to_string(),
                delay,
                calls: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                served_topics: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextProvider for StaticProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn generate(
            &self,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<Completion, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now_active, Ordering::SeqCst);
            if let Some(line) = prompt.lines().find(|l| l.starts_with("TOPIC: ")) {
                self.served_topics
                    .lock()
                    .unwrap()
                    .push(line.trim_start_matches("TOPIC: ").to_string());
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(Completion {
                text: self.text.clone(),
                model: "mock-model".to_string(),
                prompt_tokens: 100,
                completion_tokens: 50,
            })
        }

        fn cost_usd(&self, _prompt_tokens: u32, _completion_tokens: u32) -> f64 {
            0.0
        }
    }

    /// Always fails with an API error.
    struct FailingProvider {
        kind: ProviderKind,
        calls: AtomicUsize,
    }

    impl FailingProvider {
        fn new(kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextProvider for FailingProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn model(&self) -> &str {
            "failing-model"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<Completion, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Api {
                status: 500,
                message: "upstream unavailable".to_string(),
            })
        }

        fn cost_usd(&self, _prompt_tokens: u32, _completion_tokens: u32) -> f64 {
            0.0
        }
    }

    fn orchestrator(
        primary: Arc<dyn TextProvider>,
        secondary: Arc<dyn TextProvider>,
        max_concurrent: usize,
    ) -> GenerationOrchestrator {
        GenerationOrchestrator::new(
            primary,
            secondary,
            Arc::new(NullPersonalization),
            max_concurrent,
        )
    }

    fn story_request(topic: &str) -> GenerationRequest {
        GenerationRequest::new(
            ContentType::Story,
            topic,
            ProviderPreference::Primary,
            CustomizationOptions::default(),
        )
    }

    // ────────────────────────────────────────────────────────────────────
    // End-to-end scenarios
    // ────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_topics_end_to_end_success() {
        let primary = StaticProvider::new(
            ProviderKind::OpenAi,
            r#"["Remote work boundaries", "Async-first culture"]"#,
        );
        let secondary = FailingProvider::new(ProviderKind::Anthropic);
        let orchestrator = orchestrator(primary, secondary.clone(), 3);

        let request = GenerationRequest::new(
            ContentType::Topics,
            "remote work",
            ProviderPreference::Primary,
            CustomizationOptions {
                word_count: 50,
                variant_count: 2,
                ..Default::default()
            },
        );
        let response = orchestrator.generate_content(request).await;

        assert_eq!(response.status, ResponseStatus::Success);
        assert!(!response.degraded);
        let metadata = response.metadata.expect("success carries metadata");
        assert_eq!(metadata.provider, ProviderKind::OpenAi);
        assert_eq!(metadata.tokens_used, 150);
        match response.content.expect("success carries content") {
            ParsedContent::Variants(topics) => {
                assert_eq!(topics, ["Remote work boundaries", "Async-first culture"]);
            }
            other => panic!("expected variants, got {other:?}"),
        }
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_secondary() {
        let primary = FailingProvider::new(ProviderKind::OpenAi);
        let secondary = StaticProvider::new(
            ProviderKind::Anthropic,
            "It started with one quiet decision that nobody noticed at the time.",
        );
        let orchestrator = orchestrator(primary.clone(), secondary.clone(), 3);

        let response = orchestrator.generate_content(story_request("quiet decisions")).await;

        assert_eq!(response.status, ResponseStatus::Success);
        let metadata = response.metadata.expect("success carries metadata");
        assert_eq!(metadata.provider, ProviderKind::Anthropic);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_both_providers_failing_yields_error_envelope() {
        let primary = FailingProvider::new(ProviderKind::OpenAi);
        let secondary = FailingProvider::new(ProviderKind::Anthropic);
        let orchestrator = orchestrator(primary, secondary, 3);

        let response = orchestrator.generate_content(story_request("doomed")).await;

        assert_eq!(response.status, ResponseStatus::Error);
        assert!(response.content.is_none());
        let error = response.error.expect("error envelope carries detail");
        assert_eq!(error.kind, ErrorKind::Provider);
        assert!(!error.message.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_customization_rejected_before_dispatch() {
        let primary = StaticProvider::new(ProviderKind::OpenAi, "unused");
        let secondary = FailingProvider::new(ProviderKind::Anthropic);
        let orchestrator = orchestrator(primary.clone(), secondary, 3);

        let request = GenerationRequest::new(
            ContentType::LinkedinPost,
            "anything",
            ProviderPreference::Primary,
            CustomizationOptions {
                word_count: 0,
                ..Default::default()
            },
        );
        let response = orchestrator.generate_content(request).await;

        assert_eq!(response.status, ResponseStatus::Error);
        assert_eq!(response.error.unwrap().kind, ErrorKind::Validation);
        assert_eq!(
            primary.calls.load(Ordering::SeqCst),
            0,
            "validation failures must not reach a provider"
        );
    }

    // ────────────────────────────────────────────────────────────────────
    // Queue behavior
    // ────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_concurrency_cap_holds_under_100_requests() {
        let primary = StaticProvider::with_delay(
            ProviderKind::OpenAi,
            "A short story for load testing purposes.",
            Duration::from_millis(5),
        );
        let secondary = FailingProvider::new(ProviderKind::Anthropic);
        let orchestrator = orchestrator(primary.clone(), secondary, 3);

        let mut tasks = JoinSet::new();
        for i in 0..100 {
            let orchestrator = orchestrator.clone();
            tasks.spawn(async move {
                orchestrator
                    .generate_content(story_request(&format!("topic {i}")))
                    .await
            });
        }
        let mut successes = 0;
        while let Some(result) = tasks.join_next().await {
            let response = result.expect("task must not panic");
            assert_eq!(response.status, ResponseStatus::Success);
            successes += 1;
        }

        assert_eq!(successes, 100, "every request resolves exactly once");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 100);
        assert!(
            primary.peak.load(Ordering::SeqCst) <= 3,
            "peak in-flight {} exceeded the cap",
            primary.peak.load(Ordering::SeqCst)
        );
        assert_eq!(orchestrator.queue_depth(), 0);
        assert_eq!(orchestrator.active_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_queue_rejects_pending_but_not_in_flight() {
        let primary = StaticProvider::with_delay(
            ProviderKind::OpenAi,
            "Still generating while the queue empties behind it.",
            Duration::from_millis(200),
        );
        let secondary = FailingProvider::new(ProviderKind::Anthropic);
        let orchestrator = orchestrator(primary.clone(), secondary, 1);

        let mut tasks = JoinSet::new();
        for i in 0..3 {
            let orchestrator = orchestrator.clone();
            tasks.spawn(async move {
                orchestrator
                    .generate_content(story_request(&format!("topic {i}")))
                    .await
            });
        }

        // Let the first request reach the provider, then clear.
        tokio::time::sleep(Duration::from_millis(50)).await;
        orchestrator.clear_queue();
        assert_eq!(orchestrator.queue_depth(), 0);

        let mut cleared = 0;
        let mut succeeded = 0;
        while let Some(result) = tasks.join_next().await {
            let response = result.expect("task must not panic");
            match response.status {
                ResponseStatus::Success => succeeded += 1,
                ResponseStatus::Error => {
                    assert_eq!(response.error.unwrap().kind, ErrorKind::QueueCleared);
                    cleared += 1;
                }
            }
        }

        assert_eq!(succeeded, 1, "the in-flight request must complete");
        assert_eq!(cleared, 2, "both pending requests must be rejected");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fifo_dispatch_ignores_priority() {
        let primary = StaticProvider::with_delay(
            ProviderKind::OpenAi,
            "Ordered output for the dispatch order test.",
            Duration::from_millis(10),
        );
        let secondary = FailingProvider::new(ProviderKind::Anthropic);
        let orchestrator = orchestrator(primary.clone(), secondary, 1);

        let mut tasks = JoinSet::new();
        for (i, topic) in ["first", "second", "third"].iter().enumerate() {
            let orchestrator = orchestrator.clone();
            let mut request = story_request(topic);
            // Later submissions get higher priority; it must not matter.
            request.priority = i as u8 * 10;
            tasks.spawn(async move { orchestrator.generate_content(request).await });
            // Make enqueue order deterministic.
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap().status, ResponseStatus::Success);
        }

        let served = primary.served_topics.lock().unwrap().clone();
        assert_eq!(served, ["first", "second", "third"]);
    }
}
