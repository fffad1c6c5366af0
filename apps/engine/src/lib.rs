//! Plume generation engine: orchestration and resilient parsing between
//! the dashboard and the language-model providers.
//!
//! The dashboard's HTTP layer constructs a [`GenerationOrchestrator`] once
//! and calls [`GenerationOrchestrator::generate_content`] per request. The
//! orchestrator bounds concurrent provider calls, falls back from the
//! primary to the secondary adapter on failure, builds prompts from the
//! content-type taxonomy, and recovers structured content from whatever the
//! model actually returned. Callers always receive a [`GenerationResponse`]
//! envelope: success or typed error, never a raw exception.

pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod personalization;
pub mod prompts;
pub mod providers;

pub use config::EngineConfig;
pub use errors::{EngineError, ErrorDetail, ErrorKind};
pub use models::{
    ContentType, CustomizationOptions, GenerationMetadata, GenerationRequest,
    GenerationResponse, HumanLikeOptions, MainGoal, ParsedContent, ProviderPreference,
    ResponseStatus, Slide, Tone,
};
pub use orchestrator::GenerationOrchestrator;
pub use parser::{ParseOutcome, MIN_STORY_LENGTH};
pub use personalization::{NullPersonalization, PersonalizationContext, PersonalizationSource};
pub use providers::{
    AnthropicProvider, Completion, GenerationParams, OpenAiProvider, ProviderError, ProviderKind,
    TextProvider,
};
