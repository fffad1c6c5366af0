//! Shared data model for the generation engine.
//!
//! Requests and responses are immutable once constructed; the response is
//! the single envelope handed back to callers whether generation succeeded
//! or failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ErrorDetail;
use crate::providers::ProviderKind;

// ────────────────────────────────────────────────────────────────────────────
// Content taxonomy
// ────────────────────────────────────────────────────────────────────────────

/// Closed set of content types. Each variant selects both a prompt template
/// and a parser branch; extending the set means adding both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    LinkedinPost,
    Article,
    Topics,
    Carousel,
    Story,
    List,
    Quote,
    BeforeAfter,
    Tips,
    Insights,
    Question,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::LinkedinPost => "linkedin-post",
            ContentType::Article => "article",
            ContentType::Topics => "topics",
            ContentType::Carousel => "carousel",
            ContentType::Story => "story",
            ContentType::List => "list",
            ContentType::Quote => "quote",
            ContentType::BeforeAfter => "before-after",
            ContentType::Tips => "tips",
            ContentType::Insights => "insights",
            ContentType::Question => "question",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writing tone requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Friendly,
    Authoritative,
    Inspirational,
    Humorous,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Friendly => "friendly",
            Tone::Authoritative => "authoritative",
            Tone::Inspirational => "inspirational",
            Tone::Humorous => "humorous",
        }
    }
}

/// What the caller wants the content to achieve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainGoal {
    #[default]
    Engagement,
    Awareness,
    Leads,
    Authority,
    Community,
}

impl MainGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            MainGoal::Engagement => "engagement",
            MainGoal::Awareness => "awareness",
            MainGoal::Leads => "leads",
            MainGoal::Authority => "authority",
            MainGoal::Community => "community",
        }
    }
}

/// Advisory provider preference. Routing is always primary-first with
/// fallback; this field only shapes adapter-specific parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPreference {
    #[default]
    Primary,
    Secondary,
}

// ────────────────────────────────────────────────────────────────────────────
// Customization
// ────────────────────────────────────────────────────────────────────────────

/// Human-likeness knobs. Numeric levels are 0–100 and interpreted
/// qualitatively by the prompt builder (>70 high, >40 medium, else low).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanLikeOptions {
    pub ambiguity: u8,
    pub randomness: u8,
    pub emotional_depth: u8,
    pub personal_touch: bool,
    pub storytelling: bool,
    pub conversational_style: bool,
}

impl Default for HumanLikeOptions {
    fn default() -> Self {
        Self {
            ambiguity: 30,
            randomness: 30,
            emotional_depth: 50,
            personal_touch: false,
            storytelling: false,
            conversational_style: false,
        }
    }
}

/// Per-request generation preferences collected by the dashboard forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomizationOptions {
    pub tone: Tone,
    pub language: String,
    /// Target length per variant, in words. Must be positive.
    pub word_count: u32,
    pub target_audience: String,
    pub main_goal: MainGoal,
    /// Requested sub-format within the content type, free-form.
    pub content_format: Option<String>,
    pub niche: String,
    pub add_hashtags: bool,
    pub add_emojis: bool,
    pub add_cta: bool,
    /// Sampling hint. Adapters may pin or ignore it.
    pub temperature: f32,
    pub max_tokens: u32,
    /// How many independent variants to request for multi-variant types.
    pub variant_count: u32,
    /// Carousel length, including intro and outro slides.
    pub slide_count: u32,
    pub human_like: Option<HumanLikeOptions>,
}

impl Default for CustomizationOptions {
    fn default() -> Self {
        Self {
            tone: Tone::default(),
            language: "english".to_string(),
            word_count: 150,
            target_audience: "general audience".to_string(),
            main_goal: MainGoal::default(),
            content_format: None,
            niche: String::new(),
            add_hashtags: false,
            add_emojis: false,
            add_cta: false,
            temperature: 0.7,
            max_tokens: 1024,
            variant_count: 2,
            slide_count: 5,
            human_like: None,
        }
    }
}

impl CustomizationOptions {
    /// Rejects malformed customization before any queue slot is consumed.
    pub fn validate(&self, content_type: ContentType) -> Result<(), String> {
        if self.word_count == 0 {
            return Err("word_count must be positive".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be positive".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            ));
        }
        if self.variant_count == 0 {
            return Err("variant_count must be positive".to_string());
        }
        if content_type == ContentType::Carousel && self.slide_count < 3 {
            return Err("slide_count must be at least 3 (intro, body, outro)".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / response envelope
// ────────────────────────────────────────────────────────────────────────────

/// One generation request. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub id: Uuid,
    pub content_type: ContentType,
    pub topic: String,
    pub provider: ProviderPreference,
    pub customization: CustomizationOptions,
    /// Caller identity, used only to fetch external personalization context.
    pub caller_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Informational only; the queue is strictly FIFO and never reorders.
    pub priority: u8,
}

impl GenerationRequest {
    pub fn new(
        content_type: ContentType,
        topic: impl Into<String>,
        provider: ProviderPreference,
        customization: CustomizationOptions,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content_type,
            topic: topic.into(),
            provider,
            customization,
            caller_id: None,
            created_at: Utc::now(),
            priority: 0,
        }
    }

    pub fn with_caller(mut self, caller_id: Uuid) -> Self {
        self.caller_id = Some(caller_id);
        self
    }

    /// How many blocks the parser should recover for this request.
    pub fn expected_variants(&self) -> usize {
        match self.content_type {
            ContentType::Story => 1,
            ContentType::Carousel => self.customization.slide_count as usize,
            _ => self.customization.variant_count as usize,
        }
    }
}

/// Structured content recovered from raw provider output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParsedContent {
    Single(String),
    Variants(Vec<String>),
    SlideDeck(Vec<Slide>),
}

impl ParsedContent {
    pub fn as_variants(&self) -> Option<&[String]> {
        match self {
            ParsedContent::Variants(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_slides(&self) -> Option<&[Slide]> {
        match self {
            ParsedContent::SlideDeck(s) => Some(s),
            _ => None,
        }
    }
}

/// One carousel slide. The deck contract is positional: slide 0 is an intro,
/// the final slide is an outro, and every interior slide is a body slide
/// with a heading and at least three bullets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slide {
    Intro { title: String, hook: String },
    Body { heading: String, bullets: Vec<String> },
    Outro { summary: String, call_to_action: String },
}

impl Slide {
    pub fn is_intro(&self) -> bool {
        matches!(self, Slide::Intro { .. })
    }

    pub fn is_body(&self) -> bool {
        matches!(self, Slide::Body { .. })
    }

    pub fn is_outro(&self) -> bool {
        matches!(self, Slide::Outro { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Accounting for a completed provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// The provider that actually produced the text (fallback-aware).
    pub provider: ProviderKind,
    pub model: String,
    pub tokens_used: u32,
    pub processing_ms: u64,
    pub cost_usd: f64,
}

/// The uniform envelope returned for every request, success or error.
/// Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub id: Uuid,
    pub request_id: Uuid,
    pub content: Option<ParsedContent>,
    pub metadata: Option<GenerationMetadata>,
    pub status: ResponseStatus,
    pub error: Option<ErrorDetail>,
    /// True when the parser recovered content through a late-cascade
    /// fallback or synthesized filler. Downstream quality gates key on this.
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
}

impl GenerationResponse {
    pub(crate) fn success(
        request_id: Uuid,
        content: ParsedContent,
        metadata: GenerationMetadata,
        degraded: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            content: Some(content),
            metadata: Some(metadata),
            status: ResponseStatus::Success,
            error: None,
            degraded,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn failure(request_id: Uuid, error: ErrorDetail) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            content: None,
            metadata: None,
            status: ResponseStatus::Error,
            error: Some(error),
            degraded: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ContentType::LinkedinPost).unwrap(),
            r#""linkedin-post""#
        );
        assert_eq!(
            serde_json::to_string(&ContentType::BeforeAfter).unwrap(),
            r#""before-after""#
        );
        let parsed: ContentType = serde_json::from_str(r#""carousel""#).unwrap();
        assert_eq!(parsed, ContentType::Carousel);
    }

    #[test]
    fn test_content_type_as_str_round_trips_serde() {
        for ct in [
            ContentType::LinkedinPost,
            ContentType::Article,
            ContentType::Topics,
            ContentType::Carousel,
            ContentType::Story,
            ContentType::List,
            ContentType::Quote,
            ContentType::BeforeAfter,
            ContentType::Tips,
            ContentType::Insights,
            ContentType::Question,
        ] {
            let wire = serde_json::to_string(&ct).unwrap();
            assert_eq!(wire, format!("\"{}\"", ct.as_str()));
        }
    }

    #[test]
    fn test_customization_defaults() {
        let c = CustomizationOptions::default();
        assert_eq!(c.language, "english");
        assert_eq!(c.variant_count, 2);
        assert_eq!(c.slide_count, 5);
        assert!(c.human_like.is_none());
        assert!(c.validate(ContentType::LinkedinPost).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_word_count() {
        let c = CustomizationOptions {
            word_count: 0,
            ..Default::default()
        };
        assert!(c.validate(ContentType::LinkedinPost).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let c = CustomizationOptions {
            temperature: 3.5,
            ..Default::default()
        };
        assert!(c.validate(ContentType::Article).is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_carousel_only_for_carousel() {
        let c = CustomizationOptions {
            slide_count: 2,
            ..Default::default()
        };
        assert!(c.validate(ContentType::Carousel).is_err());
        assert!(c.validate(ContentType::LinkedinPost).is_ok());
    }

    #[test]
    fn test_expected_variants_per_type() {
        let customization = CustomizationOptions {
            variant_count: 3,
            slide_count: 6,
            ..Default::default()
        };
        let make = |ct| {
            GenerationRequest::new(ct, "remote work", ProviderPreference::Primary, customization.clone())
        };
        assert_eq!(make(ContentType::Story).expected_variants(), 1);
        assert_eq!(make(ContentType::Carousel).expected_variants(), 6);
        assert_eq!(make(ContentType::LinkedinPost).expected_variants(), 3);
        assert_eq!(make(ContentType::Topics).expected_variants(), 3);
    }

    #[test]
    fn test_slide_untagged_deserialization() {
        let intro: Slide =
            serde_json::from_str(r#"{"title": "Remote work", "hook": "Five hard truths"}"#)
                .unwrap();
        assert!(intro.is_intro());

        let body: Slide = serde_json::from_str(
            r#"{"heading": "Boundaries", "bullets": ["Set hours", "Log off", "Say no"]}"#,
        )
        .unwrap();
        assert!(body.is_body());

        let outro: Slide = serde_json::from_str(
            r#"{"summary": "Protect your time", "call_to_action": "Follow for more"}"#,
        )
        .unwrap();
        assert!(outro.is_outro());
    }

    #[test]
    fn test_customization_deserializes_with_partial_fields() {
        // Dashboard forms send sparse payloads; everything else defaults.
        let c: CustomizationOptions =
            serde_json::from_str(r#"{"tone": "casual", "word_count": 80}"#).unwrap();
        assert_eq!(c.tone, Tone::Casual);
        assert_eq!(c.word_count, 80);
        assert_eq!(c.language, "english");
    }

    #[test]
    fn test_response_constructors() {
        let request_id = Uuid::new_v4();
        let ok = GenerationResponse::success(
            request_id,
            ParsedContent::Single("hello".to_string()),
            GenerationMetadata {
                provider: crate::providers::ProviderKind::OpenAi,
                model: "gpt-4".to_string(),
                tokens_used: 10,
                processing_ms: 5,
                cost_usd: 0.001,
            },
            false,
        );
        assert!(ok.is_success());
        assert_eq!(ok.request_id, request_id);
        assert!(ok.error.is_none());

        let err = GenerationResponse::failure(
            request_id,
            crate::errors::ErrorDetail {
                kind: crate::errors::ErrorKind::Provider,
                message: "both providers failed".to_string(),
            },
        );
        assert!(!err.is_success());
        assert!(err.content.is_none());
        assert!(err.metadata.is_none());
    }
}
