//! Prompt Builder: turns a generation request into provider instruction text.
//!
//! Template selection is keyed by the same `ContentType` tag the parser
//! branches on, so structural demands (separator token, carousel JSON shape)
//! and recovery logic cannot drift apart. The builder itself performs no
//! randomness: identical inputs produce identical prompts.

use crate::models::{ContentType, GenerationRequest};
use crate::personalization::PersonalizationContext;

pub mod humanize;
pub mod templates;

use crate::prompts::templates::*;

/// Builds the full provider prompt: personalization block, type-specific
/// body, toggle instructions, and the optional human-likeness block.
pub fn build_prompt(
    request: &GenerationRequest,
    personalization: Option<&PersonalizationContext>,
) -> String {
    let mut prompt = personalization_block(personalization);
    prompt.push_str("\n\n");
    prompt.push_str(&body(request));

    let c = &request.customization;
    let mut extras: Vec<&str> = Vec::new();
    if c.add_hashtags {
        extras.push(HASHTAG_INSTRUCTION);
    }
    if c.add_emojis {
        extras.push(EMOJI_INSTRUCTION);
    }
    if c.add_cta {
        extras.push(CTA_INSTRUCTION);
    }
    if !extras.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(&extras.join("\n"));
    }

    if let Some(human_like) = &c.human_like {
        prompt.push_str("\n\n");
        prompt.push_str(&humanize::human_likeness_block(human_like));
    }

    prompt
}

/// An absent context and an incomplete one are treated identically.
fn personalization_block(personalization: Option<&PersonalizationContext>) -> String {
    match personalization {
        Some(ctx) if ctx.complete => PERSONALIZATION_HEADER.replace("{context}", &ctx.text),
        _ => PERSONALIZATION_FALLBACK.to_string(),
    }
}

/// Selects and fills the type-specific template body.
fn body(request: &GenerationRequest) -> String {
    let template = match request.content_type {
        ContentType::LinkedinPost => LINKEDIN_POST_TEMPLATE.to_string(),
        ContentType::Article => ARTICLE_TEMPLATE.to_string(),
        ContentType::Topics => TOPICS_TEMPLATE.to_string(),
        ContentType::Carousel => CAROUSEL_TEMPLATE.to_string(),
        ContentType::Story => STORY_TEMPLATE.to_string(),
        ContentType::List => generic("bulleted-list", LIST_RULES),
        ContentType::Quote => generic("quote", QUOTE_RULES),
        ContentType::BeforeAfter => generic("before-and-after", BEFORE_AFTER_RULES),
        ContentType::Tips => generic("practical-tips", TIPS_RULES),
        ContentType::Insights => generic("insight", INSIGHTS_RULES),
        ContentType::Question => generic("discussion-question", QUESTION_RULES),
    };
    fill(&template, request)
}

/// Instantiates the shared scaffold for a simple format.
fn generic(format_label: &str, format_rules: &str) -> String {
    GENERIC_TEMPLATE
        .replace("{format_label}", format_label)
        .replace("{format_rules}", format_rules)
}

/// Substitutes the common placeholders shared by every template.
fn fill(template: &str, request: &GenerationRequest) -> String {
    let c = &request.customization;
    template
        .replace("{topic}", request.topic.trim())
        .replace("{tone}", c.tone.as_str())
        .replace("{language}", &c.language)
        .replace("{word_count}", &c.word_count.to_string())
        .replace("{audience}", &c.target_audience)
        .replace("{goal}", c.main_goal.as_str())
        .replace("{variant_count}", &c.variant_count.to_string())
        .replace("{slide_count}", &c.slide_count.to_string())
        .replace("{separator}", VARIANT_SEPARATOR)
        .replace("{context_lines}", &context_lines(request))
}

/// Optional niche / sub-format lines. Empty when the caller supplied neither.
fn context_lines(request: &GenerationRequest) -> String {
    let c = &request.customization;
    let mut lines = String::new();
    if !c.niche.trim().is_empty() {
        lines.push_str(&format!("Niche: {}.\n", c.niche.trim()));
    }
    if let Some(format) = c.content_format.as_deref() {
        if !format.trim().is_empty() {
            lines.push_str(&format!("Requested format: {}.\n", format.trim()));
        }
    }
    lines
}
