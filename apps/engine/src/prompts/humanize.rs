//! Human-likeness instruction block.
//!
//! Maps the 0–100 customization levels to literal instruction sentences.
//! Thresholds: >70 high, >40 medium, else low. The boolean flags contribute
//! fixed blocks independent of the numeric levels.

use crate::models::HumanLikeOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    High,
    Medium,
    Low,
}

fn level(value: u8) -> Level {
    if value > 70 {
        Level::High
    } else if value > 40 {
        Level::Medium
    } else {
        Level::Low
    }
}

fn ambiguity_rule(value: u8) -> &'static str {
    match level(value) {
        Level::High => {
            "Use open-ended statements that invite interpretation. \
             Leave one or two thoughts deliberately unresolved. \
             Avoid tidy, complete conclusions."
        }
        Level::Medium => {
            "Mix direct statements with a few open-ended ones. \
             Not every paragraph needs a resolution."
        }
        Level::Low => "Be direct and unambiguous throughout.",
    }
}

fn randomness_rule(value: u8) -> &'static str {
    match level(value) {
        Level::High => {
            "Vary sentence length unpredictably. Use unexpected analogies. \
             Allow an occasional tangent, as long as it still serves the point."
        }
        Level::Medium => {
            "Vary sentence rhythm and avoid formulaic transitions between ideas."
        }
        Level::Low => "Keep a steady, predictable structure.",
    }
}

fn emotional_depth_rule(value: u8) -> &'static str {
    match level(value) {
        Level::High => {
            "Name specific feelings rather than categories of feeling. \
             Let the emotional stakes surface in concrete moments. \
             Do not sanitize discomfort out of the writing."
        }
        Level::Medium => {
            "Acknowledge the emotional side of the topic where it appears naturally."
        }
        Level::Low => "Keep the register factual and measured.",
    }
}

const PERSONAL_TOUCH_BLOCK: &str =
    "Write in first person, with details that read as lived experience rather than research.";

const STORYTELLING_BLOCK: &str =
    "Anchor the piece in a brief narrative arc: a moment, a turn, an outcome.";

const CONVERSATIONAL_BLOCK: &str =
    "Write the way people talk: contractions, short asides, the occasional rhetorical question.";

/// Builds the full human-likeness block appended to prompts when the
/// caller enables `human_like`. Deterministic for identical options.
pub fn human_likeness_block(opts: &HumanLikeOptions) -> String {
    let mut block = String::from("HUMAN-LIKENESS RULES (write like a person, not a press release):\n");

    block.push_str("- ");
    block.push_str(ambiguity_rule(opts.ambiguity));
    block.push('\n');

    block.push_str("- ");
    block.push_str(randomness_rule(opts.randomness));
    block.push('\n');

    block.push_str("- ");
    block.push_str(emotional_depth_rule(opts.emotional_depth));
    block.push('\n');

    if opts.personal_touch {
        block.push_str("- ");
        block.push_str(PERSONAL_TOUCH_BLOCK);
        block.push('\n');
    }
    if opts.storytelling {
        block.push_str("- ");
        block.push_str(STORYTELLING_BLOCK);
        block.push('\n');
    }
    if opts.conversational_style {
        block.push_str("- ");
        block.push_str(CONVERSATIONAL_BLOCK);
        block.push('\n');
    }

    block
}
