//! Content Parser: recovers structured content from raw provider output.
//!
//! The parser never fails. Every input yields *some* structured content,
//! synthesized filler included; `degraded` marks results recovered through a
//! late-cascade fallback so downstream quality gates can treat them as lower
//! confidence than a clean structural match.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ContentType, ParsedContent};

pub mod slides;
pub mod strategies;
pub mod topics;

/// Stories shorter than this are soft failures. The parser does not enforce
/// it (it never synthesizes narrative content); callers gate on it.
pub const MIN_STORY_LENGTH: usize = 200;

/// Result of a parse: recovered content plus a confidence signal.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub content: ParsedContent,
    pub degraded: bool,
}

/// Parses raw provider output according to the declared content type and
/// the number of blocks the request asked for.
pub fn parse(raw: &str, content_type: ContentType, expected: usize) -> ParseOutcome {
    match content_type {
        ContentType::Story => ParseOutcome {
            // No splitting: the entire cleaned text is the single result.
            content: ParsedContent::Single(clean_block(raw)),
            degraded: false,
        },
        ContentType::Topics => topics::parse_topics(raw, expected),
        ContentType::Carousel => slides::parse_slide_deck(raw, expected),
        _ => {
            let (blocks, degraded) = strategies::split_variants(raw, expected);
            let cleaned = blocks
                .iter()
                .map(|block| bulletize(&clean_block(block)))
                .collect();
            ParseOutcome {
                content: ParsedContent::Variants(cleaned),
                degraded,
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Block post-processing
// ────────────────────────────────────────────────────────────────────────────

static LABEL_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:post|article|story|variant|option|draft)\s*\d*\s*[:.\-]\s*")
        .expect("label-prefix regex")
});

static NUMERIC_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s+").expect("numeric-bullet regex"));

/// Strips known label prefixes, numeric bullets, and leaked separator
/// fragments from a recovered block.
pub(crate) fn clean_block(block: &str) -> String {
    let mut lines: Vec<&str> = block.lines().collect();
    while lines.first().is_some_and(|l| is_separator_artifact(l)) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| is_separator_artifact(l)) {
        lines.pop();
    }

    let mut text = lines.join("\n").trim().to_string();
    loop {
        let stripped = NUMERIC_BULLET_RE.replace(&text, "");
        let stripped = LABEL_PREFIX_RE.replace(&stripped, "");
        let stripped = stripped.trim_start();
        if stripped == text {
            break;
        }
        text = stripped.to_string();
    }
    text.trim().to_string()
}

/// A line left behind by a split separator: rule lines of `=`/`-`/`*`/`#`
/// or a stray `===VARIANT===` fragment.
fn is_separator_artifact(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    let core = trimmed.trim_matches(|c| matches!(c, '=' | '-' | '*' | '#' | '_' | ' '));
    if core.is_empty() {
        return trimmed.chars().count() >= 3;
    }
    core.eq_ignore_ascii_case("variant")
}

/// Presentation normalization: a block with no bullet markers and at least
/// three substantial sentences gets its first three sentences promoted to
/// bullet lines, remainder kept as trailing prose. The text itself is not
/// rewritten.
pub(crate) fn bulletize(block: &str) -> String {
    let has_bullets = block.lines().any(|line| {
        let t = line.trim_start();
        t.starts_with("- ") || t.starts_with("* ") || t.starts_with("• ")
    });
    if has_bullets {
        return block.to_string();
    }

    let sentences = split_sentences(block);
    let substantial = sentences.iter().filter(|s| s.chars().count() > 10).count();
    if sentences.len() < 3 || substantial < 3 {
        return block.to_string();
    }

    let mut out = String::new();
    for sentence in &sentences[..3] {
        out.push_str("- ");
        out.push_str(sentence);
        out.push('\n');
    }
    let remainder = sentences[3..].join(" ");
    if !remainder.is_empty() {
        out.push('\n');
        out.push_str(&remainder);
    }
    out.trim_end().to_string()
}

/// Splits prose into sentences at `.`/`!`/`?` followed by whitespace.
/// Decimal points and mid-token periods do not split.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            while matches!(chars.peek(), Some('"' | '\'' | ')' | '\u{201d}' | '\u{2019}')) {
                if let Some(closing) = chars.next() {
                    current.push(closing);
                }
            }
            if chars.peek().map_or(true, |c| c.is_whitespace()) {
                let sentence = current.trim().to_string();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                current.clear();
            }
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_block_strips_label_prefixes() {
        assert_eq!(clean_block("Post 1: Remote work is hard."), "Remote work is hard.");
        assert_eq!(clean_block("ARTICLE: The big shift"), "The big shift");
        assert_eq!(clean_block("Story - Once upon a time"), "Once upon a time");
        assert_eq!(clean_block("2. Second idea"), "Second idea");
    }

    #[test]
    fn test_clean_block_strips_stacked_prefixes() {
        assert_eq!(clean_block("1. Post 1: Actual content"), "Actual content");
    }

    #[test]
    fn test_clean_block_strips_separator_artifacts() {
        let block = "===\nReal content here.\n---";
        assert_eq!(clean_block(block), "Real content here.");
    }

    #[test]
    fn test_clean_block_strips_leaked_variant_fragment() {
        let block = "===VARIANT===\nThe actual post body.";
        assert_eq!(clean_block(block), "The actual post body.");
    }

    #[test]
    fn test_clean_block_keeps_ordinary_text() {
        assert_eq!(clean_block("Nothing to strip here."), "Nothing to strip here.");
    }

    #[test]
    fn test_split_sentences_basic() {
        let s = split_sentences("First point. Second point! Third?");
        assert_eq!(s, vec!["First point.", "Second point!", "Third?"]);
    }

    #[test]
    fn test_split_sentences_ignores_decimals() {
        let s = split_sentences("Growth hit 3.5 percent. Not bad.");
        assert_eq!(s, vec!["Growth hit 3.5 percent.", "Not bad."]);
    }

    #[test]
    fn test_split_sentences_keeps_closing_quote() {
        let s = split_sentences("He said \"stop.\" Then left.");
        assert_eq!(s, vec!["He said \"stop.\"", "Then left."]);
    }

    #[test]
    fn test_bulletize_promotes_first_three_sentences() {
        let block = "Remote work changed everything. Offices emptied out. Teams went async. The rest of the story is still being written.";
        let out = bulletize(block);
        assert!(out.starts_with("- Remote work changed everything.\n"));
        assert!(out.contains("- Offices emptied out.\n"));
        assert!(out.contains("- Teams went async.\n"));
        assert!(out.ends_with("The rest of the story is still being written."));
    }

    #[test]
    fn test_bulletize_leaves_short_blocks_alone() {
        let block = "One sentence only.";
        assert_eq!(bulletize(block), block);
    }

    #[test]
    fn test_bulletize_leaves_existing_bullets_alone() {
        let block = "Intro line\n- already\n- bulleted\n- content";
        assert_eq!(bulletize(block), block);
    }

    #[test]
    fn test_parse_story_returns_single_cleaned_text() {
        let raw = "Story: It began on a Tuesday. Nothing was ever the same.";
        let outcome = parse(raw, ContentType::Story, 1);
        assert!(!outcome.degraded);
        match outcome.content {
            ParsedContent::Single(text) => {
                assert!(text.starts_with("It began on a Tuesday."));
            }
            other => panic!("expected Single, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_posts_dispatches_to_variant_cascade() {
        let raw = "First post body here.\n===VARIANT===\nSecond post body here.";
        let outcome = parse(raw, ContentType::LinkedinPost, 2);
        assert!(!outcome.degraded);
        let variants = outcome.content.as_variants().unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0], "First post body here.");
        assert_eq!(variants[1], "Second post body here.");
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("[1]"), "[1]");
    }
}
