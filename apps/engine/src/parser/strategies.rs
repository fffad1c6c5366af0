//! Variant split strategies.
//!
//! An ordered cascade of `SplitStrategy` objects; the first one that yields
//! blocks wins. New fallbacks slot in without touching the others. After the
//! cascade, degenerate results are normalized so the caller always receives
//! exactly the expected number of blocks.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::parser::split_sentences;
use crate::prompts::templates::VARIANT_SEPARATOR;

/// Looser separators the model emits when it ignores the exact token:
/// markdown rule lines, then a triple newline.
const FALLBACK_SEPARATORS: &[&str] = &["\n---\n", "\n***\n", "\n\n\n"];

/// Paragraphs shorter than this are stray lines, not content.
const MIN_PARAGRAPH_CHARS: usize = 40;

/// Blocks shorter than this cannot be split into two meaningful halves.
const MIN_SPLITTABLE_CHARS: usize = 120;

/// Appended when a variant has to be synthesized by duplication.
pub(crate) const ENGAGEMENT_QUESTION: &str =
    "What has your experience been? Share it in the comments.";

pub(crate) trait SplitStrategy {
    fn name(&self) -> &'static str;

    /// Returns the recovered blocks, or `None` to pass to the next strategy.
    fn try_split(&self, text: &str, expected: usize) -> Option<Vec<String>>;
}

/// Strategy 1: split on the first known separator token found in the text.
struct SeparatorSplit;

impl SplitStrategy for SeparatorSplit {
    fn name(&self) -> &'static str {
        "separator"
    }

    fn try_split(&self, text: &str, _expected: usize) -> Option<Vec<String>> {
        let separator = std::iter::once(VARIANT_SEPARATOR)
            .chain(FALLBACK_SEPARATORS.iter().copied())
            .find(|sep| text.contains(sep))?;
        let blocks: Vec<String> = text
            .split(separator)
            .map(|block| block.trim().to_string())
            .filter(|block| !block.is_empty())
            .collect();
        (blocks.len() >= 2).then_some(blocks)
    }
}

/// Strategy 2: split at lines beginning with `<int>.`.
struct NumberedListSplit;

static NUMBERED_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s+").expect("numbered-line regex"));

impl SplitStrategy for NumberedListSplit {
    fn name(&self) -> &'static str {
        "numbered-list"
    }

    fn try_split(&self, text: &str, _expected: usize) -> Option<Vec<String>> {
        let starts: Vec<usize> = NUMBERED_LINE_RE.find_iter(text).map(|m| m.start()).collect();
        if starts.len() < 2 {
            return None;
        }
        let mut blocks = Vec::new();
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            let block = text[start..end].trim();
            if !block.is_empty() {
                blocks.push(block.to_string());
            }
        }
        (blocks.len() >= 2).then_some(blocks)
    }
}

/// Strategy 3: blank-line paragraphs long enough to be real content.
struct ParagraphSplit;

static BLANK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("blank-line regex"));

impl SplitStrategy for ParagraphSplit {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn try_split(&self, text: &str, expected: usize) -> Option<Vec<String>> {
        let paragraphs: Vec<String> = BLANK_LINE_RE
            .split(text)
            .map(str::trim)
            .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
            .map(str::to_string)
            .take(expected)
            .collect();
        (!paragraphs.is_empty()).then_some(paragraphs)
    }
}

/// Runs the cascade and normalizes the result to exactly `expected` blocks.
/// The boolean is the degraded flag: true when the cascade fell past the
/// separator strategy or any block had to be synthesized.
pub(crate) fn split_variants(text: &str, expected: usize) -> (Vec<String>, bool) {
    let trimmed = text.trim();
    if expected <= 1 {
        return (vec![trimmed.to_string()], false);
    }

    let cascade: [&dyn SplitStrategy; 3] = [&SeparatorSplit, &NumberedListSplit, &ParagraphSplit];

    let mut blocks: Option<Vec<String>> = None;
    let mut degraded = true;
    for (index, strategy) in cascade.iter().enumerate() {
        if let Some(found) = strategy.try_split(trimmed, expected) {
            debug!(
                "Variant split via {} strategy ({} blocks)",
                strategy.name(),
                found.len()
            );
            degraded = index > 0;
            blocks = Some(found);
            break;
        }
    }
    let mut blocks = blocks.unwrap_or_else(|| vec![trimmed.to_string()]);

    // Degenerate single block: split at the sentence boundary nearest the
    // midpoint, or duplicate with an engagement question when too short.
    if blocks.len() == 1 && expected >= 2 {
        degraded = true;
        let block = blocks.remove(0);
        blocks = match split_at_sentence_midpoint(&block) {
            Some((first, second)) => vec![first, second],
            None => vec![block.clone(), format!("{block}\n\n{ENGAGEMENT_QUESTION}")],
        };
    }

    // Shortfall: synthesize from the last block.
    while blocks.len() < expected {
        degraded = true;
        let base = blocks.last().cloned().unwrap_or_default();
        blocks.push(format!("{base}\n\n{ENGAGEMENT_QUESTION}"));
    }

    // Overflow: keep the first `expected`, order preserved.
    if blocks.len() > expected {
        blocks.truncate(expected);
    }

    (blocks, degraded)
}

/// Splits a block in two at the sentence boundary nearest its character
/// midpoint. Returns `None` when the block is too short or has no interior
/// sentence boundary.
fn split_at_sentence_midpoint(block: &str) -> Option<(String, String)> {
    if block.chars().count() < MIN_SPLITTABLE_CHARS {
        return None;
    }
    let sentences = split_sentences(block);
    if sentences.len() < 2 {
        return None;
    }

    let total: usize = sentences.iter().map(|s| s.chars().count()).sum();
    let midpoint = total / 2;

    let mut best_boundary = 1;
    let mut best_distance = usize::MAX;
    let mut cumulative = 0;
    for (i, sentence) in sentences.iter().take(sentences.len() - 1).enumerate() {
        cumulative += sentence.chars().count();
        let distance = cumulative.abs_diff(midpoint);
        if distance < best_distance {
            best_distance = distance;
            best_boundary = i + 1;
        }
    }

    Some((
        sentences[..best_boundary].join(" "),
        sentences[best_boundary..].join(" "),
    ))
}
