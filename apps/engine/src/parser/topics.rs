//! Topic-list recovery: strict JSON array first, line extraction second.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::ParsedContent;
use crate::parser::{strip_code_fences, ParseOutcome};

/// Titles longer than this read as stray prose, not topics.
const MAX_TOPIC_CHARS: usize = 80;

static BULLET_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s*").expect("bullet-prefix regex"));

pub(crate) fn parse_topics(raw: &str, expected: usize) -> ParseOutcome {
    let cleaned = strip_code_fences(raw);

    if let Ok(list) = serde_json::from_str::<Vec<String>>(cleaned.trim()) {
        let topics: Vec<String> = list
            .into_iter()
            .map(|topic| topic.trim().to_string())
            .filter(|topic| !topic.is_empty())
            .collect();
        if !topics.is_empty() {
            let (topics, padded) = normalize_count(topics, expected);
            return ParseOutcome {
                content: ParsedContent::Variants(topics),
                degraded: padded,
            };
        }
    }

    debug!("topic list was not a JSON array; falling back to line extraction");
    let mut topics = Vec::new();
    for line in raw.lines() {
        let topic = BULLET_PREFIX_RE.replace(line.trim(), "");
        let topic = topic.trim().trim_matches('"').trim();
        if topic.is_empty()
            || topic.chars().count() > MAX_TOPIC_CHARS
            || topic.ends_with(':')
        {
            continue;
        }
        topics.push(topic.to_string());
    }

    let (topics, _) = normalize_count(topics, expected);
    ParseOutcome {
        content: ParsedContent::Variants(topics),
        degraded: true,
    }
}

/// Truncates overflow and synthesizes filler on shortfall. Returns whether
/// any filler was needed.
fn normalize_count(mut topics: Vec<String>, expected: usize) -> (Vec<String>, bool) {
    let mut padded = false;
    if topics.len() > expected {
        topics.truncate(expected);
    }
    while topics.len() < expected {
        padded = true;
        let filler = match topics.last() {
            Some(last) => format!("{last} (a fresh angle)"),
            None => "Ideas worth exploring in your niche".to_string(),
        };
        topics.push(filler);
    }
    (topics, padded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants(outcome: &ParseOutcome) -> &[String] {
        outcome.content.as_variants().expect("topics are variants")
    }

    #[test]
    fn test_strict_json_array_passes_through_unmodified() {
        let raw = r#"["Remote work boundaries", "Async-first communication"]"#;
        let outcome = parse_topics(raw, 2);
        assert!(!outcome.degraded);
        assert_eq!(
            variants(&outcome),
            ["Remote work boundaries", "Async-first communication"]
        );
    }

    #[test]
    fn test_fenced_json_array_accepted() {
        let raw = "```json\n[\"Topic one\", \"Topic two\"]\n```";
        let outcome = parse_topics(raw, 2);
        assert!(!outcome.degraded);
        assert_eq!(variants(&outcome).len(), 2);
    }

    #[test]
    fn test_numbered_lines_fallback() {
        let raw = "Here are some ideas:\n1. Why async beats meetings\n2. The four-day week experiment";
        let outcome = parse_topics(raw, 2);
        assert!(outcome.degraded);
        assert_eq!(
            variants(&outcome),
            ["Why async beats meetings", "The four-day week experiment"]
        );
    }

    #[test]
    fn test_line_fallback_rejects_prose_and_labels() {
        let raw = "Here are some ideas:\n\
                   - Burnout warning signs\n\
                   This line is a long rambling paragraph of explanation that no one would ever mistake for a content topic title.\n\
                   - Calendar minimalism";
        let outcome = parse_topics(raw, 2);
        assert_eq!(
            variants(&outcome),
            ["Burnout warning signs", "Calendar minimalism"]
        );
    }

    #[test]
    fn test_overflow_truncates_in_order() {
        let raw = r#"["One", "Two", "Three", "Four"]"#;
        let outcome = parse_topics(raw, 2);
        assert_eq!(variants(&outcome), ["One", "Two"]);
    }

    #[test]
    fn test_shortfall_synthesizes_filler_and_degrades() {
        let raw = r#"["Only one"]"#;
        let outcome = parse_topics(raw, 3);
        assert!(outcome.degraded);
        let topics = variants(&outcome);
        assert_eq!(topics.len(), 3);
        assert_eq!(topics[0], "Only one");
        assert!(topics[1].contains("Only one"));
    }

    #[test]
    fn test_garbage_input_still_yields_expected_count() {
        let outcome = parse_topics("", 2);
        assert!(outcome.degraded);
        assert_eq!(variants(&outcome).len(), 2);
    }
}
