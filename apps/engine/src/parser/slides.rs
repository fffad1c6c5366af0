//! Slide-deck recovery.
//!
//! Cascade: strict JSON from the first balanced object span, then regex key
//! extraction, then a line-length heuristic over free text. Whatever the
//! path, the caller receives exactly the requested slide count with the
//! positional contract intact: intro first, outro last, body slides with at
//! least three bullets in between. Filler slides are only ever inserted at
//! the interior midpoint.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::models::{ParsedContent, Slide};
use crate::parser::ParseOutcome;

const MIN_BODY_BULLETS: usize = 3;

/// Free-text lines up to this long read as headings rather than bullets.
const HEADING_MAX_CHARS: usize = 48;

const FILLER_HEADING: &str = "Key takeaway";
const FILLER_BULLETS: [&str; 3] = [
    "Expand on the main idea",
    "Add a supporting example",
    "Close with a practical tip",
];

#[derive(Debug, Deserialize)]
struct SlideDeckJson {
    slides: Vec<Slide>,
}

pub(crate) fn parse_slide_deck(raw: &str, expected: usize) -> ParseOutcome {
    // Strategy 1: strict JSON, full positional validation.
    if let Some(span) = first_balanced_object(raw) {
        if let Ok(deck) = serde_json::from_str::<SlideDeckJson>(span) {
            match validate_deck(&deck.slides, expected) {
                Ok(()) => {
                    return ParseOutcome {
                        content: ParsedContent::SlideDeck(deck.slides),
                        degraded: false,
                    };
                }
                Err(reason) => {
                    // Parsed slides are still the best signal; repair
                    // rather than re-extract.
                    debug!("slide deck JSON failed validation ({reason}); repairing");
                    let slides = ensure_deck_shape(deck.slides, expected);
                    return ParseOutcome {
                        content: ParsedContent::SlideDeck(slides),
                        degraded: true,
                    };
                }
            }
        }
    }

    // Strategy 2: per-field regex extraction.
    if let Some(slides) = extract_slides_by_key(raw) {
        debug!("slide deck recovered via key extraction");
        let slides = ensure_deck_shape(slides, expected);
        return ParseOutcome {
            content: ParsedContent::SlideDeck(slides),
            degraded: true,
        };
    }

    // Strategy 3: free-text heuristic.
    debug!("slide deck recovered via free-text heuristic");
    let slides = ensure_deck_shape(slides_from_free_text(raw), expected);
    ParseOutcome {
        content: ParsedContent::SlideDeck(slides),
        degraded: true,
    }
}

/// The first balanced `{...}` span, string-literal aware.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Positional contract check for a strict-parsed deck.
fn validate_deck(slides: &[Slide], expected: usize) -> Result<(), String> {
    if slides.len() != expected {
        return Err(format!("expected {expected} slides, got {}", slides.len()));
    }
    if slides.len() < 2 {
        return Err("deck needs at least an intro and an outro".to_string());
    }
    if !slides.first().is_some_and(Slide::is_intro) {
        return Err("first slide is not an intro".to_string());
    }
    if !slides.last().is_some_and(Slide::is_outro) {
        return Err("last slide is not an outro".to_string());
    }
    for (index, slide) in slides[1..slides.len() - 1].iter().enumerate() {
        match slide {
            Slide::Body { bullets, .. } if bullets.len() >= MIN_BODY_BULLETS => {}
            Slide::Body { bullets, .. } => {
                return Err(format!(
                    "interior slide {} has {} bullets (minimum {MIN_BODY_BULLETS})",
                    index + 1,
                    bullets.len()
                ));
            }
            _ => {
                return Err(format!("interior slide {} is not a body slide", index + 1));
            }
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback extraction
// ────────────────────────────────────────────────────────────────────────────

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("title"));
static HOOK_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("hook"));
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("heading"));
static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("summary"));
static CTA_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("call_to_action"));

static BULLETS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""bullets"\s*:\s*\[([^\]]*)\]"#).expect("bullets regex")
});

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("quoted-string regex"));

fn field_regex(name: &str) -> Regex {
    Regex::new(&format!(r#""{name}"\s*:\s*"((?:[^"\\]|\\.)*)""#)).expect("field regex")
}

fn unescape(value: &str) -> String {
    value
        .replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}

/// Pulls slide fields out of malformed JSON-ish text by key name.
fn extract_slides_by_key(text: &str) -> Option<Vec<Slide>> {
    let first_capture = |re: &Regex| {
        re.captures(text)
            .map(|captures| unescape(&captures[1]))
    };

    let title = first_capture(&TITLE_RE);
    let hook = first_capture(&HOOK_RE);
    let summary = first_capture(&SUMMARY_RE);
    let call_to_action = first_capture(&CTA_RE);

    let headings: Vec<String> = HEADING_RE
        .captures_iter(text)
        .map(|captures| unescape(&captures[1]))
        .collect();
    let bullet_groups: Vec<Vec<String>> = BULLETS_RE
        .captures_iter(text)
        .map(|captures| {
            QUOTED_RE
                .captures_iter(&captures[1])
                .map(|quoted| unescape(&quoted[1]))
                .collect()
        })
        .collect();

    if title.is_none() && headings.is_empty() && summary.is_none() {
        return None;
    }

    let mut slides = vec![Slide::Intro {
        title: title.unwrap_or_else(|| "Untitled carousel".to_string()),
        hook: hook.unwrap_or_else(|| "Swipe through for the details".to_string()),
    }];
    for (index, heading) in headings.into_iter().enumerate() {
        slides.push(Slide::Body {
            heading,
            bullets: bullet_groups.get(index).cloned().unwrap_or_default(),
        });
    }
    slides.push(Slide::Outro {
        summary: summary.unwrap_or_else(|| "The short version of the story above".to_string()),
        call_to_action: call_to_action.unwrap_or_else(|| "Follow for more".to_string()),
    });
    Some(slides)
}

/// Last resort: approximate deck structure from plain text by line length:
/// short lines become headings, longer lines become bullets.
fn slides_from_free_text(text: &str) -> Vec<Slide> {
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['#', '-', '*', '•'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect();

    let Some(title) = lines.first() else {
        return Vec::new();
    };
    let hook = lines
        .get(1)
        .cloned()
        .unwrap_or_else(|| "Swipe through for the details".to_string());
    let mut slides = vec![Slide::Intro {
        title: title.clone(),
        hook,
    }];

    let mut current: Option<(String, Vec<String>)> = None;
    for line in lines.iter().skip(2) {
        let is_heading =
            line.chars().count() <= HEADING_MAX_CHARS && !line.ends_with(['.', '!', '?']);
        if is_heading {
            if let Some((heading, bullets)) = current.take() {
                slides.push(Slide::Body { heading, bullets });
            }
            current = Some((line.clone(), Vec::new()));
        } else if let Some((_, bullets)) = current.as_mut() {
            bullets.push(line.clone());
        } else {
            current = Some(("Overview".to_string(), vec![line.clone()]));
        }
    }
    if let Some((heading, bullets)) = current.take() {
        slides.push(Slide::Body { heading, bullets });
    }

    slides
}

// ────────────────────────────────────────────────────────────────────────────
// Shape repair
// ────────────────────────────────────────────────────────────────────────────

/// Forces the positional contract and the exact slide count. Filler body
/// slides go in at the interior midpoint so the intro and outro keep their
/// positions; overflow drops interior slides from just before the outro.
fn ensure_deck_shape(mut slides: Vec<Slide>, expected: usize) -> Vec<Slide> {
    let expected = expected.max(3);

    if !slides.first().is_some_and(Slide::is_intro) {
        let title = match slides.first() {
            Some(Slide::Body { heading, .. }) => heading.clone(),
            Some(Slide::Outro { summary, .. }) => summary.clone(),
            _ => "Untitled carousel".to_string(),
        };
        slides.insert(
            0,
            Slide::Intro {
                title,
                hook: "Swipe through for the details".to_string(),
            },
        );
    }
    if !slides.last().is_some_and(Slide::is_outro) {
        let summary = match slides.last() {
            Some(Slide::Body { heading, .. }) => heading.clone(),
            _ => "The short version of the story above".to_string(),
        };
        slides.push(Slide::Outro {
            summary,
            call_to_action: "Follow for more".to_string(),
        });
    }

    let last_index = slides.len() - 1;
    let mut slides: Vec<Slide> = slides
        .into_iter()
        .enumerate()
        .map(|(index, slide)| {
            if index == 0 || index == last_index {
                slide
            } else {
                coerce_body(slide)
            }
        })
        .collect();

    while slides.len() < expected {
        let mid = (slides.len() / 2).clamp(1, slides.len() - 1);
        slides.insert(
            mid,
            Slide::Body {
                heading: FILLER_HEADING.to_string(),
                bullets: FILLER_BULLETS.iter().map(|b| b.to_string()).collect(),
            },
        );
    }
    while slides.len() > expected {
        slides.remove(slides.len() - 2);
    }

    slides
}

/// Interior slides must be body slides with enough bullets.
fn coerce_body(slide: Slide) -> Slide {
    let (heading, mut bullets) = match slide {
        Slide::Body { heading, bullets } => (heading, bullets),
        Slide::Intro { title, hook } => (title, vec![hook]),
        Slide::Outro {
            summary,
            call_to_action,
        } => (summary, vec![call_to_action]),
    };
    bullets.retain(|bullet| !bullet.trim().is_empty());
    while bullets.len() < MIN_BODY_BULLETS {
        bullets.push(FILLER_BULLETS[bullets.len() % FILLER_BULLETS.len()].to_string());
    }
    Slide::Body { heading, bullets }
}
