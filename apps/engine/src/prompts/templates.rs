// All prompt constants for the generation engine.
// Structural rules here are load-bearing: the parser keys on the separator
// token and on the carousel JSON shape these templates demand.

/// Exact separator the multi-variant templates instruct the model to emit.
/// The parser's first split strategy looks for this token; keep them in sync.
pub const VARIANT_SEPARATOR: &str = "===VARIANT===";

// ────────────────────────────────────────────────────────────────────────────
// Personalization fragments
// ────────────────────────────────────────────────────────────────────────────

/// Prepended when a complete personalization context exists.
/// Replace `{context}` before sending.
pub const PERSONALIZATION_HEADER: &str = "\
PERSONAL BACKGROUND of the author:
{context}

Weave this background in naturally where it genuinely strengthens the content. \
Do NOT force connections that are not relevant to the topic.";

/// Prepended when no complete personalization context exists.
pub const PERSONALIZATION_FALLBACK: &str = "\
No personal background is available for this author. \
Rely only on the topic and the preferences below.";

// ────────────────────────────────────────────────────────────────────────────
// Optional instruction lines (customization toggles)
// ────────────────────────────────────────────────────────────────────────────

pub const HASHTAG_INSTRUCTION: &str =
    "Include 3-5 relevant hashtags at the end of each piece.";

pub const EMOJI_INSTRUCTION: &str =
    "Use emojis sparingly, only where they add genuine emphasis.";

pub const CTA_INSTRUCTION: &str =
    "End each piece with a clear call-to-action inviting the reader to respond.";

// ────────────────────────────────────────────────────────────────────────────
// Type-specific templates
// ────────────────────────────────────────────────────────────────────────────

/// LinkedIn post template.
/// Replace: {variant_count}, {topic}, {tone}, {language}, {word_count},
///          {audience}, {goal}, {context_lines}, {separator}
pub const LINKEDIN_POST_TEMPLATE: &str = r#"Write {variant_count} distinct LinkedIn posts about the topic below.

TOPIC: {topic}

Tone: {tone}. Language: {language}. Target length: about {word_count} words per post.
Audience: {audience}. Primary goal: {goal}.
{context_lines}
Each post must stand alone and take a different angle on the topic.
Open with a strong first line; the feed truncates after two lines.

Separate the posts with a line containing exactly:
{separator}

Do not number the posts. Do not add any text before the first post or after the last."#;

/// Long-form article template. Same placeholder set as the post template.
pub const ARTICLE_TEMPLATE: &str = r#"Write {variant_count} distinct article drafts about the topic below.

TOPIC: {topic}

Tone: {tone}. Language: {language}. Target length: about {word_count} words per draft.
Audience: {audience}. Primary goal: {goal}.
{context_lines}
Each draft needs a headline on its first line, an introduction, 2-4 developed
sections, and a closing thought. Drafts must differ in structure and angle, not
just wording.

Separate the drafts with a line containing exactly:
{separator}

Do not number the drafts. Do not add any text before the first draft or after the last."#;

/// Topic-list template: demands a bare JSON array of strings.
/// Replace: {variant_count}, {topic}, {tone}, {language}, {audience}, {goal},
///          {context_lines}
pub const TOPICS_TEMPLATE: &str = r#"Suggest {variant_count} content topic ideas derived from the theme below.

THEME: {topic}

Tone: {tone}. Language: {language}.
Audience: {audience}. Primary goal: {goal}.
{context_lines}
Each idea is a short, specific title a creator could write a post about;
not a sentence, not a paragraph.

Return ONLY a JSON array of {variant_count} strings.
Do NOT use markdown code fences. Do NOT include any text outside the array."#;

/// Carousel (slide deck) template: demands a strict JSON object.
/// Replace: {slide_count}, {topic}, {tone}, {language}, {audience}, {goal},
///          {context_lines}
pub const CAROUSEL_TEMPLATE: &str = r#"Design a {slide_count}-slide carousel about the topic below.

TOPIC: {topic}

Tone: {tone}. Language: {language}.
Audience: {audience}. Primary goal: {goal}.
{context_lines}
Return ONLY a JSON object with this EXACT shape (no extra fields, no markdown fences):
{
  "slides": [
    {"title": "Carousel title", "hook": "One-line reason to keep swiping"},
    {"heading": "Section heading", "bullets": ["Point one", "Point two", "Point three"]},
    {"summary": "One-line recap", "call_to_action": "What the reader should do next"}
  ]
}

The FIRST slide is the title slide ("title" + "hook").
The LAST slide is the closing slide ("summary" + "call_to_action").
EVERY slide in between has "heading" and at least 3 "bullets".
The "slides" array must contain exactly {slide_count} entries."#;

/// Narrative story template: exactly one cohesive output, never variants.
/// Replace: {topic}, {tone}, {language}, {word_count}, {audience}, {goal},
///          {context_lines}
pub const STORY_TEMPLATE: &str = r#"Write exactly ONE cohesive narrative story about the topic below.

TOPIC: {topic}

Tone: {tone}. Language: {language}. Target length: about {word_count} words.
Audience: {audience}. Primary goal: {goal}.
{context_lines}
This is a single continuous narrative with a beginning, a turning point, and a
resolution. Do NOT produce variants, alternatives, lists, or separators:
one story, told once."#;

/// Shared scaffold for the simple formats. Each format contributes its own
/// structural-rules block via {format_rules} and a human label via
/// {format_label}.
/// Replace: {variant_count}, {format_label}, {topic}, {tone}, {language},
///          {word_count}, {audience}, {goal}, {context_lines}, {format_rules},
///          {separator}
pub const GENERIC_TEMPLATE: &str = r#"Write {variant_count} distinct {format_label} pieces about the topic below.

TOPIC: {topic}

Tone: {tone}. Language: {language}. Target length: about {word_count} words each.
Audience: {audience}. Primary goal: {goal}.
{context_lines}
STRUCTURAL RULES:
{format_rules}

Separate the pieces with a line containing exactly:
{separator}

Do not number the pieces. Do not add any text before the first piece or after the last."#;

pub const LIST_RULES: &str = "\
Each piece is a bulleted list: a one-line setup, then 4-7 bullets, each a
complete standalone point. No nested bullets.";

pub const QUOTE_RULES: &str = "\
Each piece is one short quotable statement (under 30 words) followed by a
single supporting sentence. No attribution unless the topic names a person.";

pub const BEFORE_AFTER_RULES: &str = "\
Each piece contrasts a 'before' state and an 'after' state: two short labeled
sections (Before: / After:) and one closing line naming what changed.";

pub const TIPS_RULES: &str = "\
Each piece is a set of 3-5 practical tips. Every tip starts with an
imperative verb and fits in two sentences.";

pub const INSIGHTS_RULES: &str = "\
Each piece presents one non-obvious insight: state it plainly in the first
sentence, then support it with evidence or a concrete example.";

pub const QUESTION_RULES: &str = "\
Each piece is built around one discussion-provoking question: brief context,
the question itself on its own line, and why it matters.";
