//! Markup-stripping pipeline for content documents.
//!
//! Each pass is a function `&str -> String` applied in a fixed sequence.
//! Style blocks and comments are removed before the generic tag pass, or
//! their contents would leak into the output text.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full markup-stripping pipeline on a raw content document.
pub fn strip_markup(raw: &str) -> String {
    let mut result = raw.to_string();

    result = collapse_whitespace(&result);
    result = strip_doctype(&result);
    result = strip_style_blocks(&result);
    result = strip_comments(&result);
    result = break_block_tags(&result);
    result = break_inline_tags(&result);
    result = replace_entities(&result);
    result = strip_remaining_tags(&result);

    drop_empty_lines(&result)
}

// ---------------------------------------------------------------------------
// Pass 1: Collapse whitespace
// ---------------------------------------------------------------------------

/// Collapse every whitespace run (including source line breaks) to a single
/// space. Line structure is re-introduced by the closing-tag passes below.
fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text, " ").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: DOCTYPE declarations
// ---------------------------------------------------------------------------

fn strip_doctype(text: &str) -> String {
    static DOCTYPE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<!DOCTYPE[^>]*>").expect("valid regex"));

    DOCTYPE_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Style blocks and comments (content included)
// ---------------------------------------------------------------------------

/// Remove `<style>` blocks with their contents, non-greedy across line
/// breaks. Must run before [`strip_remaining_tags`].
fn strip_style_blocks(text: &str) -> String {
    static STYLE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<style[^>]*>.*?</style>").expect("valid regex"));

    STYLE_RE.replace_all(text, "").to_string()
}

/// Remove HTML comments with their contents, non-greedy across line breaks.
fn strip_comments(text: &str) -> String {
    static COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

    COMMENT_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Block-level tags → line breaks
// ---------------------------------------------------------------------------

/// Drop `div`/`p`/`h1` opening tags and turn their closing tags into line
/// breaks, restoring paragraph structure lost in the whitespace collapse.
fn break_block_tags(text: &str) -> String {
    static OPEN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<(?:div|p|h1)[^>]*>").expect("valid regex"));
    static CLOSE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"</(?:div|p|h1)>").expect("valid regex"));

    let text = OPEN_RE.replace_all(text, "");
    CLOSE_RE.replace_all(&text, "\n").to_string()
}

// ---------------------------------------------------------------------------
// Pass 5: Anchors, spans, link elements
// ---------------------------------------------------------------------------

fn break_inline_tags(text: &str) -> String {
    static A_OPEN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<a[^>]*>").expect("valid regex"));
    static A_CLOSE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"</a>").expect("valid regex"));
    static SPAN_OPEN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<span[^>]*>").expect("valid regex"));
    static SPAN_CLOSE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"</span>").expect("valid regex"));
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<link[^>]*/>").expect("valid regex"));

    let text = A_OPEN_RE.replace_all(text, "");
    let text = A_CLOSE_RE.replace_all(&text, "\n");
    let text = SPAN_OPEN_RE.replace_all(&text, "");
    let text = SPAN_CLOSE_RE.replace_all(&text, "\n");
    LINK_RE.replace_all(&text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 6: Entities
// ---------------------------------------------------------------------------

fn replace_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
}

// ---------------------------------------------------------------------------
// Pass 7: Everything else in angle brackets
// ---------------------------------------------------------------------------

/// Strip every remaining tag of any kind. Non-greedy, single-line: the
/// whitespace collapse already removed source line breaks, and the breaks
/// introduced by earlier passes only ever sit between tags.
fn strip_remaining_tags(text: &str) -> String {
    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").expect("valid regex"));

    TAG_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 8: Drop blank lines
// ---------------------------------------------------------------------------

fn drop_empty_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
