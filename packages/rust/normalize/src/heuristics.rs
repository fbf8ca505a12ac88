//! Exclusion heuristics for non-narrative content.
//!
//! Applied in a fixed order, first match wins: mostly-markup (on the raw
//! text), copyright boilerplate (on the cleaned text), structural sparsity
//! (on the cleaned text). Plain predicate functions over immutable input.

use std::sync::LazyLock;

use regex::Regex;

/// Documents whose markup ratio exceeds this are discarded unread further.
pub const MARKUP_RATIO_LIMIT: f64 = 0.9;

/// Minimum non-empty lines for a document to count as narrative.
pub const MIN_LINES: usize = 5;

/// Minimum average non-empty-line length, in characters.
pub const MIN_AVG_LINE_LEN: f64 = 40.0;

/// Boilerplate markers that flag a copyright/front-matter page.
/// Matched case-insensitively against the cleaned text.
const COPYRIGHT_KEYWORDS: [&str; 4] = [
    "copyright",
    "all rights reserved",
    "isbn",
    "library of congress",
];

/// Fraction of the raw document occupied by angle-bracket tags.
///
/// Sum of the lengths of every `<...>` match over the total length.
/// Inserting more tag text can only increase the result.
pub fn markup_ratio(raw: &str) -> f64 {
    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").expect("valid regex"));

    if raw.is_empty() {
        return 0.0;
    }

    let tag_len: usize = TAG_RE.find_iter(raw).map(|m| m.len()).sum();
    tag_len as f64 / raw.len() as f64
}

/// Whether the cleaned text contains any copyright boilerplate marker.
pub fn is_copyright_page(cleaned: &str) -> bool {
    let lower = cleaned.to_lowercase();
    COPYRIGHT_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Whether the cleaned text is structurally sparse: too few non-empty
/// lines, or lines too short on average. Flags indexes, footnotes, and
/// tables of contents.
pub fn is_sparse(cleaned: &str) -> bool {
    let lines: Vec<&str> = cleaned.lines().filter(|l| !l.trim().is_empty()).collect();

    if lines.len() < MIN_LINES {
        return true;
    }

    let total: usize = lines.iter().map(|l| l.chars().count()).sum();
    (total as f64 / lines.len() as f64) < MIN_AVG_LINE_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_of_pure_text_is_zero() {
        assert_eq!(markup_ratio("no tags here at all"), 0.0);
    }

    #[test]
    fn ratio_of_pure_markup_approaches_one() {
        assert!(markup_ratio("<div><span></span></div>") > MARKUP_RATIO_LIMIT);
    }

    #[test]
    fn ratio_is_monotonic_under_tag_insertion() {
        let base = "<p>some actual narrative text in the middle</p>";
        let more = "<p><span class=\"x\"></span>some actual narrative text in the middle</p>";
        assert!(markup_ratio(more) > markup_ratio(base));
    }

    #[test]
    fn ratio_of_empty_input_is_zero() {
        assert_eq!(markup_ratio(""), 0.0);
    }

    #[test]
    fn copyright_detection_is_case_insensitive() {
        assert!(is_copyright_page("COPYRIGHT © 2020 by Somebody"));
        assert!(is_copyright_page("Catalogued by the Library of Congress"));
        assert!(is_copyright_page("ISBN 978-0-00-000000-0"));
        assert!(!is_copyright_page("The rights of man were debated."));
    }

    #[test]
    fn four_lines_is_sparse_five_is_not() {
        let line = "x".repeat(50);
        let four = vec![line.clone(); 4].join("\n");
        let five = vec![line; 5].join("\n");
        assert!(is_sparse(&four));
        assert!(!is_sparse(&five));
    }

    #[test]
    fn short_average_lines_are_sparse() {
        // Ten lines, but well under 40 chars each: an index page shape.
        let toc = vec!["Chapter 1 ....... 9"; 10].join("\n");
        assert!(is_sparse(&toc));
    }

    #[test]
    fn average_length_boundary() {
        // Exactly 40 chars average is NOT sparse (strict less-than).
        let at_limit = vec!["y".repeat(40); 5].join("\n");
        assert!(!is_sparse(&at_limit));

        let under = vec!["y".repeat(39); 5].join("\n");
        assert!(is_sparse(&under));
    }
}
