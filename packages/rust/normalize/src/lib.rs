//! Content Normalizer: raw extracted markup → clean plain-text chapters.
//!
//! Walks the order file, classifies each document through the heuristic
//! chain, writes survivors as `.txt` (deleting the original), removes the
//! rest, and rewrites the order file once at the end of the pass.
//!
//! This component is destructive: originals are deleted as they are
//! classified, and there is no rollback on partial failure.

mod cleanup;
mod heuristics;

use std::path::Path;

use tracing::{info, warn};

use lectern_shared::{DocumentStore, Result, read_order, write_order};

pub use cleanup::strip_markup;
pub use heuristics::{
    MARKUP_RATIO_LIMIT, MIN_AVG_LINE_LEN, MIN_LINES, is_copyright_page, is_sparse, markup_ratio,
};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Why a document was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Markup ratio above the limit; document discarded before cleaning.
    MostlyMarkup,
    /// Copyright/front-matter boilerplate detected in the cleaned text.
    CopyrightPage,
    /// Too few lines or lines too short: index, footnotes, or TOC.
    Sparse,
    /// Listed in the order file but absent from the working directory.
    NotFound,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MostlyMarkup => "mostly markup",
            Self::CopyrightPage => "copyright page",
            Self::Sparse => "index or footnote",
            Self::NotFound => "not found",
        };
        f.write_str(s)
    }
}

/// Outcome of classifying one raw document.
#[derive(Debug)]
pub enum Decision {
    /// Document survives; carries the cleaned text to persist.
    Keep(String),
    Skip(SkipReason),
}

/// Run the heuristic chain over one raw document. First match wins.
pub fn classify(raw: &str) -> Decision {
    if markup_ratio(raw) > MARKUP_RATIO_LIMIT {
        return Decision::Skip(SkipReason::MostlyMarkup);
    }

    let cleaned = strip_markup(raw);

    if is_copyright_page(&cleaned) {
        return Decision::Skip(SkipReason::CopyrightPage);
    }
    if is_sparse(&cleaned) {
        return Decision::Skip(SkipReason::Sparse);
    }

    Decision::Keep(cleaned)
}

// ---------------------------------------------------------------------------
// Store pass
// ---------------------------------------------------------------------------

/// Outcome of one working directory's normalization pass.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    /// Renamed (`.txt`) names of the kept documents, in original order.
    pub kept: Vec<String>,
    /// Names that were skipped, with the reason.
    pub skipped: Vec<(String, SkipReason)>,
}

/// Normalize every document listed in the store's order file, in order.
///
/// The new order is accumulated in memory and written once at the end, so
/// an interrupted pass never leaves a half-rewritten order file. Fails only
/// if the order file is missing (a config error) or the store itself fails;
/// per-document delete failures are logged and skipped over.
pub fn normalize_store(store: &dyn DocumentStore) -> Result<NormalizeReport> {
    let order = read_order(store)?;
    let mut report = NormalizeReport::default();

    for name in &order {
        if !store.exists(name) {
            info!(file = %name, "file not found, skipping");
            report.skipped.push((name.clone(), SkipReason::NotFound));
            continue;
        }

        let raw = store.read(name)?;

        match classify(&raw) {
            Decision::Keep(cleaned) => {
                let txt_name = format!("{}.txt", stem_of(name));
                store.write(&txt_name, cleaned.as_bytes())?;
                delete_logged(store, name);
                info!(file = %name, as_file = %txt_name, "kept");
                report.kept.push(txt_name);
            }
            Decision::Skip(reason) => {
                info!(file = %name, %reason, "skipping");
                delete_logged(store, name);
                report.skipped.push((name.clone(), reason));
            }
        }
    }

    write_order(store, &report.kept)?;
    Ok(report)
}

/// Delete a document, logging failures (e.g. permission denied) instead of
/// propagating them; classification has already happened at that point.
fn delete_logged(store: &dyn DocumentStore, name: &str) {
    if let Err(e) = store.delete(name) {
        warn!(file = %name, error = %e, "could not delete file");
    }
}

fn stem_of(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_shared::{MemStore, ORDER_FILE};

    /// A chapter that passes every heuristic: 5 lines averaging >= 40 chars.
    fn narrative_html() -> String {
        let para = "It was a long and uneventful morning in the old house. ";
        (0..5)
            .map(|_| format!("<p>{para}</p>"))
            .collect::<String>()
    }

    #[test]
    fn classify_keeps_narrative_content() {
        match classify(&narrative_html()) {
            Decision::Keep(cleaned) => {
                assert_eq!(cleaned.lines().count(), 5);
                assert!(!cleaned.contains('<'));
            }
            Decision::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn classify_round_trip_content() {
        // Kept content equals the newline-joined non-empty lines with all
        // markup removed.
        let line = "A sentence of sufficient length to pass the average check.";
        let html: String = (0..5).map(|_| format!("<p>{line}</p>")).collect();
        let expected = vec![line; 5].join("\n");

        match classify(&html) {
            Decision::Keep(cleaned) => assert_eq!(cleaned, expected),
            Decision::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn classify_rejects_mostly_markup() {
        let html = format!("<div><span class=\"{}\"></span></div>x", "a".repeat(100));
        match classify(&html) {
            Decision::Skip(SkipReason::MostlyMarkup) => {}
            other => panic!("expected mostly-markup skip, got {other:?}"),
        }
    }

    #[test]
    fn classify_rejects_copyright_page() {
        let filler = "Some long enough line of front matter text goes right here. ";
        let html = format!(
            "<p>Copyright 2019 by The Publisher</p>{}",
            (0..5).map(|_| format!("<p>{filler}</p>")).collect::<String>()
        );
        match classify(&html) {
            Decision::Skip(SkipReason::CopyrightPage) => {}
            other => panic!("expected copyright skip, got {other:?}"),
        }
    }

    #[test]
    fn four_line_boundary_is_skipped_five_kept() {
        let para = "Exactly the kind of sentence that makes the average work out. ";
        let four: String = (0..4).map(|_| format!("<p>{para}</p>")).collect();
        let five: String = (0..5).map(|_| format!("<p>{para}</p>")).collect();

        assert!(matches!(classify(&four), Decision::Skip(SkipReason::Sparse)));
        assert!(matches!(classify(&five), Decision::Keep(_)));
    }

    #[test]
    fn heuristic_order_markup_before_copyright() {
        // A document that is both mostly markup AND mentions copyright must
        // report the markup reason: it is discarded before cleaning.
        let html = format!("<div x=\"{}\"></div>copyright", "b".repeat(200));
        assert!(matches!(
            classify(&html),
            Decision::Skip(SkipReason::MostlyMarkup)
        ));
    }

    #[test]
    fn normalize_store_keeps_and_drops() {
        let store = MemStore::new()
            .with(ORDER_FILE, "a.html\nb.xhtml\nc.html\n")
            .with("a.html", &narrative_html())
            .with("b.xhtml", &narrative_html())
            // c is 90%+ markup
            .with("c.html", &format!("<div class=\"{}\"></div>x", "c".repeat(200)));

        let report = normalize_store(&store).unwrap();

        assert_eq!(report.kept, vec!["a.txt", "b.txt"]);
        assert_eq!(report.skipped, vec![("c.html".to_string(), SkipReason::MostlyMarkup)]);

        // Order file rewritten with the renamed survivors only
        assert_eq!(store.read(ORDER_FILE).unwrap(), "a.txt\nb.txt\n");

        // Originals gone, cleaned text in place, no trace of c
        assert!(!store.exists("a.html"));
        assert!(!store.exists("b.xhtml"));
        assert!(!store.exists("c.html"));
        assert!(!store.exists("c.txt"));
        assert!(store.read("a.txt").unwrap().lines().count() == 5);
    }

    #[test]
    fn normalize_store_missing_file_is_a_skip() {
        let store = MemStore::new()
            .with(ORDER_FILE, "ghost.html\nreal.html\n")
            .with("real.html", &narrative_html());

        let report = normalize_store(&store).unwrap();

        assert_eq!(report.kept, vec!["real.txt"]);
        assert_eq!(
            report.skipped,
            vec![("ghost.html".to_string(), SkipReason::NotFound)]
        );
    }

    #[test]
    fn normalize_store_without_order_file_fails() {
        let store = MemStore::new().with("a.html", "<p>text</p>");
        assert!(normalize_store(&store).is_err());
    }

    #[test]
    fn duplicate_order_entries_keep_first_occurrence_only() {
        let store = MemStore::new()
            .with(ORDER_FILE, "a.html\na.html\n")
            .with("a.html", &narrative_html());

        let report = normalize_store(&store).unwrap();

        // First pass consumes the file; the duplicate hits the missing-file
        // skip path.
        assert_eq!(report.kept, vec!["a.txt"]);
        assert_eq!(report.skipped, vec![("a.html".to_string(), SkipReason::NotFound)]);
    }
}
