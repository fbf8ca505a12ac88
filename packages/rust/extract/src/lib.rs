//! Archive Extractor: EPUB container → populated working directory.
//!
//! Two decoupled passes over the ZIP entries:
//! 1. find the first `.opf` manifest, derive the reading order from it, and
//!    persist the order file (substring-based href filter);
//! 2. copy every entry with an exact `.xhtml`/`.html`/`.htm` suffix into the
//!    working directory under its base name.
//!
//! The passes use different matching rules and may produce different file
//! sets; the Normalizer treats order-file entries with no file on disk as
//! skips, so the discrepancy is benign.

mod manifest;

use std::io::{Read, Seek};
use std::path::Path;

use tracing::{info, warn};
use zip::ZipArchive;

use lectern_shared::{DocumentStore, LecternError, Result, base_name, write_order};

pub use manifest::{derive_order, is_order_href};

/// Suffixes that mark an archive entry as a content document.
///
/// Exact suffix matches only, stricter than [`is_order_href`].
const CONTENT_SUFFIXES: [&str; 3] = [".xhtml", ".html", ".htm"];

/// Whether an archive entry name is a content document to extract.
pub fn is_content_entry(name: &str) -> bool {
    CONTENT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Outcome of one archive's extraction pass.
#[derive(Debug)]
pub struct ExtractReport {
    /// Entry name of the manifest, if one was found.
    pub manifest: Option<String>,
    /// Number of names written to the order file (0 if no manifest).
    pub order_len: usize,
    /// Base names of the content documents copied out, in entry order.
    pub extracted: Vec<String>,
}

/// Extract an EPUB file at `path` into `store`.
pub fn extract_archive(path: &Path, store: &dyn DocumentStore) -> Result<ExtractReport> {
    let file = std::fs::File::open(path).map_err(|e| LecternError::io(path, e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| LecternError::Archive(format!("{}: {e}", path.display())))?;
    extract_from(&mut archive, store)
}

/// Extract from an already-open ZIP archive into `store`.
pub fn extract_from<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    store: &dyn DocumentStore,
) -> Result<ExtractReport> {
    let manifest = match locate_manifest(archive)? {
        Some((entry_name, xml)) => {
            info!(manifest = %entry_name, "found package manifest");
            Some((entry_name, derive_order(&xml)?))
        }
        None => {
            // Non-fatal: extraction still runs, the order file is skipped.
            warn!("no .opf manifest found in archive");
            None
        }
    };

    let order_len = match &manifest {
        Some((_, order)) => {
            let names: Vec<String> = order.iter().map(|href| base_name(href).to_string()).collect();
            write_order(store, &names)?;
            names.len()
        }
        None => 0,
    };

    let extracted = extract_content_files(archive, store)?;

    Ok(ExtractReport {
        manifest: manifest.map(|(name, _)| name),
        order_len,
        extracted,
    })
}

/// Find the first entry (in archive order) whose name ends in `.opf` and
/// return its name and XML content. Multiple candidates are not
/// disambiguated: first match wins.
fn locate_manifest<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Option<(String, String)>> {
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| LecternError::Archive(e.to_string()))?;

        if !entry.name().ends_with(".opf") {
            continue;
        }

        let name = entry.name().to_string();
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| LecternError::Archive(format!("reading {name}: {e}")))?;

        return Ok(Some((name, String::from_utf8_lossy(&bytes).into_owned())));
    }
    Ok(None)
}

/// Copy every content-document entry into the store under its base name.
///
/// Directory structure inside the archive is discarded; entries from
/// different subdirectories with the same base name silently overwrite
/// each other.
fn extract_content_files<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    store: &dyn DocumentStore,
) -> Result<Vec<String>> {
    let mut extracted = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| LecternError::Archive(e.to_string()))?;

        if !entry.is_file() || !is_content_entry(entry.name()) {
            continue;
        }

        let name = base_name(entry.name()).to_string();
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| LecternError::Archive(format!("reading {name}: {e}")))?;

        store.write(&name, &bytes)?;
        info!(file = %name, "extracted content document");
        extracted.push(name);
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use lectern_shared::{MemStore, ORDER_FILE};
    use zip::write::SimpleFileOptions;

    /// Build an in-memory ZIP from (entry name, content) pairs.
    fn build_zip(entries: &[(&str, &str)]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        let cursor = writer.finish().unwrap();
        ZipArchive::new(cursor).unwrap()
    }

    const OPF: &str = r#"<package xmlns="http://www.idpf.org/2007/opf">
        <manifest>
            <item href="text/a.html" media-type="text/html"/>
            <item href="text/b.xhtml" media-type="application/xhtml+xml"/>
            <item href="cover.jpg" media-type="image/jpeg"/>
        </manifest>
    </package>"#;

    #[test]
    fn extract_writes_order_and_content() {
        let mut archive = build_zip(&[
            ("content.opf", OPF),
            ("text/a.html", "<p>alpha</p>"),
            ("text/b.xhtml", "<p>beta</p>"),
            ("cover.jpg", "not html"),
        ]);
        let store = MemStore::new();

        let report = extract_from(&mut archive, &store).unwrap();

        assert_eq!(report.manifest.as_deref(), Some("content.opf"));
        assert_eq!(report.order_len, 2);
        assert_eq!(report.extracted, vec!["a.html", "b.xhtml"]);

        assert_eq!(store.read(ORDER_FILE).unwrap(), "a.html\nb.xhtml\n");
        assert_eq!(store.read("a.html").unwrap(), "<p>alpha</p>");
        assert_eq!(store.read("b.xhtml").unwrap(), "<p>beta</p>");
        assert!(!store.exists("cover.jpg"));
    }

    #[test]
    fn missing_manifest_still_extracts() {
        let mut archive = build_zip(&[("ch1.html", "<p>text</p>")]);
        let store = MemStore::new();

        let report = extract_from(&mut archive, &store).unwrap();

        assert!(report.manifest.is_none());
        assert_eq!(report.order_len, 0);
        assert!(!store.exists(ORDER_FILE));
        assert!(store.exists("ch1.html"));
    }

    #[test]
    fn first_opf_wins() {
        let second = r#"<package><manifest><item href="z.html"/></manifest></package>"#;
        let mut archive = build_zip(&[("one.opf", OPF), ("two.opf", second)]);
        let store = MemStore::new();

        let report = extract_from(&mut archive, &store).unwrap();
        assert_eq!(report.manifest.as_deref(), Some("one.opf"));
        assert_eq!(store.read(ORDER_FILE).unwrap(), "a.html\nb.xhtml\n");
    }

    #[test]
    fn collisions_silently_overwrite() {
        let mut archive = build_zip(&[
            ("front/ch1.html", "<p>front</p>"),
            ("back/ch1.html", "<p>back</p>"),
        ]);
        let store = MemStore::new();

        extract_from(&mut archive, &store).unwrap();
        assert_eq!(store.read("ch1.html").unwrap(), "<p>back</p>");
    }

    #[test]
    fn extract_archive_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.epub");
        std::fs::write(&path, "this is not a zip").unwrap();

        let store = MemStore::new();
        let err = extract_archive(&path, &store).unwrap_err();
        assert!(matches!(err, LecternError::Archive(_)));
    }

    #[test]
    fn content_entry_filter_is_exact_suffix() {
        assert!(is_content_entry("OEBPS/ch1.xhtml"));
        assert!(is_content_entry("ch2.html"));
        assert!(is_content_entry("old.htm"));
        // No substring matching here, unlike the order filter
        assert!(!is_content_entry("html-assets/figure.png"));
        assert!(!is_content_entry("styles.css"));
    }
}
