//! Reading-order persistence and working-directory naming.
//!
//! The order file (`files_order.txt`) is the only index the pipeline keeps:
//! one base file name per line, in manifest reading order. The Extractor
//! writes it, the Normalizer rewrites it with the surviving names.

use crate::error::{LecternError, Result};
use crate::store::DocumentStore;

/// Name of the order file inside every working directory.
pub const ORDER_FILE: &str = "files_order.txt";

/// Read the order file from a store.
///
/// Absence is a config error: the Normalizer cannot run without a
/// completed Extractor pass.
pub fn read_order(store: &dyn DocumentStore) -> Result<Vec<String>> {
    if !store.exists(ORDER_FILE) {
        return Err(LecternError::config(format!(
            "{ORDER_FILE} not found, run extraction first"
        )));
    }

    let content = store.read(ORDER_FILE)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Overwrite the order file with the given names, one per line.
///
/// Callers build the full sequence in memory first; the store's write is
/// a single atomic replace, so the file never holds a partial sequence.
pub fn write_order(store: &dyn DocumentStore, names: &[String]) -> Result<()> {
    let mut content = String::new();
    for name in names {
        content.push_str(name);
        content.push('\n');
    }
    store.write(ORDER_FILE, content.as_bytes())
}

/// Derive a working-directory name from an archive file stem: every
/// character that is not alphanumeric or a space is removed, then the
/// result is right-trimmed.
pub fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// The final path component of a (possibly slash-separated) href.
pub fn base_name(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or(href)
}
