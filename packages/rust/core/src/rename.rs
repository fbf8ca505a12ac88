//! Rename step: `.txt` chapters → `.md`, in place.
//!
//! A plain extension rename for consumers that want Markdown-suffixed
//! input. Content is untouched.

use std::path::{Path, PathBuf};

use tracing::info;

use lectern_shared::{LecternError, Result};

/// Rename every `.txt` file directly inside `dir` to the same stem with a
/// `.md` suffix. Returns the new paths in directory-listing order.
pub fn rename_txt_to_md(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LecternError::validation(format!(
            "invalid folder path: {}",
            dir.display()
        )));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| LecternError::io(dir, e))?;
    let mut txt_files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    txt_files.sort();

    if txt_files.is_empty() {
        return Err(LecternError::validation(format!(
            "no .txt files found in: {}",
            dir.display()
        )));
    }

    let mut renamed = Vec::with_capacity(txt_files.len());
    for txt in txt_files {
        let md = txt.with_extension("md");
        std::fs::rename(&txt, &md).map_err(|e| LecternError::io(&txt, e))?;
        info!(from = %txt.display(), to = %md.display(), "renamed");
        renamed.push(md);
    }

    Ok(renamed)
}
