//! End-to-end pipeline: archive path → extracted + normalized working directory.
//!
//! One archive at a time, one document at a time; each archive's extract
//! and normalize phases run to completion before the next archive begins.
//! In a directory batch, one archive's failure is reported and the
//! iteration continues.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use lectern_extract::extract_archive;
use lectern_normalize::normalize_store;
use lectern_shared::{FsStore, LecternError, Result, sanitize_stem};

/// Archive file extension the pipeline matches on.
const ARCHIVE_EXT: &str = "epub";

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root directory that per-book working directories are created under.
    pub output_root: PathBuf,
}

/// Outcome of one archive's full extract + normalize pass.
#[derive(Debug)]
pub struct ArchiveReport {
    /// The source archive.
    pub archive: PathBuf,
    /// The working directory that was produced.
    pub book_dir: PathBuf,
    /// Number of chapters kept as `.txt` files.
    pub kept: usize,
    /// Number of documents discarded by the heuristics.
    pub skipped: usize,
}

/// Outcome of a whole run (one archive or a directory batch).
#[derive(Debug, Default)]
pub struct RunReport {
    /// Per-archive reports for the archives that completed.
    pub processed: Vec<ArchiveReport>,
    /// Archives that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when an archive's pass begins.
    fn archive_started(&self, path: &Path, current: usize, total: usize);
    /// Called when an archive's pass completes.
    fn archive_finished(&self, report: &ArchiveReport);
    /// Called when an archive's pass fails.
    fn archive_failed(&self, path: &Path, error: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn archive_started(&self, _path: &Path, _current: usize, _total: usize) {}
    fn archive_finished(&self, _report: &ArchiveReport) {}
    fn archive_failed(&self, _path: &Path, _error: &str) {}
}

/// Run extract + normalize for a single `.epub` file or every `.epub` in a
/// directory.
///
/// Errors local to one archive land in [`RunReport::failed`]; only an
/// unusable input path is an error for the run itself.
pub fn run(path: &Path, config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunReport> {
    let archives = find_archives(path)?;
    let total = archives.len();
    let mut report = RunReport::default();

    for (i, archive) in archives.iter().enumerate() {
        progress.archive_started(archive, i + 1, total);
        info!(archive = %archive.display(), "processing archive");

        match process_archive(archive, &config.output_root) {
            Ok(archive_report) => {
                progress.archive_finished(&archive_report);
                report.processed.push(archive_report);
            }
            Err(e) => {
                warn!(archive = %archive.display(), error = %e, "archive failed");
                progress.archive_failed(archive, &e.to_string());
                report.failed.push((archive.clone(), e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Extraction only: populate the working directory and order file without
/// normalizing. Same batch semantics as [`run`].
pub fn extract_only(
    path: &Path,
    config: &RunConfig,
    progress: &dyn ProgressReporter,
) -> Result<RunReport> {
    let archives = find_archives(path)?;
    let total = archives.len();
    let mut report = RunReport::default();

    for (i, archive) in archives.iter().enumerate() {
        progress.archive_started(archive, i + 1, total);

        let result = book_store(archive, &config.output_root)
            .and_then(|(store, book_dir)| Ok((extract_archive(archive, &store)?, book_dir)));

        match result {
            Ok((extract_report, book_dir)) => {
                let archive_report = ArchiveReport {
                    archive: archive.clone(),
                    book_dir,
                    kept: extract_report.extracted.len(),
                    skipped: 0,
                };
                progress.archive_finished(&archive_report);
                report.processed.push(archive_report);
            }
            Err(e) => {
                warn!(archive = %archive.display(), error = %e, "extraction failed");
                progress.archive_failed(archive, &e.to_string());
                report.failed.push((archive.clone(), e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Normalization only, over an existing working directory.
pub fn normalize_only(book_dir: &Path) -> Result<ArchiveReport> {
    let store = FsStore::open(book_dir)?;
    let normalize_report = normalize_store(&store)?;

    Ok(ArchiveReport {
        archive: PathBuf::new(),
        book_dir: book_dir.to_path_buf(),
        kept: normalize_report.kept.len(),
        skipped: normalize_report.skipped.len(),
    })
}

/// Resolve an input path to the list of archives to process.
fn find_archives(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        if !has_archive_ext(path) {
            return Err(LecternError::validation(format!(
                "not an .{ARCHIVE_EXT} file: {}",
                path.display()
            )));
        }
        return Ok(vec![path.to_path_buf()]);
    }

    if path.is_dir() {
        let entries = std::fs::read_dir(path).map_err(|e| LecternError::io(path, e))?;
        let mut archives: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && has_archive_ext(p))
            .collect();
        archives.sort();

        if archives.is_empty() {
            return Err(LecternError::validation(format!(
                "no .{ARCHIVE_EXT} files found in: {}",
                path.display()
            )));
        }
        return Ok(archives);
    }

    Err(LecternError::validation(format!(
        "invalid path: {}",
        path.display()
    )))
}

fn has_archive_ext(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == ARCHIVE_EXT)
}

/// Create the working directory and store for one archive.
fn book_store(archive: &Path, output_root: &Path) -> Result<(FsStore, PathBuf)> {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let book_dir = output_root.join(sanitize_stem(&stem));
    let store = FsStore::create(&book_dir)?;
    Ok((store, book_dir))
}

/// One archive's full pass: extract, then normalize.
fn process_archive(archive: &Path, output_root: &Path) -> Result<ArchiveReport> {
    let (store, book_dir) = book_store(archive, output_root)?;

    extract_archive(archive, &store)?;
    let normalize_report = normalize_store(&store)?;

    Ok(ArchiveReport {
        archive: archive.to_path_buf(),
        book_dir,
        kept: normalize_report.kept.len(),
        skipped: normalize_report.skipped.len(),
    })
}
