//! Document store abstraction over a working directory.
//!
//! The pipeline's external contract is "filesystem as state machine": a
//! working directory holds the order file and the content documents. The
//! core logic, however, talks to a [`DocumentStore`] so it can be exercised
//! without real I/O. [`FsStore`] is the production implementation;
//! [`MemStore`] backs unit tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{LecternError, Result};

/// Flat, name-addressed document storage for one working directory.
///
/// Names are base file names only; implementations must not interpret
/// path separators.
pub trait DocumentStore {
    /// All document names currently present, in lexicographic order.
    fn list(&self) -> Result<Vec<String>>;

    /// Read a document as text. Undecodable bytes are replaced with
    /// U+FFFD, never an error.
    fn read(&self, name: &str) -> Result<String>;

    /// Write a document, replacing any existing content atomically.
    fn write(&self, name: &str, content: &[u8]) -> Result<()>;

    /// Delete a document. Missing documents and permission failures
    /// surface as errors; callers decide whether they are fatal.
    fn delete(&self, name: &str) -> Result<()>;

    /// Whether a document with this name exists.
    fn exists(&self, name: &str) -> bool;
}

// ---------------------------------------------------------------------------
// Filesystem store
// ---------------------------------------------------------------------------

/// Filesystem-backed store rooted at one working directory.
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store at `root`, creating the directory if absent.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| LecternError::io(&root, e))?;
        Ok(Self { root })
    }

    /// Open a store at an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(LecternError::validation(format!(
                "not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// The working directory this store is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl DocumentStore for FsStore {
    fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| LecternError::io(&self.root, e))?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.path_of(name);
        let bytes = std::fs::read(&path).map_err(|e| LecternError::io(&path, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write(&self, name: &str, content: &[u8]) -> Result<()> {
        // Write to a sibling temp file and rename over the target, so an
        // interrupted pass never leaves a truncated document behind.
        let path = self.path_of(name);
        let tmp = self.path_of(&format!("{name}.tmp"));

        std::fs::write(&tmp, content).map_err(|e| LecternError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| LecternError::io(&path, e))?;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_of(name);
        std::fs::remove_file(&path).map_err(|e| LecternError::io(&path, e))
    }

    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory store for tests. Single-threaded by design, like the pipeline.
#[derive(Default)]
pub struct MemStore {
    docs: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document, builder-style.
    pub fn with(self, name: &str, content: &str) -> Self {
        self.docs
            .borrow_mut()
            .insert(name.to_string(), content.as_bytes().to_vec());
        self
    }
}

impl DocumentStore for MemStore {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.docs.borrow().keys().cloned().collect())
    }

    fn read(&self, name: &str) -> Result<String> {
        self.docs
            .borrow()
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .ok_or_else(|| {
                LecternError::io(
                    name,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
                )
            })
    }

    fn write(&self, name: &str, content: &[u8]) -> Result<()> {
        self.docs
            .borrow_mut()
            .insert(name.to_string(), content.to_vec());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.docs.borrow_mut().remove(name).map(|_| ()).ok_or_else(|| {
            LecternError::io(
                name,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            )
        })
    }

    fn exists(&self, name: &str) -> bool {
        self.docs.borrow().contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_store_round_trip() {
        let store = MemStore::new();
        store.write("a.html", b"<p>hi</p>").unwrap();

        assert!(store.exists("a.html"));
        assert_eq!(store.read("a.html").unwrap(), "<p>hi</p>");

        store.delete("a.html").unwrap();
        assert!(!store.exists("a.html"));
        assert!(store.read("a.html").is_err());
    }

    #[test]
    fn mem_store_read_is_lossy() {
        let store = MemStore::new();
        store.write("bad.html", &[0x68, 0x69, 0xFF]).unwrap();
        assert_eq!(store.read("bad.html").unwrap(), "hi\u{FFFD}");
    }

    #[test]
    fn fs_store_write_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::create(dir.path().join("book")).unwrap();

        store.write("ch1.html", b"one").unwrap();
        store.write("ch2.html", b"two").unwrap();

        assert_eq!(store.list().unwrap(), vec!["ch1.html", "ch2.html"]);
        assert_eq!(store.read("ch1.html").unwrap(), "one");

        // Overwrite goes through the temp-then-rename path
        store.write("ch1.html", b"uno").unwrap();
        assert_eq!(store.read("ch1.html").unwrap(), "uno");
        assert!(!store.exists("ch1.html.tmp"));
    }

    #[test]
    fn fs_store_open_rejects_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsStore::open(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, LecternError::Validation { .. }));
    }
}
