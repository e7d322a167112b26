//! File system abstractions for testability.
//!
//! The render pipeline reads and writes through [`FileSystem`] so tests can
//! simulate files, missing paths, and files held open by another writer
//! without touching the disk.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Abstraction over the file operations a render needs.
pub trait FileSystem: Send + Sync {
    /// Whether `path` names an existing regular file.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the whole file as UTF-8 text, without a leading byte-order mark.
    ///
    /// Bytes that are not valid UTF-8 fail with
    /// [`io::ErrorKind::InvalidData`].
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Creates or overwrites the file with `contents`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

// === Real implementation ===

/// Real file system using `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let text = std::fs::read_to_string(path)?;
        Ok(match text.strip_prefix('\u{FEFF}') {
            Some(rest) => rest.to_string(),
            None => text,
        })
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

// === Mock implementation for testing ===

/// In-memory file system for testing.
///
/// Files can be locked for a period of time to simulate another process
/// still writing them: reads of a locked file fail with
/// [`io::ErrorKind::PermissionDenied`] until the lock expires.
#[derive(Debug, Default)]
pub struct MockFs {
    files: Mutex<HashMap<PathBuf, String>>,
    locks: Mutex<HashMap<PathBuf, Instant>>,
    errors: Mutex<HashMap<PathBuf, io::ErrorKind>>,
    reads: Mutex<HashMap<PathBuf, usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockFs {
    /// Create an empty mock file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.set_file(path, contents);
        self
    }

    /// Add or replace a file.
    pub fn set_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        lock(&self.files).insert(path.into(), contents.into());
    }

    /// Hold `path` locked for `duration` from now.
    pub fn lock_for(&self, path: impl Into<PathBuf>, duration: Duration) {
        lock(&self.locks).insert(path.into(), Instant::now() + duration);
    }

    /// Make every read of `path` fail with `kind`.
    pub fn fail_reads(&self, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        lock(&self.errors).insert(path.into(), kind);
    }

    /// Current contents of a file, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        lock(&self.files).get(path.as_ref()).cloned()
    }

    /// Number of read attempts made on `path`, successful or not.
    pub fn read_attempts(&self, path: impl AsRef<Path>) -> usize {
        lock(&self.reads).get(path.as_ref()).copied().unwrap_or(0)
    }

    fn is_locked(&self, path: &Path) -> bool {
        lock(&self.locks)
            .get(path)
            .is_some_and(|until| Instant::now() < *until)
    }
}

impl FileSystem for MockFs {
    fn exists(&self, path: &Path) -> bool {
        lock(&self.files).contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        *lock(&self.reads).entry(path.to_path_buf()).or_insert(0) += 1;

        if self.is_locked(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is locked by another process", path.display()),
            ));
        }
        if let Some(kind) = lock(&self.errors).get(path).copied() {
            return Err(io::Error::new(kind, "simulated read failure"));
        }
        self.contents(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if self.is_locked(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is locked by another process", path.display()),
            ));
        }
        self.set_file(path, contents);
        Ok(())
    }
}
