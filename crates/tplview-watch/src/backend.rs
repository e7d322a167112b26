//! Change-notification backends.
//!
//! A [`WatchBackend`] subscribes a callback to changes of one file. The real
//! backend is [`NotifyBackend`]; [`MockBackend`] records subscriptions and
//! fires callbacks on demand so watch logic can be tested without a file
//! system.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::error::WatchError;

/// Callback invoked on every change to a watched file.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// A live subscription. Dropping it ends the subscription.
pub struct Subscription {
    _guard: Box<dyn Send>,
}

impl Subscription {
    pub fn new(guard: impl Send + 'static) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Subscription")
    }
}

/// Source of file-change notifications.
pub trait WatchBackend: Send + Sync {
    /// Calls `on_change` whenever the file at `path` is created or modified.
    ///
    /// Only that one file is observed, never siblings or subdirectories.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] if the path has no file name or the
    /// underlying watcher cannot be created.
    fn subscribe(&self, path: &Path, on_change: ChangeCallback) -> Result<Subscription, WatchError>;
}

// === Real implementation ===

/// Backend using the platform watcher from the `notify` crate.
///
/// Watches the file's parent directory non-recursively and filters events
/// down to the one file name.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotifyBackend;

impl WatchBackend for NotifyBackend {
    fn subscribe(&self, path: &Path, on_change: ChangeCallback) -> Result<Subscription, WatchError> {
        let name = path
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| WatchError::NotAFile {
                path: path.to_path_buf(),
            })?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if is_change(&event.kind) && touches(&event, &name) {
                    tracing::debug!(kind = ?event.kind, paths = ?event.paths, "file changed");
                    on_change();
                }
            }
            Err(err) => tracing::warn!(error = %err, "file watch error"),
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::debug!(dir = %dir.display(), file = %path.display(), "watch created");
        Ok(Subscription::new(watcher))
    }
}

fn is_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

fn touches(event: &Event, name: &OsString) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(name.as_os_str()))
}

// === Mock implementation for testing ===

/// Backend that records subscriptions and fires them on request.
#[derive(Default, Clone)]
pub struct MockBackend {
    subscriptions: Arc<Mutex<Vec<(PathBuf, ChangeCallback)>>>,
    dropped: Arc<Mutex<HashMap<PathBuf, usize>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of subscriptions ever made.
    pub fn subscription_count(&self) -> usize {
        lock(&self.subscriptions).len()
    }

    /// Paths subscribed to, in order.
    pub fn subscribed_paths(&self) -> Vec<PathBuf> {
        lock(&self.subscriptions)
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Number of subscriptions to `path` that have been dropped.
    pub fn dropped_count(&self, path: impl AsRef<Path>) -> usize {
        lock(&self.dropped).get(path.as_ref()).copied().unwrap_or(0)
    }

    /// Simulates a change to `path`, firing every callback subscribed to it.
    pub fn fire(&self, path: impl AsRef<Path>) {
        let callbacks: Vec<ChangeCallback> = lock(&self.subscriptions)
            .iter()
            .filter(|(p, _)| p == path.as_ref())
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback();
        }
    }
}

struct MockGuard {
    path: PathBuf,
    dropped: Arc<Mutex<HashMap<PathBuf, usize>>>,
}

impl Drop for MockGuard {
    fn drop(&mut self) {
        *lock(&self.dropped).entry(self.path.clone()).or_insert(0) += 1;
    }
}

impl WatchBackend for MockBackend {
    fn subscribe(&self, path: &Path, on_change: ChangeCallback) -> Result<Subscription, WatchError> {
        if path.file_name().is_none() {
            return Err(WatchError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        lock(&self.subscriptions).push((path.to_path_buf(), on_change));
        Ok(Subscription::new(MockGuard {
            path: path.to_path_buf(),
            dropped: Arc::clone(&self.dropped),
        }))
    }
}
