//! Watch controller: two file watches that can be switched on and off.
//!
//! The controller starts out unwatched. The first successful
//! [`start_watch`](WatchController::start_watch) subscribes once to the
//! template file and once to the content file. After that, starting and
//! stopping only flips the enabled flags; subscriptions live as long as the
//! controller.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tplview_render::{DiagnosticsSink, RenderPaths};

use crate::backend::{ChangeCallback, NotifyBackend, Subscription, WatchBackend};
use crate::error::WatchError;

/// Readiness probe consulted before watches are created.
pub type ReadyCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// One subscription plus its switch.
struct FileWatch {
    path: PathBuf,
    enabled: Arc<AtomicBool>,
    _subscription: Subscription,
}

impl FileWatch {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

/// Lifecycle of the controller's watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// No watches created yet.
    Unwatched,
    /// Watches exist but changes are ignored.
    Paused,
    /// Changes trigger the callback.
    Watching,
}

/// Owns the template and content watches.
pub struct WatchController {
    template: Option<PathBuf>,
    content: Option<PathBuf>,
    backend: Arc<dyn WatchBackend>,
    log: Arc<dyn DiagnosticsSink>,
    ready: ReadyCheck,
    on_change: ChangeCallback,
    watches: Mutex<Vec<FileWatch>>,
}

impl WatchController {
    /// Creates an unwatched controller for the inputs in `paths`.
    ///
    /// `ready` guards watch creation; `on_change` runs on the notification
    /// thread for every change while watching, so it should only hand work
    /// off, as [`RenderQueue::trigger`](crate::RenderQueue::trigger) does.
    pub fn new(
        paths: &RenderPaths,
        log: Arc<dyn DiagnosticsSink>,
        ready: ReadyCheck,
        on_change: ChangeCallback,
    ) -> Self {
        Self {
            template: paths.template.clone(),
            content: paths.content.clone(),
            backend: Arc::new(NotifyBackend),
            log,
            ready,
            on_change,
            watches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn WatchBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn state(&self) -> WatchState {
        let watches = self.watches.lock().unwrap_or_else(PoisonError::into_inner);
        if watches.is_empty() {
            WatchState::Unwatched
        } else if watches.iter().any(|w| w.enabled.load(Ordering::SeqCst)) {
            WatchState::Watching
        } else {
            WatchState::Paused
        }
    }

    /// Paths currently subscribed to.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|w| w.path.clone())
            .collect()
    }

    /// Starts watching, creating the watches on first use.
    ///
    /// Returns whether the controller is watching afterwards. Failures are
    /// logged; nothing is returned as an error.
    pub fn start_watch(&self) -> bool {
        match self.try_start_watch() {
            Ok(()) => true,
            Err(WatchError::NotReady) => {
                self.log.warning(&WatchError::NotReady.to_string());
                false
            }
            Err(err) => {
                self.log.error(&err.to_string());
                false
            }
        }
    }

    /// Starts watching, returning the failure instead of logging it.
    ///
    /// Calling it again while watching changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::NotReady`] if the readiness check fails, or the
    /// backend's error if a watch cannot be created.
    pub fn try_start_watch(&self) -> Result<(), WatchError> {
        if !(self.ready)() {
            return Err(WatchError::NotReady);
        }

        let mut watches = self.watches.lock().unwrap_or_else(PoisonError::into_inner);
        if watches.is_empty() {
            let (Some(template), Some(content)) = (&self.template, &self.content) else {
                return Err(WatchError::NotReady);
            };
            // Both or neither: a failure on the second drops the first.
            let created = vec![self.subscribe(template)?, self.subscribe(content)?];
            *watches = created;
        }

        for watch in watches.iter() {
            watch.set_enabled(true);
        }
        tracing::debug!(count = watches.len(), "watching");
        Ok(())
    }

    /// Stops reacting to changes without removing the watches.
    pub fn stop_watch(&self) {
        let watches = self.watches.lock().unwrap_or_else(PoisonError::into_inner);
        for watch in watches.iter() {
            watch.set_enabled(false);
        }
        drop(watches);
        tracing::debug!("watch stopped");
        self.log.info("");
    }

    fn subscribe(&self, path: &Path) -> Result<FileWatch, WatchError> {
        let enabled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&enabled);
        let on_change = Arc::clone(&self.on_change);
        let subscription = self.backend.subscribe(
            path,
            Arc::new(move || {
                if flag.load(Ordering::SeqCst) {
                    on_change();
                }
            }),
        )?;
        Ok(FileWatch {
            path: path.to_path_buf(),
            enabled,
            _subscription: subscription,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use std::sync::atomic::AtomicUsize;
    use tplview_render::{Level, MemoryLog};

    struct Fixture {
        controller: WatchController,
        backend: MockBackend,
        log: Arc<MemoryLog>,
        ready: Arc<AtomicBool>,
        changes: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let backend = MockBackend::new();
        let log = Arc::new(MemoryLog::new());
        let ready = Arc::new(AtomicBool::new(true));
        let changes = Arc::new(AtomicUsize::new(0));

        let (r, c) = (Arc::clone(&ready), Arc::clone(&changes));
        let controller = WatchController::new(
            &RenderPaths::new("t.liquid", "c.json", "out.txt"),
            log.clone(),
            Arc::new(move || r.load(Ordering::SeqCst)),
            Arc::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .with_backend(Arc::new(backend.clone()));

        Fixture {
            controller,
            backend,
            log,
            ready,
            changes,
        }
    }

    #[test]
    fn test_starts_unwatched() {
        let f = fixture();
        assert_eq!(f.controller.state(), WatchState::Unwatched);
        assert_eq!(f.backend.subscription_count(), 0);
    }

    #[test]
    fn test_start_watch_creates_one_watch_per_file() {
        let f = fixture();
        assert!(f.controller.start_watch());
        assert_eq!(f.controller.state(), WatchState::Watching);
        assert_eq!(
            f.backend.subscribed_paths(),
            vec![PathBuf::from("t.liquid"), PathBuf::from("c.json")]
        );
    }

    #[test]
    fn test_start_watch_is_idempotent() {
        let f = fixture();
        assert!(f.controller.start_watch());
        assert!(f.controller.start_watch());
        assert_eq!(f.backend.subscription_count(), 2);
    }

    #[test]
    fn test_stop_then_start_reuses_watches() {
        let f = fixture();
        f.controller.start_watch();
        f.controller.stop_watch();
        assert_eq!(f.controller.state(), WatchState::Paused);

        assert!(f.controller.start_watch());
        assert_eq!(f.controller.state(), WatchState::Watching);
        assert_eq!(f.backend.subscription_count(), 2);
        assert_eq!(f.backend.dropped_count("t.liquid"), 0);
    }

    #[test]
    fn test_changes_only_fire_while_enabled() {
        let f = fixture();
        f.controller.start_watch();
        f.backend.fire("c.json");
        f.backend.fire("t.liquid");
        assert_eq!(f.changes.load(Ordering::SeqCst), 2);

        f.controller.stop_watch();
        f.backend.fire("c.json");
        assert_eq!(f.changes.load(Ordering::SeqCst), 2);

        f.controller.start_watch();
        f.backend.fire("c.json");
        assert_eq!(f.changes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_start_watch_requires_readiness() {
        let f = fixture();
        f.ready.store(false, Ordering::SeqCst);

        assert!(!f.controller.start_watch());
        assert_eq!(f.controller.state(), WatchState::Unwatched);
        assert_eq!(f.backend.subscription_count(), 0);
        assert!(f.log.contains(Level::Warning, "Unable to watch"));
    }

    #[test]
    fn test_stop_watch_logs_blank_line() {
        let f = fixture();
        f.controller.start_watch();
        f.controller.stop_watch();
        assert_eq!(f.log.entries(), vec![(Level::Info, String::new())]);
    }

    #[test]
    fn test_unset_paths_never_subscribe() {
        let backend = MockBackend::new();
        let controller = WatchController::new(
            &RenderPaths::default(),
            Arc::new(MemoryLog::new()),
            Arc::new(|| true),
            Arc::new(|| {}),
        )
        .with_backend(Arc::new(backend.clone()));

        assert!(matches!(controller.try_start_watch(), Err(WatchError::NotReady)));
        assert_eq!(backend.subscription_count(), 0);
    }

    #[test]
    fn test_backend_failure_is_logged() {
        let backend = MockBackend::new();
        let log = Arc::new(MemoryLog::new());
        let controller = WatchController::new(
            &RenderPaths::new("t.liquid", "/", "out.txt"),
            log.clone(),
            Arc::new(|| true),
            Arc::new(|| {}),
        )
        .with_backend(Arc::new(backend.clone()));

        assert!(!controller.start_watch());
        assert!(log.contains(Level::Error, "not a file path"));
        assert_eq!(controller.state(), WatchState::Unwatched);
        assert_eq!(backend.dropped_count("t.liquid"), 1);
    }
}
