//! Single-slot render queue.
//!
//! File-change notifications must not run renders themselves: a render can
//! sleep for a second on a locked file, and two renders must never write the
//! output at the same time. [`RenderQueue`] moves renders onto one worker
//! thread and holds at most one pending request:
//!
//! - idle worker: a trigger starts a render
//! - busy worker, empty slot: a trigger fills the slot, and one more render
//!   runs after the current one
//! - busy worker, full slot: the trigger is coalesced into the pending one
//!
//! [`trigger`](RenderQueue::trigger) never blocks.

use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

/// A worker thread running one job at a time, with one pending slot.
pub struct RenderQueue {
    sender: Option<SyncSender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl RenderQueue {
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn<F>(mut job: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel::<()>(1);
        let worker = thread::Builder::new()
            .name("tplview-render".into())
            .spawn(move || {
                while receiver.recv().is_ok() {
                    job();
                }
                tracing::debug!("render queue stopped");
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Requests a render.
    ///
    /// Returns `true` if a new render was queued, `false` if the request was
    /// folded into one already pending, the queue is shut down, or the worker
    /// has stopped after a panicking job.
    pub fn trigger(&self) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => {
                tracing::debug!("render already pending, coalesced");
                false
            }
            Err(TrySendError::Disconnected(())) => {
                tracing::warn!("render worker has stopped, change not rendered");
                false
            }
        }
    }

    /// Whether the worker thread is still running.
    pub fn is_alive(&self) -> bool {
        self.sender.is_some() && self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stops accepting triggers and waits for queued renders to finish.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("render worker panicked");
            }
        }
    }
}

impl Drop for RenderQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::{Duration, Instant};

    /// A job that signals when it starts and waits for a release.
    fn gated_job() -> (
        impl FnMut() + Send + 'static,
        mpsc::Receiver<()>,
        mpsc::Sender<()>,
        Arc<AtomicUsize>,
    ) {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let job = move || {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
            counter.fetch_add(1, Ordering::SeqCst);
        };
        (job, started_rx, release_tx, runs)
    }

    #[test]
    fn test_single_trigger_runs_once() {
        let (job, started, release, runs) = gated_job();
        let mut queue = RenderQueue::spawn(job).unwrap();

        assert!(queue.trigger());
        started.recv_timeout(Duration::from_secs(5)).unwrap();
        release.send(()).unwrap();
        queue.shutdown();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_triggers_during_render_coalesce_into_one() {
        let (job, started, release, runs) = gated_job();
        let mut queue = RenderQueue::spawn(job).unwrap();

        assert!(queue.trigger());
        started.recv_timeout(Duration::from_secs(5)).unwrap();

        // First render is in flight: one slot, then coalescing.
        assert!(queue.trigger());
        for _ in 0..5 {
            assert!(!queue.trigger());
        }

        release.send(()).unwrap();
        started.recv_timeout(Duration::from_secs(5)).unwrap();
        release.send(()).unwrap();
        queue.shutdown();

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_trigger_does_not_block_during_slow_render() {
        let mut queue = RenderQueue::spawn(|| thread::sleep(Duration::from_millis(300))).unwrap();
        queue.trigger();

        let start = Instant::now();
        for _ in 0..100 {
            queue.trigger();
        }
        assert!(start.elapsed() < Duration::from_millis(200));
        queue.shutdown();
    }

    #[test]
    fn test_renders_never_overlap() {
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let (a, m) = (Arc::clone(&active), Arc::clone(&max_seen));
        let queue = Arc::new(
            RenderQueue::spawn(move || {
                let now = a.fetch_add(1, Ordering::SeqCst) + 1;
                m.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(5));
                a.fetch_sub(1, Ordering::SeqCst);
            })
            .unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let q = Arc::clone(&queue);
                thread::spawn(move || {
                    for _ in 0..20 {
                        q.trigger();
                        thread::sleep(Duration::from_millis(1));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        drop(queue);

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_trigger_after_shutdown_is_ignored() {
        let mut queue = RenderQueue::spawn(|| {}).unwrap();
        queue.shutdown();
        assert!(!queue.trigger());
        assert!(!queue.is_alive());
    }

    #[test]
    fn test_panicking_job_stops_the_worker() {
        let queue = RenderQueue::spawn(|| panic!("render failed")).unwrap();
        assert!(queue.is_alive());
        assert!(queue.trigger());

        let deadline = Instant::now() + Duration::from_secs(5);
        while queue.is_alive() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!queue.is_alive());
        assert!(!queue.trigger());
        assert!(!queue.trigger());
    }
}
