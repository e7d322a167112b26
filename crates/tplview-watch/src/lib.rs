//! # tplview-watch - Re-render on File Change
//!
//! Watches a template and a content file and re-renders whenever either one
//! changes, without ever running two renders at once.
//!
//! - [`WatchController`]: Lazily created per-file watches with start/stop
//! - [`RenderQueue`]: One worker thread, one pending slot, coalesced triggers
//! - [`WatchBackend`]: Notification seam ([`NotifyBackend`], [`MockBackend`])
//!
//! Notifications arrive on the backend's thread. The controller only checks
//! its enabled flag and calls the change callback, which normally just
//! triggers the queue, so a slow render never holds up notification
//! delivery.

mod backend;
mod controller;
mod error;
mod queue;

pub use backend::{ChangeCallback, MockBackend, NotifyBackend, Subscription, WatchBackend};
pub use controller::{ReadyCheck, WatchController, WatchState};
pub use error::WatchError;
pub use queue::RenderQueue;
