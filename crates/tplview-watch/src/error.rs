//! Error types for file watching.

use std::path::PathBuf;

/// Errors that can occur while setting up a watch.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Watching was requested before both input files exist.
    #[error("Unable to watch as inputs are not found or not specified")]
    NotReady,

    /// The watched path has no file name component.
    #[error("Cannot watch {}: not a file path", path.display())]
    NotAFile { path: PathBuf },

    /// The notification backend failed.
    #[error("File watch failed: {0}")]
    Notify(#[from] notify::Error),
}
