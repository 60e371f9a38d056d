//! Error types for manifestor-sync.

use std::path::PathBuf;

use thiserror::Error;

use manifestor_core::SnapshotError;
use manifestor_renderer::RenderError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Resolution, encoding or template failure.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The snapshot handed to a pass failed validation.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be started. Fatal for the whole pass.
    #[error("cannot start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
