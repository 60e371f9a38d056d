//! Error types for manifestor-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from resolving and rendering manifests.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building tera context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading user templates or response files.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoded text did not fit the scratch buffer even after its one growth.
    #[error("encoded text needs {needed} bytes but the buffer is capped at {capacity}")]
    EncodingOverflow { needed: usize, capacity: usize },

    /// A source or reference path cannot be expressed for the manifest.
    #[error("cannot resolve path '{path}': {reason}")]
    PathResolution { path: PathBuf, reason: &'static str },

    /// Rendered output was not valid UTF-8 (user template or hook output).
    #[error("rendered {path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },
}

/// Convenience constructor for [`RenderError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
