//! Error types for manifestor-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::UnitName;

/// All errors that can arise from loading snapshots and settings.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON parse error on load.
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two records in one snapshot share a name.
    #[error("duplicate compilation unit '{name}'")]
    DuplicateUnit { name: UnitName },

    /// A unit name that cannot be used as a manifest file name.
    #[error("invalid unit name '{name}': {reason}")]
    InvalidUnitName { name: UnitName, reason: &'static str },

    /// A record depends on a unit the snapshot does not contain.
    #[error("unit '{unit}' depends on unknown unit '{dependency}'")]
    UnknownDependency { unit: UnitName, dependency: UnitName },
}

/// Convenience constructor for [`SnapshotError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.into(),
        source,
    }
}
