//! # manifestor-sync
//!
//! Job-parallel sync of a build-graph snapshot into project manifests, an
//! aggregate workspace manifest and the companion editor settings.
//!
//! Build a [`SyncEngine`] once from [`manifestor_core::SyncSettings`], then
//! call [`SyncEngine::run`] per sync request, or [`diff_snapshot`] to preview
//! the changes a sync would make.

pub mod diff;
pub mod error;
pub mod hooks;
pub mod pipeline;
pub mod writer;

pub use diff::{diff_snapshot, DiffReport, FileDiff};
pub use error::SyncError;
pub use hooks::PostProcessRegistry;
pub use pipeline::{DiskSink, FileFailure, ManifestSink, SyncEngine, SyncReport, UnitFailure};
pub use writer::{write_if_absent, write_if_changed, WriteResult};
