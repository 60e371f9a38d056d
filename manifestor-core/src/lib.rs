//! manifestor core library: build-graph types, snapshot and settings
//! persistence, unit exclusion.
//!
//! - [`types`]: newtypes and unit records
//! - [`snapshot`]: load / validate build-graph snapshots
//! - [`settings`]: per-workspace sync settings
//! - [`exclusion`]: which units get no manifest this pass
//! - [`error`]: [`SnapshotError`]

pub mod error;
pub mod exclusion;
pub mod settings;
pub mod snapshot;
pub mod types;

pub use error::SnapshotError;
pub use exclusion::{ExclusionReason, ExclusionSet};
pub use settings::{GrowthPolicy, SyncSettings};
pub use types::{Provenance, ProvenanceMask, Snapshot, UnitName, UnitRecord};
