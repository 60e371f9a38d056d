//! Build-graph snapshot persistence.
//!
//! The compilation pipeline hands the engine one [`Snapshot`] per sync pass.
//! On disk it is a YAML document (or JSON when the file extension is
//! `.json`):
//!
//! ```text
//! units:
//!   - name: Game.Core
//!     source_files: [Assets/Core/Player.cs]
//!     defines: [DEBUG]
//!     references: [/opt/engine/Managed/Engine.dll]
//!     unit_references: [Game.Util]
//!     provenance: embedded
//! ```
//!
//! Every load validates the graph: unit names are unique, usable as file
//! names, and every `unit_references` entry names a unit of the same
//! snapshot.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{io_err, SnapshotError};
use crate::types::{Snapshot, UnitName};

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load and validate a snapshot from `path`.
pub fn load_at(path: &Path) -> Result<Snapshot, SnapshotError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let snapshot: Snapshot = if is_json(path) {
        serde_json::from_str(&contents).map_err(|e| SnapshotError::Json {
            path: path.to_path_buf(),
            source: e,
        })?
    } else {
        serde_yaml::from_str(&contents).map_err(|e| SnapshotError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?
    };
    validate(&snapshot)?;
    Ok(snapshot)
}

/// Check names and dependency closure.
pub fn validate(snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let mut names = HashSet::with_capacity(snapshot.units.len());
    for unit in &snapshot.units {
        check_unit_name(&unit.name)?;
        if !names.insert(&unit.name) {
            return Err(SnapshotError::DuplicateUnit {
                name: unit.name.clone(),
            });
        }
    }
    for unit in &snapshot.units {
        if let Some(missing) = unit.unit_references.iter().find(|d| !names.contains(d)) {
            return Err(SnapshotError::UnknownDependency {
                unit: unit.name.clone(),
                dependency: missing.clone(),
            });
        }
    }
    Ok(())
}

/// A unit name becomes `<root>/<name>.csproj` and a quoted `.sln` field, so
/// it must stay a single plain path component.
pub fn check_unit_name(name: &UnitName) -> Result<(), SnapshotError> {
    let text = name.as_str();
    let reason = if text.is_empty() {
        Some("empty")
    } else if text.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if text.contains("..") {
        Some("contains '..'")
    } else if text.contains(':') {
        Some("contains ':'")
    } else if text.contains('"') {
        Some("contains a double quote")
    } else if text.chars().any(char::is_control) {
        Some("contains a control character")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(SnapshotError::InvalidUnitName {
            name: name.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{UnitName, UnitRecord};
    use tempfile::TempDir;

    #[test]
    fn validate_rejects_duplicates() {
        let snapshot = Snapshot::new(vec![UnitRecord::new("A"), UnitRecord::new("A")]);
        match validate(&snapshot) {
            Err(SnapshotError::DuplicateUnit { name }) => assert_eq!(name, UnitName::from("A")),
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_unknown_dependency() {
        let mut b = UnitRecord::new("B");
        b.unit_references.push(UnitName::from("Missing"));
        let snapshot = Snapshot::new(vec![UnitRecord::new("A"), b]);
        match validate(&snapshot) {
            Err(SnapshotError::UnknownDependency { unit, dependency }) => {
                assert_eq!(unit.0, "B");
                assert_eq!(dependency.0, "Missing");
            }
            other => panic!("expected unknown dependency, got {other:?}"),
        }
    }

    #[test]
    fn json_snapshot_loads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("graph.json");
        std::fs::write(
            &path,
            r#"{"units":[{"name":"A","source_files":["a.cs"],"provenance":"git"}]}"#,
        )
        .unwrap();
        let snapshot = load_at(&path).unwrap();
        assert_eq!(snapshot.units.len(), 1);
        assert_eq!(snapshot.units[0].source_files.len(), 1);
    }
}
