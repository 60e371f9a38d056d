//! Dry-run unified diff support for `manifestor diff`.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use similar::TextDiff;

use manifestor_core::Snapshot;
use manifestor_renderer::ManifestKind;

use crate::pipeline::{FileFailure, ManifestSink, SyncEngine, UnitFailure};
use crate::writer::{read_existing, WriteResult};
use crate::SyncError;

/// A single rendered file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diffs for every file a sync would change, sorted by path.
#[derive(Debug, Default)]
pub struct DiffReport {
    pub diffs: Vec<FileDiff>,
    pub failures: Vec<UnitFailure>,
    pub file_failures: Vec<FileFailure>,
}

/// Collects diffs instead of writing.
struct DiffSink<'a> {
    root: &'a Path,
    diffs: Mutex<Vec<FileDiff>>,
}

impl ManifestSink for DiffSink<'_> {
    fn commit(
        &self,
        kind: ManifestKind,
        path: &Path,
        content: &[u8],
    ) -> Result<WriteResult, SyncError> {
        let existing = read_existing(path)?;
        let unchanged = match (&existing, kind) {
            (Some(_), ManifestKind::EditorSettings) => true,
            (Some(bytes), _) => bytes.as_slice() == content,
            (None, _) => false,
        };
        if unchanged {
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }

        let old = String::from_utf8_lossy(existing.as_deref().unwrap_or_default());
        let new = String::from_utf8_lossy(content);
        let relative = path.strip_prefix(self.root).unwrap_or(path);
        let old_header = format!("a/{}", relative.display());
        let new_header = format!("b/{}", relative.display());
        let unified = TextDiff::from_lines(old.as_ref(), new.as_ref())
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        self.diffs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FileDiff {
                path: path.to_path_buf(),
                unified_diff: unified,
            });
        Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        })
    }
}

/// Render what `sync` would generate and compare it to current on-disk content.
///
/// No files are written.
pub fn diff_snapshot(engine: &SyncEngine, snapshot: &Snapshot) -> Result<DiffReport, SyncError> {
    let sink = DiffSink {
        root: &engine.settings().workspace_root,
        diffs: Mutex::new(Vec::new()),
    };
    let report = engine.run_with_sink(snapshot, &sink)?;

    let mut diffs = sink.diffs.into_inner().unwrap_or_else(PoisonError::into_inner);
    diffs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(DiffReport {
        diffs,
        failures: report.failures,
        file_failures: report.file_failures,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use manifestor_core::{SyncSettings, UnitRecord};
    use tempfile::TempDir;

    use super::*;

    fn snapshot() -> Snapshot {
        let mut a = UnitRecord::new("A");
        a.source_files = vec![PathBuf::from("a.cs")];
        let mut b = UnitRecord::new("B");
        b.source_files = vec![PathBuf::from("b.cs")];
        b.unit_references = vec!["A".into()];
        Snapshot::new(vec![a, b])
    }

    #[test]
    fn no_diffs_after_clean_sync() {
        let workspace = TempDir::new().expect("workspace");
        let engine = SyncEngine::new(SyncSettings::new(workspace.path())).expect("engine");
        engine.run(&snapshot(), false).expect("sync");

        let diff = diff_snapshot(&engine, &snapshot()).expect("diff");
        assert!(diff.diffs.is_empty(), "synced workspace should have no diff");
    }

    #[test]
    fn fresh_workspace_diffs_every_file_sorted() {
        let workspace = TempDir::new().expect("workspace");
        let engine = SyncEngine::new(SyncSettings::new(workspace.path())).expect("engine");

        let diff = diff_snapshot(&engine, &snapshot()).expect("diff");
        let paths: Vec<&PathBuf> = diff.diffs.iter().map(|d| &d.path).collect();
        assert_eq!(paths.len(), 4, "two projects, solution, companion settings");
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
        assert_eq!(fs::read_dir(workspace.path()).unwrap().count(), 0);
    }

    #[test]
    fn local_edit_produces_unified_diff() {
        let workspace = TempDir::new().expect("workspace");
        let engine = SyncEngine::new(SyncSettings::new(workspace.path())).expect("engine");
        engine.run(&snapshot(), false).expect("sync");

        let target = workspace.path().join("A.csproj");
        let edited = format!("{}<!-- manual tweak -->\n", fs::read_to_string(&target).expect("read"));
        fs::write(&target, edited).expect("write");

        let diff = diff_snapshot(&engine, &snapshot()).expect("diff");
        assert_eq!(diff.diffs.len(), 1);
        let a_diff = &diff.diffs[0];
        assert!(a_diff.unified_diff.contains("--- a/A.csproj"));
        assert!(a_diff.unified_diff.contains("+++ b/A.csproj"));
        assert!(a_diff.unified_diff.contains("-<!-- manual tweak -->"));
    }

    #[test]
    fn edited_companion_settings_are_not_reported() {
        let workspace = TempDir::new().expect("workspace");
        let engine = SyncEngine::new(SyncSettings::new(workspace.path())).expect("engine");
        engine.run(&snapshot(), false).expect("sync");
        fs::write(workspace.path().join(".vscode").join("settings.json"), "{}").expect("write");

        let diff = diff_snapshot(&engine, &snapshot()).expect("diff");
        assert!(diff.diffs.is_empty());
    }

    #[test]
    fn unreadable_companion_path_is_a_file_failure() {
        let workspace = TempDir::new().expect("workspace");
        fs::write(workspace.path().join(".vscode"), "plain file").expect("write");
        let engine = SyncEngine::new(SyncSettings::new(workspace.path())).expect("engine");

        let diff = diff_snapshot(&engine, &snapshot()).expect("diff");
        assert!(diff.failures.is_empty());
        assert_eq!(diff.file_failures.len(), 1);
        assert_eq!(diff.diffs.len(), 3, "two projects and the solution");
    }
}
