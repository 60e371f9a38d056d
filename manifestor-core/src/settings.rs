//! Per-workspace sync settings.
//!
//! Loaded from `<workspace_root>/manifestor.yaml` when present; every field
//! has a default so an absent or partial file is valid. The workspace root
//! itself is never stored in the file; it is where the file lives.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, SnapshotError};
use crate::types::ProvenanceMask;

/// File name of the settings document inside a workspace root.
pub const SETTINGS_FILE: &str = "manifestor.yaml";

/// Capacity policy for the bounded encoding buffers.
///
/// Encoding starts with `initial_capacity` bytes, may grow exactly once, and
/// never beyond `max_capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthPolicy {
    pub initial_capacity: usize,
    pub max_capacity: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        GrowthPolicy {
            initial_capacity: 1024,
            max_capacity: 32 * 1024,
        }
    }
}

impl GrowthPolicy {
    /// The single grown capacity used for the retry after an overflow.
    pub fn grown_capacity(&self, needed: usize) -> usize {
        needed
            .checked_next_power_of_two()
            .unwrap_or(usize::MAX)
            .min(self.max_capacity)
    }
}

/// Settings for one sync pass over a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Directory manifests are written to and source paths are relative to.
    #[serde(skip)]
    pub workspace_root: PathBuf,
    /// Display name of the workspace; names the aggregate manifest.
    #[serde(default)]
    pub workspace_name: String,
    /// Provenance categories that get manifests.
    #[serde(default)]
    pub enabled_provenance: ProvenanceMask,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    /// Worker threads; `None` lets the pool pick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    /// Root of the system reference assemblies, one sub-directory per API level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework_root: Option<PathBuf>,
    /// Directory of `.tera` overrides for the embedded templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
    #[serde(default)]
    pub buffer: GrowthPolicy,
    /// Write `.vscode/settings.json` when absent.
    #[serde(default = "default_true")]
    pub companion_settings: bool,
}

fn default_output_path() -> String {
    "Temp\\Bin\\Debug\\".to_string()
}

fn default_true() -> bool {
    true
}

impl SyncSettings {
    /// Default settings for `workspace_root`; the workspace name is the
    /// root's directory name.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = workspace_root.into();
        let workspace_name = default_workspace_name(&workspace_root);
        SyncSettings {
            workspace_root,
            workspace_name,
            enabled_provenance: ProvenanceMask::default(),
            output_path: default_output_path(),
            jobs: None,
            framework_root: None,
            template_dir: None,
            buffer: GrowthPolicy::default(),
            companion_settings: true,
        }
    }

    /// Path of the aggregate workspace manifest.
    pub fn solution_path(&self) -> PathBuf {
        self.workspace_root
            .join(format!("{}.sln", self.workspace_name))
    }

    /// Path of the project manifest for `unit`.
    pub fn project_path(&self, unit: &str) -> PathBuf {
        self.workspace_root.join(format!("{unit}.csproj"))
    }
}

fn default_workspace_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workspace".to_string())
}

/// `<root>/manifestor.yaml`. Pure, no I/O.
pub fn settings_path_at(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

/// Load settings for the workspace at `root`.
///
/// Returns defaults if `manifestor.yaml` does not exist. Relative
/// `framework_root` / `template_dir` entries are resolved against `root`.
pub fn load_at(root: &Path) -> Result<SyncSettings, SnapshotError> {
    let path = settings_path_at(root);
    if !path.exists() {
        return Ok(SyncSettings::new(root));
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let mut settings: SyncSettings = serde_yaml::from_str(&contents)
        .map_err(|e| SnapshotError::Parse { path, source: e })?;

    settings.workspace_root = root.to_path_buf();
    if settings.workspace_name.is_empty() {
        settings.workspace_name = default_workspace_name(root);
    }
    settings.framework_root = settings.framework_root.map(|p| root.join(p));
    settings.template_dir = settings.template_dir.map(|p| root.join(p));
    Ok(settings)
}
