//! Arguments shared by every command that reads a snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use manifestor_core::{settings, snapshot, Snapshot, SyncSettings};

#[derive(Args, Debug)]
pub struct WorkspaceArgs {
    /// Build-graph snapshot (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Workspace root; manifests are written here.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Workspace name; overrides `manifestor.yaml` and the directory name.
    #[arg(long)]
    pub name: Option<String>,

    /// Worker threads (default: one per core).
    #[arg(long)]
    pub jobs: Option<usize>,
}

impl WorkspaceArgs {
    /// Settings from `<root>/manifestor.yaml` with CLI overrides applied.
    pub fn settings(&self) -> Result<SyncSettings> {
        let root = std::fs::canonicalize(&self.root)
            .with_context(|| format!("workspace root {} not found", self.root.display()))?;
        let mut settings = settings::load_at(&root)
            .with_context(|| format!("failed to load settings under {}", root.display()))?;
        if let Some(name) = &self.name {
            settings.workspace_name = name.clone();
        }
        if self.jobs.is_some() {
            settings.jobs = self.jobs;
        }
        Ok(settings)
    }

    pub fn load_snapshot(&self) -> Result<Snapshot> {
        snapshot::load_at(&self.snapshot)
            .with_context(|| format!("failed to load snapshot {}", self.snapshot.display()))
    }
}
