//! `manifestor sync`: render and write every manifest for a snapshot.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use manifestor_sync::{FileFailure, SyncEngine, UnitFailure, WriteResult};

use super::WorkspaceArgs;

/// Arguments for `manifestor sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.workspace.settings()?;
        let snapshot = self.workspace.load_snapshot()?;
        let workspace_name = settings.workspace_name.clone();

        let engine = SyncEngine::new(settings).context("failed to set up sync engine")?;
        let report = engine
            .run(&snapshot, self.dry_run)
            .with_context(|| format!("sync failed for '{workspace_name}'"))?;

        print_results(&workspace_name, &report.writes, self.dry_run);
        print_failures(&report.failures, &report.file_failures);
        check_failures(&report.failures, &report.file_failures)
    }
}

fn print_results(workspace_name: &str, writes: &[WriteResult], dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let written = writes.iter().filter(|r| !r.is_unchanged()).count();
    let unchanged = writes.len() - written;

    println!(
        "{prefix}✓ '{workspace_name}' synced ({written} written, {unchanged} unchanged)"
    );

    for r in writes {
        match r {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => {
                println!("  {}  {}", "·".bright_black(), path.display())
            }
        }
    }
}

pub(crate) fn print_failures(units: &[UnitFailure], files: &[FileFailure]) {
    for failure in units {
        eprintln!("  {}  {}: {}", "✗".red(), failure.unit, failure.error);
    }
    for failure in files {
        eprintln!("  {}  {}: {}", "✗".red(), failure.path.display(), failure.error);
    }
}

pub(crate) fn check_failures(units: &[UnitFailure], files: &[FileFailure]) -> Result<()> {
    if !units.is_empty() {
        bail!("{} unit(s) failed", units.len());
    }
    if !files.is_empty() {
        bail!("{} file(s) could not be written", files.len());
    }
    Ok(())
}
