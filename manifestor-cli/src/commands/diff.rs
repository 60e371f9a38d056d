//! `manifestor diff`: show unified diffs for what sync would write.

use anyhow::{Context, Result};
use clap::Args;

use manifestor_sync::{diff_snapshot, SyncEngine};

use super::sync::{check_failures, print_failures};
use super::WorkspaceArgs;

/// Arguments for `manifestor diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.workspace.settings()?;
        let snapshot = self.workspace.load_snapshot()?;
        let workspace_name = settings.workspace_name.clone();

        let engine = SyncEngine::new(settings).context("failed to set up sync engine")?;
        let result = diff_snapshot(&engine, &snapshot)
            .with_context(|| format!("diff failed for '{workspace_name}'"))?;

        if result.diffs.is_empty() {
            println!("No differences for '{workspace_name}'.");
        }
        for diff in &result.diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        print_failures(&result.failures, &result.file_failures);
        check_failures(&result.failures, &result.file_failures)
    }
}
