//! `manifestor list`: units, their exclusion status and identifiers.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use manifestor_core::{ExclusionSet, Snapshot, SyncSettings};
use manifestor_renderer::identifier;

use super::WorkspaceArgs;

/// Arguments for `manifestor list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize)]
struct UnitRow {
    name: String,
    provenance: Option<String>,
    sources: usize,
    /// `None` when a manifest is generated.
    excluded: Option<String>,
    identifier: String,
}

#[derive(Tabled)]
struct UnitTableRow {
    #[tabled(rename = "unit")]
    name: String,
    #[tabled(rename = "provenance")]
    provenance: String,
    #[tabled(rename = "sources")]
    sources: usize,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "identifier")]
    identifier: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.workspace.settings()?;
        let snapshot = self.workspace.load_snapshot()?;
        let rows = build_rows(&settings, &snapshot);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize unit list")?
            );
            return Ok(());
        }
        print_table(&settings.workspace_name, rows);
        Ok(())
    }
}

fn build_rows(settings: &SyncSettings, snapshot: &Snapshot) -> Vec<UnitRow> {
    let mut exclusions = ExclusionSet::resolve(&snapshot.units, settings.enabled_provenance);
    exclusions.exclude_units_without_sources(&snapshot.units);

    snapshot
        .units
        .iter()
        .map(|unit| UnitRow {
            name: unit.name.to_string(),
            provenance: unit.provenance.map(|p| p.to_string()),
            sources: unit.source_files.len(),
            excluded: exclusions.reason(&unit.name).map(|r| r.to_string()),
            identifier: identifier(&settings.workspace_name, unit.name.as_str()).to_string(),
        })
        .collect()
}

fn print_table(workspace_name: &str, rows: Vec<UnitRow>) {
    let generated = rows.iter().filter(|r| r.excluded.is_none()).count();
    println!(
        "{} | {} units | {} generated",
        workspace_name.bold(),
        rows.len(),
        generated
    );
    if rows.is_empty() {
        println!("Snapshot has no units.");
        return;
    }

    let table_rows: Vec<UnitTableRow> = rows
        .into_iter()
        .map(|row| UnitTableRow {
            name: row.name,
            provenance: row.provenance.unwrap_or_else(|| "-".to_string()),
            sources: row.sources,
            status: match row.excluded {
                None => "generated".green().to_string(),
                Some(reason) => format!("excluded ({reason})").yellow().to_string(),
            },
            identifier: row.identifier,
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");
}
