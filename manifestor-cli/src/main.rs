//! manifestor: IDE project manifests from a build-graph snapshot.
//!
//! # Usage
//!
//! ```text
//! manifestor sync --snapshot <file> [--root <dir>] [--name <ws>] [--jobs <n>] [--dry-run]
//! manifestor diff --snapshot <file> [--root <dir>] [--name <ws>] [--jobs <n>]
//! manifestor list --snapshot <file> [--root <dir>] [--json]
//! manifestor id <workspace> <unit>
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, id::IdArgs, list::ListArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "manifestor",
    version,
    about = "Generate IDE project and solution manifests from a build graph",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write project manifests, the solution and the companion settings.
    Sync(SyncArgs),

    /// Show unified diff of what sync would write.
    Diff(DiffArgs),

    /// List units with their exclusion status and identifier.
    List(ListArgs),

    /// Print the stable identifier of a unit.
    Id(IdArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::List(args) => args.run(),
        Commands::Id(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
