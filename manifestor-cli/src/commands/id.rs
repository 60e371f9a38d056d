//! `manifestor id <workspace> <unit>`.

use anyhow::Result;
use clap::Args;

use manifestor_renderer::identifier;

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Workspace name.
    pub workspace: String,

    /// Unit name.
    pub unit: String,

    /// Wrap in braces, as embedded in manifests.
    #[arg(long)]
    pub braced: bool,
}

impl IdArgs {
    pub fn run(self) -> Result<()> {
        let guid = identifier(&self.workspace, &self.unit);
        if self.braced {
            println!("{}", guid.braced());
        } else {
            println!("{guid}");
        }
        Ok(())
    }
}
