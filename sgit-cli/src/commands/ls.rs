//! `sgit ls`: classify without touching the disk.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::{finish, FilterArgs, Session};
use crate::output;

/// Arguments for `sgit ls`.
#[derive(Args, Debug)]
pub struct LsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl LsArgs {
    pub fn run(self) -> Result<()> {
        let filter = self.filter.build()?;
        let session = Session::start()?;

        let result = session
            .block_on(session.pipeline.list(&filter, &session.cancel))
            .context("listing repositories failed")?;

        if self.json {
            output::print_json(&result)?;
        } else {
            output::print_table(&session.config().base_dir, &result);
        }
        finish(result.issues)
    }
}
