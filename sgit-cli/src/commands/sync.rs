//! `sgit sync`: classify and clone whatever is missing.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::{finish, FilterArgs, Session};
use crate::output;

/// Arguments for `sgit sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let filter = self.filter.build()?;
        let session = Session::start()?;
        sync_with(&session, &filter)
    }
}

/// Shared by `sync` and argument-less `clone`.
pub fn sync_with(session: &Session, filter: &sgit_core::Filter) -> Result<()> {
    let result = session
        .block_on(session.pipeline.sync(filter, &session.cancel))
        .context("sync failed")?;

    output::print_table(&session.config().base_dir, &result);
    let elapsed = result.finished_at - result.started_at;
    println!("Finished in {:.1}s.", elapsed.num_milliseconds() as f64 / 1000.0);
    finish(result.issues)
}
