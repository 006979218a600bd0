//! `sgit clone`: clone named repositories into their language directories.

use anyhow::{Context, Result};
use clap::Args;

use sgit_sync::RepoSpec;

use crate::commands::{finish, sync::sync_with, FilterArgs, Session};
use crate::output;

/// Arguments for `sgit clone`.
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// `name`, `owner/name`, or an ssh/https address. Without any, every
    /// missing repository matching the filter flags is cloned.
    pub repos: Vec<String>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

impl CloneArgs {
    pub fn run(self) -> Result<()> {
        let filter = self.filter.build()?;
        let specs = self
            .repos
            .iter()
            .map(|raw| raw.parse::<RepoSpec>())
            .collect::<Result<Vec<_>, _>>()
            .context("invalid repository argument")?;

        let session = Session::start()?;
        if specs.is_empty() {
            return sync_with(&session, &filter);
        }

        let report = session
            .block_on(session.pipeline.clone_repos(&specs, &session.cancel))
            .context("clone failed")?;
        output::print_clone_outcomes(&session.config().base_dir, &report.outcomes);
        finish(report.issues)
    }
}
