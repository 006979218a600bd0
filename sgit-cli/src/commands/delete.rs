//! `sgit delete`: remove selected repositories locally, remotely, or both.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};

use sgit_core::Filter;
use sgit_sync::DeleteTarget;

use crate::commands::{finish, FilterArgs, Session};
use crate::output;

/// Arguments for `sgit delete`.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Which copies to delete: local, remote, or both.
    #[arg(short = 't', long)]
    pub target: DeleteTarget,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl DeleteArgs {
    pub fn run(self) -> Result<()> {
        let filter = self.filter.build()?;
        if filter == Filter::all() {
            bail!("refusing to delete without a filter; pass --langs, --states, --forks or --names");
        }
        let session = Session::start()?;

        let selected = session
            .block_on(session.pipeline.list(&filter, &session.cancel))
            .context("listing repositories failed")?;
        let base = session.config().base_dir.clone();
        output::print_table(&base, &selected);
        if selected.is_empty() {
            return finish(selected.issues);
        }

        if !self.yes {
            let prompt = format!(
                "Delete {} repositories ({})?",
                selected.len(),
                self.target
            );
            let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .default(false)
                .interact()
                .context("confirmation needs a terminal; pass --yes to skip it")?;
            if !confirmed {
                println!("Aborted.");
                return Ok(());
            }
        }

        let pairs: Vec<_> = selected.pairs().cloned().collect();
        let (outcomes, delete_issues) = session
            .block_on(session.pipeline.delete(&pairs, self.target, &session.cancel))
            .context("delete failed")?;

        for outcome in &outcomes {
            let mut done = Vec::new();
            if outcome.local_removed {
                done.push("local");
            }
            if outcome.remote_deleted {
                done.push("remote");
            }
            let what = if done.is_empty() {
                "nothing removed".bright_black().to_string()
            } else {
                format!("removed {}", done.join(" + ")).green().to_string()
            };
            println!("  {} {}", outcome.repo, what);
        }

        let mut issues = selected.issues;
        issues.extend(delete_issues.0);
        finish(issues)
    }
}
