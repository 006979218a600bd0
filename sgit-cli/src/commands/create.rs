//! `sgit create`: create a hosted repository and clone it.

use anyhow::{bail, Context, Result};
use clap::Args;

use sgit_sync::{CloneStatus, CreateRequest};

use crate::commands::Session;
use crate::output;

/// Arguments for `sgit create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Repository name.
    pub name: String,

    /// Create a private repository.
    #[arg(long)]
    pub private: bool,

    /// Language directory to clone into (default: `unknown`).
    #[arg(short = 'l', long)]
    pub language: Option<String>,
}

impl CreateArgs {
    pub fn run(self) -> Result<()> {
        if self.name.trim().is_empty() || self.name.contains('/') {
            bail!("invalid repository name '{}'", self.name);
        }
        let session = Session::start()?;
        let request = CreateRequest {
            name: self.name.clone(),
            private: self.private,
            language: self.language,
        };

        let outcome = session
            .block_on(session.pipeline.create(&request))
            .with_context(|| format!("failed to create '{}'", self.name))?;

        println!(
            "Created {} ({})",
            outcome.repo,
            if self.private { "private" } else { "public" }
        );
        println!(
            "  {} {} {}",
            output::clone_marker(outcome.clone),
            outcome.clone,
            outcome.target.display()
        );

        if outcome.clone == CloneStatus::Failed {
            bail!(
                "created {} but cloning failed: {}",
                outcome.repo,
                outcome.error.unwrap_or_default()
            );
        }
        Ok(())
    }
}
