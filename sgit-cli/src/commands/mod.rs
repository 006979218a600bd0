//! Subcommands and the plumbing they share.

pub mod clone;
pub mod create;
pub mod delete;
pub mod ls;
pub mod sync;

use std::future::Future;

use anyhow::{Context, Result};
use clap::Args;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use sgit_core::{Config, Filter, IssueList};
use sgit_sync::Pipeline;

// ---------------------------------------------------------------------------
// Filter flags
// ---------------------------------------------------------------------------

/// Flags that narrow which repositories a command sees.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Comma-separated languages, e.g. `go,rust`.
    #[arg(short = 'l', long = "langs", default_value = "")]
    pub langs: String,

    /// Comma-separated states or unique prefixes, e.g. `notc,uncommitted`.
    #[arg(short = 's', long = "states", default_value = "")]
    pub states: String,

    /// Only forks (`true`) or only non-forks (`false`).
    #[arg(short = 'f', long = "forks")]
    pub forks: Option<bool>,

    /// Comma-separated name fragments; a repository matches any of them.
    #[arg(short = 'n', long = "names", default_value = "")]
    pub names: String,
}

impl FilterArgs {
    /// Resolve the flags. Runs before configuration is loaded so a bad
    /// `--states` value fails without touching the network.
    pub fn build(&self) -> Result<Filter> {
        Filter::new(&self.langs, &self.states, &self.names, self.forks)
            .context("invalid filter flags")
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Configuration, runtime and pipeline for one command invocation.
///
/// Ctrl-C cancels [`Session::cancel`], which every pipeline call observes.
pub struct Session {
    runtime: Runtime,
    pub pipeline: Pipeline,
    pub cancel: CancellationToken,
}

impl Session {
    pub fn start() -> Result<Self> {
        let config = Config::load().context("failed to load configuration")?;
        tracing::debug!(?config, "configuration loaded");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let pipeline =
            Pipeline::from_config(config).context("failed to build hosting API client")?;

        let cancel = CancellationToken::new();
        {
            let cancel = cancel.clone();
            runtime.spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("received ctrl-c, cancelling");
                    cancel.cancel();
                }
            });
        }

        Ok(Self {
            runtime,
            pipeline,
            cancel,
        })
    }

    pub fn config(&self) -> &Config {
        self.pipeline.config()
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

/// Turn a non-empty issue list into the command's error.
///
/// Called after results are printed, so output comes first and the exit
/// code still reflects every per-repository failure.
pub fn finish(issues: IssueList) -> Result<()> {
    let count = issues.len();
    issues
        .into_result()
        .with_context(|| format!("{count} repository operation(s) failed"))
}
