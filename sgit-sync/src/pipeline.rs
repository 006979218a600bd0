//! Shared entrypoints used by every CLI command.
//!
//! [`Pipeline`] wires the concrete hosting client, git binary, scanner and
//! remediator from one [`Config`]. Tests build it with [`Pipeline::with_parts`]
//! and in-memory capabilities.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use sgit_core::{Config, Filter, RepoStatePair};
use sgit_github::{GithubApi, GithubSource, HostingApi};
use sgit_local::{CloneRemediator, GitCli, LocalScanner, Vcs};

use crate::clone::{clone_specs, CloneReport, RepoSpec};
use crate::create::{create_repo, CreateOutcome, CreateRequest};
use crate::delete::{delete_all, DeleteOutcome, DeleteTarget};
use crate::error::ReconcileError;
use crate::reconciler::{Reconciler, Reconciliation};

#[derive(Clone)]
pub struct Pipeline {
    config: Config,
    api: Arc<dyn HostingApi>,
    vcs: Arc<dyn Vcs>,
}

impl Pipeline {
    /// Production wiring: REST client and the `git` binary.
    pub fn from_config(config: Config) -> Result<Self, ReconcileError> {
        let api = GithubApi::new(&config)?;
        Ok(Self::with_parts(config, Arc::new(api), Arc::new(GitCli::new())))
    }

    pub fn with_parts(config: Config, api: Arc<dyn HostingApi>, vcs: Arc<dyn Vcs>) -> Self {
        Self { config, api, vcs }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn remediator(&self) -> Arc<CloneRemediator> {
        Arc::new(CloneRemediator::new(self.vcs.clone()))
    }

    pub fn reconciler(&self) -> Reconciler {
        let remote = GithubSource::new(
            self.api.clone(),
            self.config.account.clone(),
            self.config.concurrency,
        );
        let local = LocalScanner::from_config(&self.config, self.vcs.clone());
        Reconciler::new(
            Arc::new(remote),
            Arc::new(local),
            self.remediator(),
            &self.config,
        )
    }

    /// Classify without touching the disk.
    pub async fn list(
        &self,
        filter: &Filter,
        cancel: &CancellationToken,
    ) -> Result<Reconciliation, ReconcileError> {
        self.reconciler().reconcile(filter, cancel).await
    }

    /// Classify and clone whatever is missing.
    pub async fn sync(
        &self,
        filter: &Filter,
        cancel: &CancellationToken,
    ) -> Result<Reconciliation, ReconcileError> {
        self.reconciler()
            .with_remediation(true)
            .reconcile(filter, cancel)
            .await
    }

    pub async fn clone_repos(
        &self,
        specs: &[RepoSpec],
        cancel: &CancellationToken,
    ) -> Result<CloneReport, ReconcileError> {
        clone_specs(
            self.api.clone(),
            self.remediator(),
            &self.config.account,
            &self.config.base_dir,
            self.config.layout,
            specs,
            self.config.concurrency,
            cancel,
        )
        .await
    }

    pub async fn create(&self, request: &CreateRequest) -> Result<CreateOutcome, ReconcileError> {
        create_repo(
            self.api.as_ref(),
            self.remediator(),
            &self.config.account,
            &self.config.base_dir,
            self.config.layout,
            request,
        )
        .await
    }

    pub async fn delete(
        &self,
        pairs: &[RepoStatePair],
        target: DeleteTarget,
        cancel: &CancellationToken,
    ) -> Result<(Vec<DeleteOutcome>, sgit_core::IssueList), ReconcileError> {
        delete_all(
            self.api.as_ref(),
            &self.config.account,
            &self.config.base_dir,
            pairs,
            target,
            cancel,
        )
        .await
    }
}
