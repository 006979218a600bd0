//! Local source: leaf directories plus their version-control status.
//!
//! Probes never abort the scan. A failed probe is logged at `warn` with the
//! default that was applied, recorded as a [`IssueKind::Probe`] issue, and the
//! field keeps its safe value.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use sgit_core::{
    Config, IssueKind, Layout, LocalListing, LocalRepo, LocalSource, RepoIssue, SourceError,
};

use crate::scan::{list_leaf_dirs, LeafDir};
use crate::vcs::Vcs;

/// Name of the metadata entry that marks a working copy.
pub const VCS_METADATA_DIR: &str = ".git";

/// Scans the base directory and probes each leaf.
#[derive(Clone)]
pub struct LocalScanner {
    base_dir: PathBuf,
    layout: Layout,
    vcs: Arc<dyn Vcs>,
    concurrency: usize,
}

struct Probed {
    repo: LocalRepo,
    issues: Vec<RepoIssue>,
}

impl LocalScanner {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        layout: Layout,
        vcs: Arc<dyn Vcs>,
        concurrency: usize,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            layout,
            vcs,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(config: &Config, vcs: Arc<dyn Vcs>) -> Self {
        Self::new(
            config.base_dir.clone(),
            config.layout,
            vcs,
            config.concurrency,
        )
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

async fn probe(vcs: Arc<dyn Vcs>, leaf: LeafDir) -> Probed {
    let mut issues = Vec::new();
    let label = leaf.path.display().to_string();

    let has_vcs_metadata = match tokio::fs::try_exists(leaf.path.join(VCS_METADATA_DIR)).await {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(
                path = %label,
                error = %err,
                defaulted = "no_vcs_metadata",
                "metadata probe failed"
            );
            issues.push(RepoIssue::new(&label, IssueKind::Probe, &err));
            false
        }
    };

    let mut remote_address = String::new();
    let mut has_uncommitted_changes = false;
    if has_vcs_metadata {
        match vcs.remote_address(&leaf.path).await {
            Ok(address) => remote_address = address,
            Err(err) => {
                tracing::warn!(
                    path = %label,
                    error = %err,
                    defaulted = "no_remote_address",
                    "remote address probe failed"
                );
                issues.push(RepoIssue::new(&label, IssueKind::Probe, &err));
            }
        }
        match vcs.has_uncommitted_changes(&leaf.path).await {
            Ok(dirty) => has_uncommitted_changes = dirty,
            Err(err) => {
                tracing::warn!(
                    path = %label,
                    error = %err,
                    defaulted = "no_uncommitted_changes",
                    "status probe failed"
                );
                issues.push(RepoIssue::new(&label, IssueKind::Probe, &err));
            }
        }
    }

    Probed {
        repo: LocalRepo {
            name: leaf.name,
            language: leaf.language,
            owner: leaf.owner,
            path: leaf.path,
            has_vcs_metadata,
            has_uncommitted_changes,
            remote_address,
        },
        issues,
    }
}

#[async_trait]
impl LocalSource for LocalScanner {
    async fn list_repos(&self, cancel: &CancellationToken) -> Result<LocalListing, SourceError> {
        if cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }
        let base = self.base_dir.clone();
        let layout = self.layout;
        let scan = tokio::task::spawn_blocking(move || list_leaf_dirs(&base, layout))
            .await
            .map_err(|err| SourceError::Local {
                path: self.base_dir.clone(),
                source: std::io::Error::other(err),
            })?
            .map_err(|source| SourceError::Local {
                path: self.base_dir.clone(),
                source,
            })?;
        tracing::debug!(
            base = %self.base_dir.display(),
            count = scan.leaves.len(),
            "scanned leaf directories"
        );

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<Option<Probed>> = JoinSet::new();
        for leaf in scan.leaves {
            let vcs = self.vcs.clone();
            let permits = permits.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return None,
                    permit = permits.acquire_owned() => permit.ok()?,
                };
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    probed = probe(vcs, leaf) => Some(probed),
                }
            });
        }

        let mut listing = LocalListing {
            issues: scan.issues,
            ..LocalListing::default()
        };
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                joined = tasks.join_next() => joined,
            };
            match joined {
                None => break,
                Some(Ok(Some(probed))) => {
                    listing.repos.push(probed.repo);
                    listing.issues.extend(probed.issues);
                }
                Some(Ok(None)) => return Err(SourceError::Cancelled),
                Some(Err(err)) => {
                    tracing::error!(error = %err, "probe task failed");
                    listing
                        .issues
                        .push(RepoIssue::new("<unknown>", IssueKind::Task, &err));
                }
            }
        }

        listing.repos.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(listing)
    }
}
