//! The reconciler: join remote and local views, classify, remediate, group.
//!
//! # Run
//!
//! 1. Both sources are collected concurrently under one child cancellation
//!    token and the run timeout. Nothing is classified until both are done.
//! 2. [`classify`] runs the remote-driven pass, then the local-only pass.
//!    A key classified by the remote pass is never overwritten.
//! 3. With remediation on, `NotCloned` pairs admitted by the filter are
//!    cloned and re-labelled `UpToDate` or `FailedToClone`.
//! 4. Surviving pairs are filtered and grouped by language.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use sgit_core::{
    Config, Filter, IdentityKey, IssueList, Language, Layout, LocalRepo, LocalSource,
    RemoteRepo, RemoteSource, Remediator, RepoIssue, RepoStatePair, RepositoryState,
};

use crate::clone::{clone_all, clone_issues, CloneJob, CloneStatus};
use crate::error::ReconcileError;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classified pairs keyed by identity, plus the remote side of every
/// `NotCloned` pair so remediation knows what to clone.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub pairs: BTreeMap<IdentityKey, RepoStatePair>,
    pub missing: BTreeMap<IdentityKey, RemoteRepo>,
}

/// Pure classification over two collected snapshots.
///
/// `unresolved` remotes are not classified, but their keys are held back so
/// local copies of them are not reported as `NoRemoteRepo`.
pub fn classify(
    layout: Layout,
    base: &Path,
    remotes: &[RemoteRepo],
    unresolved: &[RemoteRepo],
    locals: &[LocalRepo],
) -> Classified {
    let mut locals_by_key: BTreeMap<IdentityKey, Vec<&LocalRepo>> = BTreeMap::new();
    for local in locals {
        locals_by_key
            .entry(layout.local_key(local))
            .or_default()
            .push(local);
    }
    for candidates in locals_by_key.values_mut() {
        candidates.sort_by(|a, b| a.path.cmp(&b.path));
    }

    let mut out = Classified::default();
    let mut claimed: BTreeSet<&Path> = BTreeSet::new();

    // Remote-driven pass.
    for remote in remotes {
        let key = layout.remote_key(remote);
        if out.pairs.contains_key(&key) {
            tracing::debug!(repo = %remote.full_name(), "duplicate remote identity ignored");
            continue;
        }

        let candidates = locals_by_key.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        let matched = candidates
            .iter()
            .copied()
            .find(|l| l.language == remote.language)
            .or_else(|| candidates.first().copied());

        let pair = match matched {
            None => {
                let path = layout.repo_path(base, remote);
                out.missing.insert(key.clone(), remote.clone());
                RepoStatePair::from_remote(remote, path, RepositoryState::NotCloned)
            }
            Some(local) => {
                claimed.insert(local.path.as_path());
                let state = if local.language != remote.language {
                    RepositoryState::IncorrectLanguageParentDirectory
                } else if local.has_uncommitted_changes {
                    RepositoryState::UncommittedChanges
                } else {
                    RepositoryState::UpToDate
                };
                RepoStatePair::from_remote(remote, local.path.clone(), state)
            }
        };
        out.pairs.insert(key, pair);
    }

    let remote_keys: BTreeSet<IdentityKey> = remotes.iter().map(|r| layout.remote_key(r)).collect();
    let reserved: BTreeSet<IdentityKey> = unresolved
        .iter()
        .map(|r| layout.remote_key(r))
        .filter(|k| !remote_keys.contains(k))
        .collect();

    // Local-only pass. First write wins.
    let mut unclaimed: Vec<&LocalRepo> = locals
        .iter()
        .filter(|l| !claimed.contains(l.path.as_path()))
        .collect();
    unclaimed.sort_by(|a, b| a.path.cmp(&b.path));

    for local in unclaimed {
        let key = layout.local_key(local);
        if reserved.contains(&key) {
            tracing::debug!(
                path = %local.path.display(),
                "remote language unresolved; local copy left unclassified"
            );
            continue;
        }

        let state = if !local.has_vcs_metadata {
            RepositoryState::NotGitRepo
        } else if remote_keys.contains(&key) {
            // Extra copy of a repository whose primary copy the remote pass
            // already matched.
            RepositoryState::IncorrectLanguageParentDirectory
        } else {
            RepositoryState::NoRemoteRepo
        };

        let slot = if out.pairs.contains_key(&key) {
            IdentityKey::Located(local.path.clone())
        } else {
            key
        };
        out.pairs
            .entry(slot)
            .or_insert_with(|| RepoStatePair::from_local(local, state));
    }

    out
}

/// Group pairs by language, keeping only those the filter includes.
pub fn group_by_language<'a>(
    pairs: impl IntoIterator<Item = &'a RepoStatePair>,
    filter: &Filter,
) -> BTreeMap<Language, Vec<RepoStatePair>> {
    let mut groups: BTreeMap<Language, Vec<RepoStatePair>> = BTreeMap::new();
    for pair in pairs.into_iter().filter(|p| filter.include(p)) {
        groups
            .entry(pair.language.clone())
            .or_default()
            .push(pair.clone());
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    }
    groups
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Output of one run: grouped pairs plus every item-level failure.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub groups: BTreeMap<Language, Vec<RepoStatePair>>,
    pub issues: IssueList,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl Reconciliation {
    pub fn pairs(&self) -> impl Iterator<Item = &RepoStatePair> {
        self.groups.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_by_state(&self) -> BTreeMap<RepositoryState, usize> {
        let mut counts = BTreeMap::new();
        for pair in self.pairs() {
            *counts.entry(pair.state).or_insert(0) += 1;
        }
        counts
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Joins a [`RemoteSource`] and a [`LocalSource`] into classified pairs.
#[derive(Clone)]
pub struct Reconciler {
    remote: Arc<dyn RemoteSource>,
    local: Arc<dyn LocalSource>,
    remediator: Arc<dyn Remediator>,
    base_dir: PathBuf,
    layout: Layout,
    concurrency: usize,
    run_timeout: Duration,
    remediate: bool,
}

impl Reconciler {
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        local: Arc<dyn LocalSource>,
        remediator: Arc<dyn Remediator>,
        config: &Config,
    ) -> Self {
        Self {
            remote,
            local,
            remediator,
            base_dir: config.base_dir.clone(),
            layout: config.layout,
            concurrency: config.concurrency.max(1),
            run_timeout: config.run_timeout,
            remediate: false,
        }
    }

    /// Clone missing repositories during the run.
    pub fn with_remediation(mut self, remediate: bool) -> Self {
        self.remediate = remediate;
        self
    }

    pub fn remediates(&self) -> bool {
        self.remediate
    }

    pub async fn reconcile(
        &self,
        filter: &Filter,
        cancel: &CancellationToken,
    ) -> Result<Reconciliation, ReconcileError> {
        let started_at = Utc::now();
        let run = cancel.child_token();
        let deadline = tokio::time::Instant::now() + self.run_timeout;

        let collected = tokio::time::timeout_at(deadline, async {
            tokio::try_join!(self.remote.list_repos(&run), self.local.list_repos(&run))
        })
        .await;
        let (remote, local) = match collected {
            Ok(listings) => listings?,
            Err(_) => {
                run.cancel();
                tracing::error!(timeout_secs = self.run_timeout.as_secs(), "collection timed out");
                return Err(ReconcileError::TimedOut(self.run_timeout));
            }
        };
        tracing::info!(
            remote = remote.repos.len(),
            unresolved = remote.unresolved.len(),
            local = local.repos.len(),
            "collected"
        );

        let mut issues = IssueList::default();
        issues.extend(remote.issues);
        issues.extend(local.issues);

        let mut classified = classify(
            self.layout,
            &self.base_dir,
            &remote.repos,
            &remote.unresolved,
            &local.repos,
        );

        if self.remediate {
            let watchdog = {
                let run = run.clone();
                tokio::spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    run.cancel();
                })
            };
            issues.extend(self.remediate_missing(&mut classified, filter, &run).await);
            watchdog.abort();
        }

        let groups = group_by_language(classified.pairs.values(), filter);
        Ok(Reconciliation {
            groups,
            issues,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn remediate_missing(
        &self,
        classified: &mut Classified,
        filter: &Filter,
        cancel: &CancellationToken,
    ) -> Vec<RepoIssue> {
        let mut keys_by_target: HashMap<PathBuf, IdentityKey> = HashMap::new();
        let mut jobs = Vec::new();
        for (key, remote) in &classified.missing {
            let Some(pair) = classified.pairs.get(key) else {
                continue;
            };
            if pair.state != RepositoryState::NotCloned || !filter.admits_identity(pair) {
                continue;
            }
            keys_by_target.insert(pair.path.clone(), key.clone());
            jobs.push(CloneJob {
                repo: remote.clone(),
                target: pair.path.clone(),
            });
        }
        if jobs.is_empty() {
            return Vec::new();
        }
        tracing::info!(count = jobs.len(), "cloning missing repositories");

        let outcomes = clone_all(self.remediator.clone(), jobs, self.concurrency, cancel).await;
        for outcome in &outcomes {
            let Some(pair) = keys_by_target
                .get(&outcome.target)
                .and_then(|key| classified.pairs.get_mut(key))
            else {
                continue;
            };
            match outcome.status {
                CloneStatus::Cloned | CloneStatus::AlreadyPresent => {
                    pair.state = RepositoryState::UpToDate
                }
                CloneStatus::Failed => pair.state = RepositoryState::FailedToClone,
                CloneStatus::Skipped => {}
            }
        }
        clone_issues(&outcomes)
    }
}
