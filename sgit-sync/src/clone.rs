//! Clone fan-out, shared by remediation and the explicit clone command.
//!
//! Jobs run concurrently under a semaphore. Cancellation stops jobs that have
//! not started; a clone already handed to the remediator runs to completion
//! or failure so the remediator can clean up after itself.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use sgit_core::{IssueKind, Layout, RemoteRepo, RepoIssue, Remediator};
use sgit_github::{primary_language, HostingApi};

use crate::error::ReconcileError;

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

/// One repository to bring onto disk.
#[derive(Debug, Clone)]
pub struct CloneJob {
    pub repo: RemoteRepo,
    pub target: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloneStatus {
    Cloned,
    AlreadyPresent,
    Failed,
    /// Not started because the run was cancelled first.
    Skipped,
}

impl fmt::Display for CloneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneStatus::Cloned => write!(f, "cloned"),
            CloneStatus::AlreadyPresent => write!(f, "already present"),
            CloneStatus::Failed => write!(f, "failed"),
            CloneStatus::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CloneOutcome {
    pub repo: String,
    pub target: PathBuf,
    pub status: CloneStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run `jobs` with at most `concurrency` clones in flight.
///
/// Jobs sharing a target path are collapsed to the first one, so no directory
/// is ever cloned into twice. Outcomes come back sorted by target.
pub async fn clone_all(
    remediator: Arc<dyn Remediator>,
    jobs: Vec<CloneJob>,
    concurrency: usize,
    cancel: &CancellationToken,
) -> Vec<CloneOutcome> {
    let mut seen = BTreeSet::new();
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks: JoinSet<CloneOutcome> = JoinSet::new();

    for job in jobs {
        if !seen.insert(job.target.clone()) {
            tracing::debug!(
                repo = %job.repo.full_name(),
                path = %job.target.display(),
                "duplicate clone target dropped"
            );
            continue;
        }
        let remediator = remediator.clone();
        let permits = permits.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let repo = job.repo.full_name();
            let skipped = CloneOutcome {
                repo: repo.clone(),
                target: job.target.clone(),
                status: CloneStatus::Skipped,
                error: None,
            };
            let _permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => return skipped,
                permit = permits.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return skipped,
                },
            };
            if cancel.is_cancelled() {
                return skipped;
            }

            match remediator.clone_repo(&job.repo, &job.target).await {
                Ok(()) => CloneOutcome {
                    repo,
                    target: job.target,
                    status: CloneStatus::Cloned,
                    error: None,
                },
                Err(err) => {
                    tracing::error!(
                        repo = %repo,
                        path = %job.target.display(),
                        error = %err,
                        "clone failed"
                    );
                    CloneOutcome {
                        repo,
                        target: job.target,
                        status: CloneStatus::Failed,
                        error: Some(err.to_string()),
                    }
                }
            }
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => tracing::error!(error = %err, "clone task failed"),
        }
    }
    outcomes.sort_by(|a, b| a.target.cmp(&b.target));
    outcomes
}

/// Issues for every failed outcome, plus one for jobs cancelled before start.
pub fn clone_issues(outcomes: &[CloneOutcome]) -> Vec<RepoIssue> {
    let mut issues: Vec<RepoIssue> = outcomes
        .iter()
        .filter(|o| o.status == CloneStatus::Failed)
        .map(|o| {
            RepoIssue::new(
                &o.repo,
                IssueKind::Clone,
                o.error.as_deref().unwrap_or("unknown error"),
            )
        })
        .collect();

    let skipped = outcomes
        .iter()
        .filter(|o| o.status == CloneStatus::Skipped)
        .count();
    if skipped > 0 {
        issues.push(RepoIssue::new(
            "<run>",
            IssueKind::Task,
            format!("cancelled before cloning {skipped} repositories"),
        ));
    }
    issues
}

// ---------------------------------------------------------------------------
// Explicit targets
// ---------------------------------------------------------------------------

/// A repository named on the command line.
///
/// Accepts `name`, `owner/name`, `git@host:owner/name(.git)`, and
/// `https://host/owner/name(.git)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    pub owner: Option<String>,
    pub name: String,
}

impl RepoSpec {
    pub fn owner_or<'a>(&'a self, account: &'a str) -> &'a str {
        self.owner.as_deref().unwrap_or(account)
    }
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{owner}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for RepoSpec {
    type Err = ReconcileError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ReconcileError::InvalidRepoSpec {
            spec: raw.to_owned(),
            reason,
        };

        let trimmed = raw.trim();
        let path = if let Some(rest) = trimmed.strip_prefix("git@") {
            rest.split_once(':')
                .map(|(_, path)| path)
                .ok_or_else(|| invalid("ssh address has no ':'"))?
        } else if let Some((_, rest)) = trimmed.split_once("://") {
            rest.split_once('/')
                .map(|(_, path)| path)
                .ok_or_else(|| invalid("address has no repository path"))?
        } else {
            trimmed
        };
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let segments: Vec<&str> = path.split('/').collect();
        let (owner, name) = match segments.as_slice() {
            [name] => (None, *name),
            [owner, name] => (Some(*owner), *name),
            _ => return Err(invalid("expected name or owner/name")),
        };
        if name.is_empty() || owner.is_some_and(str::is_empty) {
            return Err(invalid("empty owner or name"));
        }
        Ok(Self {
            owner: owner.map(str::to_owned),
            name: name.to_owned(),
        })
    }
}

/// Look up a named repository and its primary language.
pub async fn resolve_spec(
    api: &dyn HostingApi,
    account: &str,
    spec: &RepoSpec,
) -> Result<RemoteRepo, ReconcileError> {
    let owner = spec.owner_or(account);
    let hosted = api.get_repo(owner, &spec.name).await?;
    let owner = hosted.owner_login(owner);
    let name = hosted.repo_name();
    let stats = api.repo_languages(&owner, &name.0).await?;
    Ok(RemoteRepo {
        name,
        owner,
        language: primary_language(&stats),
        clone_url: hosted.preferred_clone_url(),
        fork: hosted.fork,
    })
}

/// Result of cloning explicit targets.
#[derive(Debug, Clone, Default)]
pub struct CloneReport {
    pub outcomes: Vec<CloneOutcome>,
    pub issues: sgit_core::IssueList,
}

/// Resolve each spec, skip targets already on disk, clone the rest.
///
/// Resolution failures become issues; the remaining targets still run.
#[allow(clippy::too_many_arguments)]
pub async fn clone_specs(
    api: Arc<dyn HostingApi>,
    remediator: Arc<dyn Remediator>,
    account: &str,
    base: &std::path::Path,
    layout: Layout,
    specs: &[RepoSpec],
    concurrency: usize,
    cancel: &CancellationToken,
) -> Result<CloneReport, ReconcileError> {
    let mut report = CloneReport::default();
    let mut jobs = Vec::new();

    for spec in specs {
        if cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled);
        }
        let repo = match resolve_spec(api.as_ref(), account, spec).await {
            Ok(repo) => repo,
            Err(err) => {
                tracing::warn!(repo = %spec, error = %err, "could not resolve repository");
                report
                    .issues
                    .push(RepoIssue::new(spec.to_string(), IssueKind::LanguageLookup, &err));
                continue;
            }
        };
        let target = layout.repo_path(base, &repo);
        if target.exists() {
            tracing::info!(repo = %repo.full_name(), path = %target.display(), "already present");
            report.outcomes.push(CloneOutcome {
                repo: repo.full_name(),
                target,
                status: CloneStatus::AlreadyPresent,
                error: None,
            });
            continue;
        }
        jobs.push(CloneJob { repo, target });
    }

    let cloned = clone_all(remediator, jobs, concurrency, cancel).await;
    report.issues.extend(clone_issues(&cloned));
    report.outcomes.extend(cloned);
    report.outcomes.sort_by(|a, b| a.target.cmp(&b.target));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("ripgrep", None, "ripgrep")]
    #[case("octo/ripgrep", Some("octo"), "ripgrep")]
    #[case("git@github.com:octo/ripgrep.git", Some("octo"), "ripgrep")]
    #[case("https://github.com/octo/ripgrep.git", Some("octo"), "ripgrep")]
    #[case("https://github.com/octo/ripgrep/", Some("octo"), "ripgrep")]
    #[case("ssh://git@github.com/octo/ripgrep", Some("octo"), "ripgrep")]
    fn parses_repository_specs(
        #[case] raw: &str,
        #[case] owner: Option<&str>,
        #[case] name: &str,
    ) {
        let spec: RepoSpec = raw.parse().expect("parse");
        assert_eq!(spec.owner.as_deref(), owner);
        assert_eq!(spec.name, name);
    }

    #[rstest]
    #[case("")]
    #[case("a/b/c")]
    #[case("a//b")]
    #[case("git@github.com")]
    #[case("https://github.com")]
    fn rejects_malformed_specs(#[case] raw: &str) {
        let err = raw.parse::<RepoSpec>().unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidRepoSpec { .. }), "got: {err}");
    }

    #[test]
    fn skipped_jobs_become_one_issue() {
        let outcome = |status, error: Option<&str>| CloneOutcome {
            repo: "octo/x".to_string(),
            target: PathBuf::from("/code/go/x"),
            status,
            error: error.map(str::to_owned),
        };
        let issues = clone_issues(&[
            outcome(CloneStatus::Cloned, None),
            outcome(CloneStatus::Failed, Some("exit status 128")),
            outcome(CloneStatus::Skipped, None),
            outcome(CloneStatus::Skipped, None),
        ]);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].kind, IssueKind::Clone);
        assert!(issues[1].message.contains("2 repositories"));
    }
}
