//! Deleting repositories locally, remotely, or both.
//!
//! Deletion runs one repository at a time. Each failure is recorded and the
//! remaining repositories are still processed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use sgit_core::{IssueKind, IssueList, RepoIssue, RepoStatePair};
use sgit_github::HostingApi;
use sgit_local::remove_repo_dir;

use crate::error::ReconcileError;

/// Which copies `sgit delete` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteTarget {
    Local,
    Remote,
    Both,
}

impl DeleteTarget {
    pub fn local(self) -> bool {
        matches!(self, DeleteTarget::Local | DeleteTarget::Both)
    }

    pub fn remote(self) -> bool {
        matches!(self, DeleteTarget::Remote | DeleteTarget::Both)
    }
}

impl fmt::Display for DeleteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteTarget::Local => write!(f, "local"),
            DeleteTarget::Remote => write!(f, "remote"),
            DeleteTarget::Both => write!(f, "both"),
        }
    }
}

impl FromStr for DeleteTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(DeleteTarget::Local),
            "remote" => Ok(DeleteTarget::Remote),
            "both" => Ok(DeleteTarget::Both),
            other => Err(format!(
                "invalid delete target \"{other}\"; expected local, remote, or both"
            )),
        }
    }
}

/// What happened to one selected repository.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub repo: String,
    pub path: PathBuf,
    pub local_removed: bool,
    pub remote_deleted: bool,
}

/// Full name used for the hosting API and in messages.
fn full_name(pair: &RepoStatePair, account: &str) -> String {
    format!("{}/{}", pair.owner.as_deref().unwrap_or(account), pair.name)
}

/// Delete each selected pair according to `target`.
///
/// Local directories outside `base` are refused. Remote deletion is only
/// attempted for pairs that have a hosted counterpart.
pub async fn delete_all(
    api: &dyn HostingApi,
    account: &str,
    base: &Path,
    pairs: &[RepoStatePair],
    target: DeleteTarget,
    cancel: &CancellationToken,
) -> Result<(Vec<DeleteOutcome>, IssueList), ReconcileError> {
    let mut outcomes = Vec::with_capacity(pairs.len());
    let mut issues = IssueList::default();

    for pair in pairs {
        if cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled);
        }
        let repo = full_name(pair, account);
        let mut outcome = DeleteOutcome {
            repo: repo.clone(),
            path: pair.path.clone(),
            local_removed: false,
            remote_deleted: false,
        };

        if target.local() {
            let base = base.to_path_buf();
            let path = pair.path.clone();
            match tokio::task::spawn_blocking(move || remove_repo_dir(&base, &path)).await {
                Ok(Ok(removed)) => outcome.local_removed = removed,
                Ok(Err(err)) => {
                    tracing::error!(repo = %repo, error = %err, "local delete failed");
                    issues.push(RepoIssue::new(&repo, IssueKind::Delete, &err));
                }
                Err(err) => issues.push(RepoIssue::new(&repo, IssueKind::Task, &err)),
            }
        }

        if target.remote() && pair.has_remote {
            let owner = pair.owner.as_deref().unwrap_or(account);
            match api.delete_repo(owner, &pair.name.0).await {
                Ok(()) => {
                    tracing::info!(repo = %repo, "deleted hosted repository");
                    outcome.remote_deleted = true;
                }
                Err(err) => {
                    tracing::error!(repo = %repo, error = %err, "remote delete failed");
                    issues.push(RepoIssue::new(&repo, IssueKind::Delete, &err));
                }
            }
        }

        outcomes.push(outcome);
    }
    Ok((outcomes, issues))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("local", DeleteTarget::Local, true, false)]
    #[case("REMOTE", DeleteTarget::Remote, false, true)]
    #[case("both", DeleteTarget::Both, true, true)]
    fn parses_targets(
        #[case] raw: &str,
        #[case] expected: DeleteTarget,
        #[case] local: bool,
        #[case] remote: bool,
    ) {
        let parsed: DeleteTarget = raw.parse().expect("parse");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.local(), local);
        assert_eq!(parsed.remote(), remote);
    }

    #[test]
    fn rejects_unknown_target() {
        let err = "everything".parse::<DeleteTarget>().unwrap_err();
        assert!(err.contains("local, remote, or both"));
    }
}
