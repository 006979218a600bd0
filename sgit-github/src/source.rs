//! Remote source backed by a [`HostingApi`].
//!
//! One listing call, then one language lookup per repository. Lookups run as
//! independent tasks capped by a semaphore and are joined before returning.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use sgit_core::{
    IssueKind, Language, RemoteListing, RemoteRepo, RemoteSource, RepoIssue, SourceError,
};

use crate::api::{primary_language, HostedRepo, HostingApi};

/// Lists the account's repositories and resolves each one's primary language.
#[derive(Clone)]
pub struct GithubSource {
    api: Arc<dyn HostingApi>,
    account: String,
    concurrency: usize,
}

enum Lookup {
    Resolved(RemoteRepo),
    Failed(RemoteRepo, RepoIssue),
    Cancelled,
}

impl GithubSource {
    pub fn new(api: Arc<dyn HostingApi>, account: impl Into<String>, concurrency: usize) -> Self {
        Self {
            api,
            account: account.into(),
            concurrency: concurrency.max(1),
        }
    }

    fn normalize(&self, hosted: &HostedRepo) -> RemoteRepo {
        RemoteRepo {
            name: hosted.repo_name(),
            owner: hosted.owner_login(&self.account),
            language: Language::unknown(),
            clone_url: hosted.preferred_clone_url(),
            fork: hosted.fork,
        }
    }
}

#[async_trait]
impl RemoteSource for GithubSource {
    async fn list_repos(&self, cancel: &CancellationToken) -> Result<RemoteListing, SourceError> {
        let hosted = tokio::select! {
            _ = cancel.cancelled() => return Err(SourceError::Cancelled),
            listed = self.api.list_repos() => {
                listed.map_err(|e| SourceError::Remote(Box::new(e)))?
            }
        };
        tracing::debug!(count = hosted.len(), "listed hosted repositories");

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<Lookup> = JoinSet::new();
        for repo in hosted.iter().map(|h| self.normalize(h)) {
            let api = self.api.clone();
            let permits = permits.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = tokio::select! {
                    _ = cancel.cancelled() => return Lookup::Cancelled,
                    permit = permits.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return Lookup::Cancelled,
                    },
                };
                let stats = tokio::select! {
                    _ = cancel.cancelled() => return Lookup::Cancelled,
                    stats = api.repo_languages(&repo.owner, &repo.name.0) => stats,
                };
                match stats {
                    Ok(stats) => Lookup::Resolved(RemoteRepo {
                        language: primary_language(&stats),
                        ..repo
                    }),
                    Err(err) => {
                        tracing::warn!(
                            repo = %repo.full_name(),
                            error = %err,
                            "language lookup failed; repository left unclassified"
                        );
                        let issue =
                            RepoIssue::new(repo.full_name(), IssueKind::LanguageLookup, &err);
                        Lookup::Failed(repo, issue)
                    }
                }
            });
        }

        let mut listing = RemoteListing::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Lookup::Resolved(repo)) => listing.repos.push(repo),
                Ok(Lookup::Failed(repo, issue)) => {
                    listing.unresolved.push(repo);
                    listing.issues.push(issue);
                }
                Ok(Lookup::Cancelled) => return Err(SourceError::Cancelled),
                Err(err) => {
                    tracing::error!(error = %err, "language lookup task failed");
                    listing
                        .issues
                        .push(RepoIssue::new("<unknown>", IssueKind::Task, &err));
                }
            }
        }

        listing.repos.sort_by(|a, b| a.full_name().cmp(&b.full_name()));
        listing
            .unresolved
            .sort_by(|a, b| a.full_name().cmp(&b.full_name()));
        Ok(listing)
    }
}
