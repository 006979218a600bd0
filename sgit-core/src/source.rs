//! Capability interfaces consumed by the reconciler.
//!
//! Implementations live in `sgit-github` (remote) and `sgit-local` (local scan
//! and clone remediation); tests substitute in-memory fakes.

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{RepoIssue, SourceError};
use crate::types::{LocalRepo, RemoteRepo};

/// Output of a remote collection.
#[derive(Debug, Clone, Default)]
pub struct RemoteListing {
    /// Repositories whose declared language is known.
    pub repos: Vec<RemoteRepo>,
    /// Repositories whose language lookup failed. Their intended path cannot
    /// be computed, so they take no part in classification.
    pub unresolved: Vec<RemoteRepo>,
    pub issues: Vec<RepoIssue>,
}

/// Output of a local scan.
#[derive(Debug, Clone, Default)]
pub struct LocalListing {
    pub repos: Vec<LocalRepo>,
    /// Probe failures. The affected fields already hold their safe defaults.
    pub issues: Vec<RepoIssue>,
}

/// Lists repositories hosted on the configured account.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fails only when the primary listing fails or `cancel` fires.
    async fn list_repos(&self, cancel: &CancellationToken) -> Result<RemoteListing, SourceError>;
}

/// Lists leaf directories under the base directory with their VCS status.
#[async_trait]
pub trait LocalSource: Send + Sync {
    async fn list_repos(&self, cancel: &CancellationToken) -> Result<LocalListing, SourceError>;
}

/// Brings a missing repository onto disk.
#[async_trait]
pub trait Remediator: Send + Sync {
    /// Clone `repo` so that a complete working copy exists at `target`.
    ///
    /// On failure nothing may remain at `target`.
    async fn clone_repo(&self, repo: &RemoteRepo, target: &Path) -> Result<(), SourceError>;
}
