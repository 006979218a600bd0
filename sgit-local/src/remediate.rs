//! Clone remediation with a staging directory.
//!
//! A clone first lands in `<parent>/.<name>.sgit-partial` and is renamed onto
//! the target only after the VCS reports success. The scan skips hidden
//! entries, so a half-finished clone is never classified as a working copy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use sgit_core::{RemoteRepo, Remediator, SourceError};

use crate::error::{io_err, VcsError};
use crate::vcs::Vcs;

const STAGING_SUFFIX: &str = ".sgit-partial";

/// Staging location for a clone into `target`.
pub fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staged = format!(".{name}{STAGING_SUFFIX}");
    match target.parent() {
        Some(parent) => parent.join(staged),
        None => PathBuf::from(staged),
    }
}

/// Clones missing repositories through a [`Vcs`].
#[derive(Clone)]
pub struct CloneRemediator {
    vcs: Arc<dyn Vcs>,
}

impl CloneRemediator {
    pub fn new(vcs: Arc<dyn Vcs>) -> Self {
        Self { vcs }
    }

    /// Clone `url` so that a complete working copy exists at `target`.
    pub async fn clone_url(&self, url: &str, target: &Path) -> Result<(), VcsError> {
        if tokio::fs::try_exists(target)
            .await
            .map_err(|e| io_err(target, e))?
        {
            return Err(VcsError::TargetExists {
                path: target.to_path_buf(),
            });
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err(parent, e))?;
        }

        let staging = staging_path(target);
        remove_if_present(&staging).await?;

        if let Err(err) = self.vcs.clone_to(url, &staging).await {
            if let Err(cleanup) = remove_if_present(&staging).await {
                tracing::warn!(
                    path = %staging.display(),
                    error = %cleanup,
                    "failed to remove clone staging directory"
                );
            }
            return Err(err);
        }

        if let Err(err) = tokio::fs::rename(&staging, target).await {
            if let Err(cleanup) = remove_if_present(&staging).await {
                tracing::warn!(
                    path = %staging.display(),
                    error = %cleanup,
                    "failed to remove clone staging directory"
                );
            }
            return Err(io_err(target, err));
        }
        tracing::info!(url, path = %target.display(), "cloned");
        Ok(())
    }
}

async fn remove_if_present(path: &Path) -> Result<(), VcsError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(path, e)),
    }
}

#[async_trait]
impl Remediator for CloneRemediator {
    async fn clone_repo(&self, repo: &RemoteRepo, target: &Path) -> Result<(), SourceError> {
        self.clone_url(&repo.clone_url, target)
            .await
            .map_err(|source| SourceError::Clone {
                path: target.to_path_buf(),
                source: Box::new(source),
            })
    }
}
