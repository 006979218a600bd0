//! Creating a hosted repository and cloning it into place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use sgit_core::{Language, Layout, RemoteRepo, Remediator};
use sgit_github::HostingApi;

use crate::clone::CloneStatus;
use crate::error::ReconcileError;

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub name: String,
    pub private: bool,
    /// Directory language; `unknown` when not given.
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOutcome {
    pub repo: String,
    pub url: String,
    pub target: PathBuf,
    pub clone: CloneStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create the hosted repository, then clone it unless the target exists.
///
/// A failed creation is an error. A failed clone after a successful creation
/// is reported in the outcome; the hosted repository is kept.
pub async fn create_repo(
    api: &dyn HostingApi,
    remediator: Arc<dyn Remediator>,
    account: &str,
    base: &Path,
    layout: Layout,
    request: &CreateRequest,
) -> Result<CreateOutcome, ReconcileError> {
    let hosted = api.create_repo(&request.name, request.private).await?;
    let repo = RemoteRepo {
        name: hosted.repo_name(),
        owner: hosted.owner_login(account),
        language: request
            .language
            .as_deref()
            .map(Language::normalized)
            .unwrap_or_else(Language::unknown),
        clone_url: hosted.preferred_clone_url(),
        fork: hosted.fork,
    };
    tracing::info!(repo = %repo.full_name(), private = request.private, "created hosted repository");

    let target = layout.repo_path(base, &repo);
    let mut outcome = CreateOutcome {
        repo: repo.full_name(),
        url: repo.clone_url.clone(),
        target: target.clone(),
        clone: CloneStatus::AlreadyPresent,
        error: None,
    };
    if target.exists() {
        return Ok(outcome);
    }

    match remediator.clone_repo(&repo, &target).await {
        Ok(()) => outcome.clone = CloneStatus::Cloned,
        Err(err) => {
            tracing::error!(repo = %repo.full_name(), error = %err, "clone of new repository failed");
            outcome.clone = CloneStatus::Failed;
            outcome.error = Some(err.to_string());
        }
    }
    Ok(outcome)
}
