//! Error types for sgit-sync.

use std::time::Duration;

use thiserror::Error;

use sgit_core::SourceError;
use sgit_github::ApiError;

/// Errors that end a run. Per-repository failures are never reported here;
/// they travel in [`crate::Reconciliation::issues`].
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A collection failed as a whole (remote listing, local scan).
    #[error(transparent)]
    Source(SourceError),

    /// A direct hosting API call failed (create, lookup of an explicit target).
    #[error("hosting API error: {0}")]
    Api(#[from] ApiError),

    #[error("invalid repository \"{spec}\": {reason}")]
    InvalidRepoSpec { spec: String, reason: &'static str },

    #[error("run cancelled")]
    Cancelled,

    #[error("run timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl From<SourceError> for ReconcileError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Cancelled => ReconcileError::Cancelled,
            other => ReconcileError::Source(other),
        }
    }
}
