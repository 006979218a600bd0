//! Error types for sgit-local.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from version-control operations and working-copy housekeeping.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited non-zero.
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} already exists")]
    TargetExists { path: PathBuf },

    #[error("refusing to touch {path}: outside base directory {base}")]
    OutsideBase { path: PathBuf, base: PathBuf },
}

/// Convenience constructor for [`VcsError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> VcsError {
    VcsError::Io {
        path: path.into(),
        source,
    }
}
