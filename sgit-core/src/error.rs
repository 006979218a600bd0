//! Error types for sgit-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed error used at capability boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration and filter errors. Reported before any collection starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required settings are absent from both file and environment.
    #[error("missing required configuration: {}", names.join(", "))]
    MissingVar { names: Vec<&'static str> },

    #[error("invalid --states value \"{token}\"; valid states: {valid}")]
    InvalidState { token: String, valid: String },

    #[error("ambiguous --states value \"{token}\" matches {}; valid states: {valid}", matches.join(", "))]
    AmbiguousState {
        token: String,
        matches: Vec<&'static str>,
        valid: String,
    },

    #[error("invalid value for {key}: \"{value}\" ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Failures of a whole collection or remediation step.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The primary remote listing failed (authentication, connection, status).
    #[error("remote listing failed: {0}")]
    Remote(#[source] BoxError),

    #[error("local scan of {path} failed: {source}")]
    Local {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("clone into {path} failed: {source}")]
    Clone {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("operation cancelled")]
    Cancelled,
}

/// Which step produced an item-level issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    LanguageLookup,
    Probe,
    Clone,
    Delete,
    Task,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::LanguageLookup => write!(f, "language lookup"),
            IssueKind::Probe => write!(f, "probe"),
            IssueKind::Clone => write!(f, "clone"),
            IssueKind::Delete => write!(f, "delete"),
            IssueKind::Task => write!(f, "task"),
        }
    }
}

/// A failure confined to a single repository. Never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failed for {repo}: {message}")]
pub struct RepoIssue {
    pub repo: String,
    pub kind: IssueKind,
    pub message: String,
}

impl RepoIssue {
    pub fn new(repo: impl Into<String>, kind: IssueKind, err: impl fmt::Display) -> Self {
        Self {
            repo: repo.into(),
            kind,
            message: err.to_string(),
        }
    }
}

/// Item-level issues of one run, joined into a single error value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueList(pub Vec<RepoIssue>);

impl IssueList {
    pub fn push(&mut self, issue: RepoIssue) {
        self.0.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = RepoIssue>) {
        self.0.extend(issues);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RepoIssue> {
        self.0.iter()
    }

    /// `Ok(())` when empty, otherwise the list itself as the joined error.
    pub fn into_result(self) -> Result<(), IssueList> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for IssueList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.0 {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for IssueList {}

impl From<Vec<RepoIssue>> for IssueList {
    fn from(issues: Vec<RepoIssue>) -> Self {
        Self(issues)
    }
}
