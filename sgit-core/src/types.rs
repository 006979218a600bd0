//! Domain types shared by the sources, the reconciler, and the CLI.
//!
//! Everything here is produced fresh on each run and discarded at the end of
//! it. Filesystem locations are always `PathBuf`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A repository name, without owner (e.g. `ripgrep`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoName(pub String);

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A language directory name (e.g. `go`, `rust`, `unknown`).
///
/// Remote languages are normalized to lower case; local languages are taken
/// verbatim from the parent directory so a `Go/` directory is reported as a
/// mismatch rather than silently accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(pub String);

impl Language {
    /// Marker used when a hosted repository reports no language statistics.
    pub const UNKNOWN: &'static str = "unknown";

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_owned())
    }

    /// Lower-cases and trims a language as reported by the hosting API.
    pub fn normalized(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::unknown();
        }
        Self(trimmed.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Language {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// Layout and identity
// ---------------------------------------------------------------------------

/// Directory convention under the base directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `<base>/<language>/<name>`; repositories are identified by name.
    #[default]
    Flat,
    /// `<base>/<owner>/<language>/<name>`; identified by `(owner, name)`.
    Owner,
}

impl Layout {
    /// Number of directory levels between the base directory and a leaf.
    pub fn depth(self) -> usize {
        match self {
            Layout::Flat => 2,
            Layout::Owner => 3,
        }
    }

    pub fn remote_key(self, repo: &RemoteRepo) -> IdentityKey {
        match self {
            Layout::Flat => IdentityKey::Name(repo.name.clone()),
            Layout::Owner => IdentityKey::Owned {
                owner: repo.owner.clone(),
                name: repo.name.clone(),
            },
        }
    }

    pub fn local_key(self, repo: &LocalRepo) -> IdentityKey {
        match self {
            Layout::Flat => IdentityKey::Name(repo.name.clone()),
            Layout::Owner => IdentityKey::Owned {
                owner: repo.owner.clone().unwrap_or_default(),
                name: repo.name.clone(),
            },
        }
    }

    /// Where a remote repository belongs on disk.
    pub fn repo_path(self, base: &Path, repo: &RemoteRepo) -> PathBuf {
        let root = match self {
            Layout::Flat => base.to_path_buf(),
            Layout::Owner => base.join(&repo.owner),
        };
        root.join(repo.language.as_str()).join(&repo.name.0)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Flat => write!(f, "flat"),
            Layout::Owner => write!(f, "owner"),
        }
    }
}

/// Key used to join the remote and local views of one repository.
///
/// `Located` is reserved for extra local copies that cannot take the join key
/// because another entry already holds it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdentityKey {
    Name(RepoName),
    Owned { owner: String, name: RepoName },
    Located(PathBuf),
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Name(name) => name.fmt(f),
            IdentityKey::Owned { owner, name } => write!(f, "{owner}/{name}"),
            IdentityKey::Located(path) => path.display().fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Collected repositories
// ---------------------------------------------------------------------------

/// A repository hosted on the remote account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepo {
    pub name: RepoName,
    pub owner: String,
    pub language: Language,
    pub clone_url: String,
    pub fork: bool,
}

impl RemoteRepo {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// A leaf directory found under the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepo {
    pub name: RepoName,
    /// Parent directory name.
    pub language: Language,
    /// Grandparent directory name in the owner-scoped layout.
    pub owner: Option<String>,
    pub path: PathBuf,
    pub has_vcs_metadata: bool,
    pub has_uncommitted_changes: bool,
    /// Upstream address of the working copy; empty when unknown.
    pub remote_address: String,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classification of one repository for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RepositoryState {
    UpToDate,
    UncommittedChanges,
    NotGitRepo,
    NoRemoteRepo,
    IncorrectLanguageParentDirectory,
    NotCloned,
    FailedToClone,
}

impl RepositoryState {
    pub const ALL: [RepositoryState; 7] = [
        RepositoryState::UpToDate,
        RepositoryState::UncommittedChanges,
        RepositoryState::NotGitRepo,
        RepositoryState::NoRemoteRepo,
        RepositoryState::IncorrectLanguageParentDirectory,
        RepositoryState::NotCloned,
        RepositoryState::FailedToClone,
    ];

    /// Canonical name, as accepted by `--states` and emitted in JSON.
    pub fn name(self) -> &'static str {
        match self {
            RepositoryState::UpToDate => "UpToDate",
            RepositoryState::UncommittedChanges => "UncommittedChanges",
            RepositoryState::NotGitRepo => "NotGitRepo",
            RepositoryState::NoRemoteRepo => "NoRemoteRepo",
            RepositoryState::IncorrectLanguageParentDirectory => {
                "IncorrectLanguageParentDirectory"
            }
            RepositoryState::NotCloned => "NotCloned",
            RepositoryState::FailedToClone => "FailedToClone",
        }
    }

    /// All canonical names, space separated; used in error messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for RepositoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One classified repository; the unit filtered and presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoStatePair {
    pub name: RepoName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub language: Language,
    pub path: PathBuf,
    /// Hosted clone address, or the working copy's upstream when local-only.
    pub url: String,
    pub fork: bool,
    /// Whether a hosted counterpart was matched.
    pub has_remote: bool,
    pub state: RepositoryState,
}

impl RepoStatePair {
    pub fn from_remote(repo: &RemoteRepo, path: PathBuf, state: RepositoryState) -> Self {
        Self {
            name: repo.name.clone(),
            owner: Some(repo.owner.clone()),
            language: repo.language.clone(),
            path,
            url: repo.clone_url.clone(),
            fork: repo.fork,
            has_remote: true,
            state,
        }
    }

    pub fn from_local(repo: &LocalRepo, state: RepositoryState) -> Self {
        Self {
            name: repo.name.clone(),
            owner: repo.owner.clone(),
            language: repo.language.clone(),
            path: repo.path.clone(),
            url: repo.remote_address.clone(),
            fork: false,
            has_remote: false,
            state,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(name: &str, owner: &str, lang: &str) -> RemoteRepo {
        RemoteRepo {
            name: RepoName::from(name),
            owner: owner.to_string(),
            language: Language::from(lang),
            clone_url: format!("git@github.com:{owner}/{name}.git"),
            fork: false,
        }
    }

    #[test]
    fn language_normalization() {
        assert_eq!(Language::normalized("Go").as_str(), "go");
        assert_eq!(Language::normalized("  TypeScript ").as_str(), "typescript");
        assert_eq!(Language::normalized(""), Language::unknown());
    }

    #[test]
    fn flat_layout_paths_and_keys() {
        let repo = remote("foo", "octo", "go");
        let path = Layout::Flat.repo_path(Path::new("/code"), &repo);
        assert_eq!(path, PathBuf::from("/code/go/foo"));
        assert_eq!(
            Layout::Flat.remote_key(&repo),
            IdentityKey::Name(RepoName::from("foo"))
        );
    }

    #[test]
    fn owner_layout_paths_and_keys() {
        let repo = remote("foo", "octo", "go");
        let path = Layout::Owner.repo_path(Path::new("/code"), &repo);
        assert_eq!(path, PathBuf::from("/code/octo/go/foo"));
        assert_eq!(Layout::Owner.remote_key(&repo).to_string(), "octo/foo");
    }

    #[test]
    fn state_names_are_canonical() {
        assert_eq!(RepositoryState::NotCloned.to_string(), "NotCloned");
        assert!(RepositoryState::valid_names().contains("IncorrectLanguageParentDirectory"));
        assert_eq!(RepositoryState::ALL.len(), 7);
    }

    #[test]
    fn state_serializes_as_canonical_name() {
        let json = serde_json::to_string(&RepositoryState::FailedToClone).expect("serialize");
        assert_eq!(json, "\"FailedToClone\"");
    }
}
