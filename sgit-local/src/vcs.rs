//! Version-control capability.
//!
//! [`Vcs`] exposes typed operations against a working-copy root. [`GitCli`]
//! implements them by running the `git` binary; child processes are killed
//! when the calling future is dropped, so cancelling a run stops them.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::VcsError;

/// Typed version-control operations.
#[async_trait]
pub trait Vcs: Send + Sync {
    async fn has_uncommitted_changes(&self, path: &Path) -> Result<bool, VcsError>;

    /// Address of the first configured remote; empty when there is none.
    async fn remote_address(&self, path: &Path) -> Result<String, VcsError>;

    /// Clone `url` into `target`, which must not exist yet.
    async fn clone_to(&self, url: &str, target: &Path) -> Result<(), VcsError>;

    async fn pull(&self, path: &Path) -> Result<(), VcsError>;

    /// Commit everything as work in progress and push. No-op when clean.
    async fn push(&self, path: &Path) -> Result<(), VcsError>;

    async fn stash(&self, path: &Path) -> Result<(), VcsError>;

    /// Discard all local modifications.
    async fn reset(&self, path: &Path) -> Result<(), VcsError>;

    async fn has_merge_conflicts(&self, path: &Path) -> Result<bool, VcsError>;
}

/// [`Vcs`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git with `args`, in `dir` when given; returns stdout.
    async fn run(&self, dir: Option<&Path>, args: &[&str]) -> Result<String, VcsError> {
        let command = format!("git {}", args.join(" "));
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        tracing::trace!(command = %command, dir = ?dir, "running git");
        let output = cmd.output().await.map_err(|source| VcsError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(VcsError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn has_uncommitted_changes(&self, path: &Path) -> Result<bool, VcsError> {
        let status = self.run(Some(path), &["status", "--porcelain"]).await?;
        Ok(!status.trim().is_empty())
    }

    async fn remote_address(&self, path: &Path) -> Result<String, VcsError> {
        let remotes = self.run(Some(path), &["remote"]).await?;
        let Some(first) = remotes.lines().map(str::trim).find(|l| !l.is_empty()) else {
            return Ok(String::new());
        };
        let url = self.run(Some(path), &["remote", "get-url", first]).await?;
        Ok(url.trim().to_owned())
    }

    async fn clone_to(&self, url: &str, target: &Path) -> Result<(), VcsError> {
        let target = target.to_string_lossy();
        self.run(None, &["clone", "--quiet", "--", url, target.as_ref()])
            .await?;
        Ok(())
    }

    async fn pull(&self, path: &Path) -> Result<(), VcsError> {
        self.run(Some(path), &["fetch", "--quiet"]).await?;
        self.run(Some(path), &["pull", "--quiet"]).await?;
        Ok(())
    }

    async fn push(&self, path: &Path) -> Result<(), VcsError> {
        if !self.has_uncommitted_changes(path).await? {
            return Ok(());
        }
        self.run(Some(path), &["add", "--all"]).await?;
        self.run(Some(path), &["commit", "--quiet", "-m", "work in progress"])
            .await?;
        self.run(Some(path), &["push", "--quiet"]).await?;
        Ok(())
    }

    async fn stash(&self, path: &Path) -> Result<(), VcsError> {
        self.run(Some(path), &["add", "--all"]).await?;
        self.run(Some(path), &["stash", "--quiet"]).await?;
        Ok(())
    }

    async fn reset(&self, path: &Path) -> Result<(), VcsError> {
        self.run(Some(path), &["add", "--all"]).await?;
        self.run(Some(path), &["reset", "--hard", "--quiet"]).await?;
        Ok(())
    }

    async fn has_merge_conflicts(&self, path: &Path) -> Result<bool, VcsError> {
        let unmerged = self
            .run(Some(path), &["diff", "--name-only", "--diff-filter=U"])
            .await?;
        Ok(!unmerged.trim().is_empty())
    }
}
