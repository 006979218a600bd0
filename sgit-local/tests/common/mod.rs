use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use sgit_local::{Vcs, VcsError};

fn failed(command: &str) -> VcsError {
    VcsError::Failed {
        command: command.to_string(),
        status: "exit status: 128".to_string(),
        stderr: "fatal: simulated".to_string(),
    }
}

/// In-memory [`Vcs`]: answers from tables keyed by path.
#[derive(Default)]
pub struct FakeVcs {
    pub dirty: HashSet<PathBuf>,
    pub remotes: HashMap<PathBuf, String>,
    pub broken_status: HashSet<PathBuf>,
    pub broken_remote: HashSet<PathBuf>,
    pub failing_urls: HashSet<String>,
    pub cloned: Mutex<Vec<(String, PathBuf)>>,
}

#[async_trait]
impl Vcs for FakeVcs {
    async fn has_uncommitted_changes(&self, path: &Path) -> Result<bool, VcsError> {
        if self.broken_status.contains(path) {
            return Err(failed("git status --porcelain"));
        }
        Ok(self.dirty.contains(path))
    }

    async fn remote_address(&self, path: &Path) -> Result<String, VcsError> {
        if self.broken_remote.contains(path) {
            return Err(failed("git remote"));
        }
        Ok(self.remotes.get(path).cloned().unwrap_or_default())
    }

    async fn clone_to(&self, url: &str, target: &Path) -> Result<(), VcsError> {
        self.cloned
            .lock()
            .unwrap()
            .push((url.to_string(), target.to_path_buf()));
        std::fs::create_dir_all(target.join(".git")).unwrap();
        if self.failing_urls.contains(url) {
            return Err(failed("git clone"));
        }
        std::fs::write(target.join("README.md"), url).unwrap();
        Ok(())
    }

    async fn pull(&self, _path: &Path) -> Result<(), VcsError> {
        Ok(())
    }

    async fn push(&self, _path: &Path) -> Result<(), VcsError> {
        Ok(())
    }

    async fn stash(&self, _path: &Path) -> Result<(), VcsError> {
        Ok(())
    }

    async fn reset(&self, _path: &Path) -> Result<(), VcsError> {
        Ok(())
    }

    async fn has_merge_conflicts(&self, _path: &Path) -> Result<bool, VcsError> {
        Ok(false)
    }
}
