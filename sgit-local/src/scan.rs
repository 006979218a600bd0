//! Leaf-directory discovery under the base directory.
//!
//! # Layouts
//!
//! ```text
//! flat:   <base>/<language>/<name>
//! owner:  <base>/<owner>/<language>/<name>
//! ```
//!
//! Only directories at exactly the layout depth are leaves. Entries whose
//! name starts with `.` are skipped at every level; that includes clone
//! staging directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sgit_core::{IssueKind, Language, Layout, RepoIssue, RepoName};

/// A directory at leaf depth, with its identity derived from path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafDir {
    pub path: PathBuf,
    pub name: RepoName,
    pub language: Language,
    pub owner: Option<String>,
}

/// Leaves found by a walk, plus the directories that could not be read.
#[derive(Debug, Default)]
pub struct LeafScan {
    pub leaves: Vec<LeafDir>,
    pub issues: Vec<RepoIssue>,
}

/// List every leaf directory, sorted by path.
///
/// A missing base directory yields an empty list. Only an unreadable base is
/// an error; an unreadable directory below it is skipped and reported as a
/// [`IssueKind::Probe`] issue. Symlinks to directories are followed.
pub fn list_leaf_dirs(base: &Path, layout: Layout) -> io::Result<LeafScan> {
    if !base.exists() {
        tracing::debug!(base = %base.display(), "base directory does not exist yet");
        return Ok(LeafScan::default());
    }

    let mut scan = LeafScan::default();
    let mut frontier = vec![base.to_path_buf()];
    for _ in 0..layout.depth() {
        let mut next = Vec::new();
        for dir in &frontier {
            match child_dirs(dir) {
                Ok(children) => next.extend(children),
                Err(err) if dir == base => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %err,
                        "skipping unreadable directory"
                    );
                    scan.issues
                        .push(RepoIssue::new(dir.display().to_string(), IssueKind::Probe, &err));
                }
            }
        }
        frontier = next;
    }

    scan.leaves = frontier
        .into_iter()
        .filter_map(|path| leaf_from_path(&path, layout))
        .collect();
    scan.leaves.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(scan)
}

fn child_dirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.path())
        // `metadata` follows symlinks, so a linked working copy counts.
        .filter(|p| fs::metadata(p).map(|m| m.is_dir()).unwrap_or(false))
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn leaf_from_path(path: &Path, layout: Layout) -> Option<LeafDir> {
    let name = segment(path)?;
    let language_dir = path.parent()?;
    let language = segment(language_dir)?;
    let owner = match layout {
        Layout::Flat => None,
        Layout::Owner => Some(segment(language_dir.parent()?)?),
    };
    Some(LeafDir {
        path: path.to_path_buf(),
        name: RepoName::from(name),
        language: Language::from(language),
        owner,
    })
}

fn segment(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
