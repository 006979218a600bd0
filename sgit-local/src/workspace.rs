//! Working-copy housekeeping under the base directory.

use std::path::Path;

use crate::error::{io_err, VcsError};

/// Remove the directory at `path`, which must lie strictly inside `base`.
///
/// Returns `false` when nothing was there. Both paths are canonicalized
/// first, so `..` segments and symlinks cannot escape the base directory.
pub fn remove_repo_dir(base: &Path, path: &Path) -> Result<bool, VcsError> {
    if !path.exists() {
        return Ok(false);
    }
    let base_real = base.canonicalize().map_err(|e| io_err(base, e))?;
    let path_real = path.canonicalize().map_err(|e| io_err(path, e))?;

    if path_real == base_real || !path_real.starts_with(&base_real) {
        return Err(VcsError::OutsideBase {
            path: path.to_path_buf(),
            base: base.to_path_buf(),
        });
    }

    std::fs::remove_dir_all(&path_real).map_err(|e| io_err(path, e))?;
    tracing::info!(path = %path.display(), "removed local repository");
    Ok(true)
}
