//! # sgit-local
//!
//! Everything that touches the local disk: the version-control capability,
//! the base-directory scan, clone remediation, and directory removal.

pub mod error;
pub mod remediate;
pub mod scan;
pub mod scanner;
pub mod vcs;
pub mod workspace;

pub use error::VcsError;
pub use remediate::{staging_path, CloneRemediator};
pub use scan::{list_leaf_dirs, LeafDir, LeafScan};
pub use scanner::{LocalScanner, VCS_METADATA_DIR};
pub use vcs::{GitCli, Vcs};
pub use workspace::remove_repo_dir;
