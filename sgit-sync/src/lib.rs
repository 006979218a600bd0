//! # sgit-sync
//!
//! The reconciler and the operations built on it.
//!
//! [`Pipeline`] is the entrypoint for `ls`, `sync`, `clone`, `create` and
//! `delete`; [`Reconciler`] holds the join and classification logic and can
//! be driven directly with any [`sgit_core::RemoteSource`] and
//! [`sgit_core::LocalSource`].

pub mod clone;
pub mod create;
pub mod delete;
pub mod error;
pub mod pipeline;
pub mod reconciler;

pub use clone::{clone_all, CloneJob, CloneOutcome, CloneReport, CloneStatus, RepoSpec};
pub use create::{CreateOutcome, CreateRequest};
pub use delete::{DeleteOutcome, DeleteTarget};
pub use error::ReconcileError;
pub use pipeline::Pipeline;
pub use reconciler::{classify, group_by_language, Classified, Reconciler, Reconciliation};
