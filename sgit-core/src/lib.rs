//! sgit core library: domain types, filter, configuration, errors, and the
//! capability traits the reconciler is built on.
//!
//! - [`types`]: repositories, identity keys, [`RepositoryState`]
//! - [`filter`]: [`Filter`] and `--states` resolution
//! - [`config`]: [`Config`] loading
//! - [`error`]: [`ConfigError`], [`SourceError`], [`IssueList`]
//! - [`source`]: [`RemoteSource`], [`LocalSource`], [`Remediator`]

pub mod config;
pub mod error;
pub mod filter;
pub mod source;
pub mod types;

pub use config::Config;
pub use error::{BoxError, ConfigError, IssueKind, IssueList, RepoIssue, SourceError};
pub use filter::Filter;
pub use source::{LocalListing, LocalSource, RemoteListing, RemoteSource, Remediator};
pub use types::{
    IdentityKey, Language, Layout, LocalRepo, RemoteRepo, RepoName, RepoStatePair,
    RepositoryState,
};
