//! # sgit-github
//!
//! Hosting API client and the remote source built on it.
//!
//! [`GithubApi`] implements [`HostingApi`] over the REST API;
//! [`GithubSource`] turns a listing plus per-repository language statistics
//! into [`sgit_core::RemoteRepo`] values.

pub mod api;
pub mod error;
pub mod source;

pub use api::{primary_language, GithubApi, HostedOwner, HostedRepo, HostingApi, LanguageStats};
pub use error::ApiError;
pub use source::GithubSource;
