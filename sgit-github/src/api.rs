//! Hosting API client.
//!
//! [`HostingApi`] is the seam: [`GithubApi`] talks to the REST API with a
//! bearer token, tests use in-memory implementations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use sgit_core::{Config, Language, RepoName};

use crate::error::ApiError;

const USER_AGENT: &str = concat!("sgit/", env!("CARGO_PKG_VERSION"));

/// Repositories per listing request. Further pages are not requested.
const PER_PAGE: u32 = 100;

/// Language name to byte count, as reported by the languages endpoint.
pub type LanguageStats = BTreeMap<String, u64>;

/// A repository as returned by the hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostedRepo {
    #[serde(default)]
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub ssh_url: String,
    #[serde(default)]
    pub clone_url: String,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub owner: Option<HostedOwner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostedOwner {
    pub login: String,
}

impl HostedRepo {
    /// Repository name; falls back to the last segment of `full_name`.
    pub fn repo_name(&self) -> RepoName {
        if !self.name.is_empty() {
            return RepoName::from(self.name.as_str());
        }
        let last = self.full_name.rsplit('/').next().unwrap_or_default();
        RepoName::from(last)
    }

    /// Owner login; falls back to the first segment of `full_name`, then to
    /// `default_owner`.
    pub fn owner_login(&self, default_owner: &str) -> String {
        if let Some(owner) = &self.owner {
            return owner.login.clone();
        }
        match self.full_name.split_once('/') {
            Some((owner, _)) if !owner.is_empty() => owner.to_owned(),
            _ => default_owner.to_owned(),
        }
    }

    /// Address used for cloning: ssh when present, https otherwise.
    pub fn preferred_clone_url(&self) -> String {
        if self.ssh_url.is_empty() {
            self.clone_url.clone()
        } else {
            self.ssh_url.clone()
        }
    }
}

/// Pick the language with the highest count.
///
/// Ties go to the alphabetically first language; no statistics at all yields
/// [`Language::UNKNOWN`].
pub fn primary_language(stats: &LanguageStats) -> Language {
    let mut best: Option<(&String, u64)> = None;
    for (name, count) in stats {
        match best {
            Some((_, top)) if *count <= top => {}
            _ => best = Some((name, *count)),
        }
    }
    match best {
        Some((name, _)) => Language::normalized(name),
        None => Language::unknown(),
    }
}

/// Operations the tool needs from the hosting service.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Repositories owned by the authenticated account.
    async fn list_repos(&self) -> Result<Vec<HostedRepo>, ApiError>;

    async fn get_repo(&self, owner: &str, name: &str) -> Result<HostedRepo, ApiError>;

    async fn repo_languages(&self, owner: &str, name: &str) -> Result<LanguageStats, ApiError>;

    async fn create_repo(&self, name: &str, private: bool) -> Result<HostedRepo, ApiError>;

    async fn delete_repo(&self, owner: &str, name: &str) -> Result<(), ApiError>;
}

/// REST client for the GitHub API.
#[derive(Debug, Clone)]
pub struct GithubApi {
    http: HttpClient,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    private: bool,
}

impl GithubApi {
    /// Build a client with the configured base URL, token and per-request
    /// timeout.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| ApiError::Http {
                url: config.api_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        (url, builder)
    }

    async fn send_raw(
        &self,
        method: Method,
        url: &str,
        builder: RequestBuilder,
    ) -> Result<String, ApiError> {
        tracing::debug!(%method, url, "hosting api request");
        let response = builder.send().await.map_err(|source| ApiError::Http {
            url: url.to_owned(),
            source,
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Http {
            url: url.to_owned(),
            source,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                method: method.to_string(),
                url: url.to_owned(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send_raw(method, url, builder).await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_owned(),
            source,
        })
    }
}

#[async_trait]
impl HostingApi for GithubApi {
    async fn list_repos(&self) -> Result<Vec<HostedRepo>, ApiError> {
        let path = format!("/user/repos?affiliation=owner&per_page={PER_PAGE}");
        let (url, builder) = self.request(Method::GET, &path);
        self.send(Method::GET, &url, builder).await
    }

    async fn get_repo(&self, owner: &str, name: &str) -> Result<HostedRepo, ApiError> {
        let (url, builder) = self.request(Method::GET, &format!("/repos/{owner}/{name}"));
        self.send(Method::GET, &url, builder).await
    }

    async fn repo_languages(&self, owner: &str, name: &str) -> Result<LanguageStats, ApiError> {
        let path = format!("/repos/{owner}/{name}/languages");
        let (url, builder) = self.request(Method::GET, &path);
        self.send(Method::GET, &url, builder).await
    }

    async fn create_repo(&self, name: &str, private: bool) -> Result<HostedRepo, ApiError> {
        let (url, builder) = self.request(Method::POST, "/user/repos");
        let builder = builder.json(&CreateRepoRequest { name, private });
        self.send(Method::POST, &url, builder).await
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> Result<(), ApiError> {
        let (url, builder) = self.request(Method::DELETE, &format!("/repos/{owner}/{name}"));
        self.send_raw(Method::DELETE, &url, builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(pairs: &[(&str, u64)]) -> LanguageStats {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn primary_language_is_highest_count() {
        let s = stats(&[("Go", 120), ("Shell", 30), ("Makefile", 4)]);
        assert_eq!(primary_language(&s).as_str(), "go");
    }

    #[test]
    fn primary_language_ties_break_alphabetically() {
        let s = stats(&[("Rust", 50), ("C", 50)]);
        assert_eq!(primary_language(&s).as_str(), "c");
    }

    #[test]
    fn no_statistics_is_unknown() {
        assert_eq!(primary_language(&LanguageStats::new()), Language::unknown());
    }

    #[test]
    fn hosted_repo_decodes_api_payload() {
        let payload = r#"[{
            "id": 1,
            "name": "sgit",
            "full_name": "octo/sgit",
            "ssh_url": "git@github.com:octo/sgit.git",
            "clone_url": "https://github.com/octo/sgit.git",
            "fork": true,
            "private": false,
            "owner": { "login": "octo", "id": 7 }
        }]"#;
        let repos: Vec<HostedRepo> = serde_json::from_str(payload).expect("decode");
        assert_eq!(repos.len(), 1);
        let repo = &repos[0];
        assert_eq!(repo.repo_name(), RepoName::from("sgit"));
        assert_eq!(repo.owner_login("fallback"), "octo");
        assert!(repo.fork);
        assert_eq!(repo.preferred_clone_url(), "git@github.com:octo/sgit.git");
    }

    #[test]
    fn hosted_repo_falls_back_to_full_name() {
        let repo = HostedRepo {
            name: String::new(),
            full_name: "octo/tools".to_string(),
            ssh_url: String::new(),
            clone_url: "https://github.com/octo/tools.git".to_string(),
            fork: false,
            private: false,
            owner: None,
        };
        assert_eq!(repo.repo_name().0, "tools");
        assert_eq!(repo.owner_login("fallback"), "octo");
        assert_eq!(repo.preferred_clone_url(), "https://github.com/octo/tools.git");
    }

    #[test]
    fn status_error_carries_status_and_body() {
        let err = ApiError::Status {
            method: "GET".to_string(),
            url: "https://api.github.com/user/repos".to_string(),
            status: 401,
            body: "{\"message\":\"Bad credentials\"}".to_string(),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("Bad credentials"));
    }
}
