//! Run configuration.
//!
//! # Sources
//!
//! Layered in increasing precedence:
//!
//! ```text
//! built-in defaults
//! ~/.sgit/config.yaml        (optional)
//! environment variables      (GITHUB_TOKEN, GITHUB_USERNAME, CODE_HOME_DIR, SGIT_*)
//! ```
//!
//! # API pattern
//!
//! - `Config::load_at(home, lookup)`: explicit home and environment lookup;
//!   used in tests with `TempDir` and a map.
//! - `Config::load()`: derives home from `dirs::home_dir()` and reads the
//!   process environment, delegates to `load_at`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::Layout;

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const ACCOUNT_VAR: &str = "GITHUB_USERNAME";
pub const BASE_DIR_VAR: &str = "CODE_HOME_DIR";
pub const API_URL_VAR: &str = "SGIT_API_URL";
pub const CONCURRENCY_VAR: &str = "SGIT_CONCURRENCY";
pub const REQUEST_TIMEOUT_VAR: &str = "SGIT_REQUEST_TIMEOUT_SECS";
pub const LAYOUT_VAR: &str = "SGIT_LAYOUT";

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Everything a run needs, passed explicitly into every constructor.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub token: String,
    pub account: String,
    pub base_dir: PathBuf,
    pub api_url: String,
    /// Per-request bound for hosting API calls.
    pub request_timeout: Duration,
    /// Bound for collecting both sources.
    pub run_timeout: Duration,
    /// Cap on simultaneous network, probe and clone operations per stage.
    pub concurrency: usize,
    pub layout: Layout,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("account", &self.account)
            .field("base_dir", &self.base_dir)
            .field("api_url", &self.api_url)
            .field("request_timeout", &self.request_timeout)
            .field("run_timeout", &self.run_timeout)
            .field("concurrency", &self.concurrency)
            .field("layout", &self.layout)
            .finish()
    }
}

/// On-disk shape of `~/.sgit/config.yaml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    token: Option<String>,
    account: Option<String>,
    base_dir: Option<PathBuf>,
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
    run_timeout_secs: Option<u64>,
    concurrency: Option<usize>,
    layout: Option<Layout>,
}

/// `<home>/.sgit/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".sgit").join("config.yaml")
}

impl Config {
    /// Load configuration with an explicit home directory and env lookup.
    pub fn load_at<F>(home: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = load_file(&config_path_at(home))?;
        let env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let token = env(TOKEN_VAR).or(file.token);
        let account = env(ACCOUNT_VAR).or(file.account);
        let base_dir = env(BASE_DIR_VAR).map(PathBuf::from).or(file.base_dir);

        let mut missing = Vec::new();
        if token.is_none() {
            missing.push(TOKEN_VAR);
        }
        if account.is_none() {
            missing.push(ACCOUNT_VAR);
        }
        if base_dir.is_none() {
            missing.push(BASE_DIR_VAR);
        }
        let (Some(token), Some(account), Some(base_dir)) = (token, account, base_dir) else {
            return Err(ConfigError::MissingVar { names: missing });
        };

        let concurrency = match env(CONCURRENCY_VAR) {
            Some(raw) => parse_number(CONCURRENCY_VAR, &raw)?,
            None => file.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
        };
        if concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: CONCURRENCY_VAR,
                value: concurrency.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let request_timeout = match env(REQUEST_TIMEOUT_VAR) {
            Some(raw) => {
                nonzero_secs(REQUEST_TIMEOUT_VAR, parse_number(REQUEST_TIMEOUT_VAR, &raw)?)?
            }
            None => match file.request_timeout_secs {
                Some(secs) => nonzero_secs("request_timeout_secs", secs)?,
                None => DEFAULT_REQUEST_TIMEOUT,
            },
        };
        let run_timeout = match file.run_timeout_secs {
            Some(secs) => nonzero_secs("run_timeout_secs", secs)?,
            None => DEFAULT_RUN_TIMEOUT,
        };

        let layout = match env(LAYOUT_VAR) {
            Some(raw) => parse_layout(&raw)?,
            None => file.layout.unwrap_or_default(),
        };

        Ok(Self {
            token,
            account,
            base_dir: expand_home(home, base_dir),
            api_url: env(API_URL_VAR)
                .or(file.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            request_timeout,
            run_timeout,
            concurrency,
            layout,
        })
    }

    /// `load_at` convenience wrapper over the real home and process env.
    pub fn load() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Self::load_at(&home, |name| std::env::var(name).ok())
    }
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    tracing::debug!(path = %path.display(), "loading config file");
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.to_owned(),
            reason: e.to_string(),
        })
}

fn nonzero_secs(key: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: secs.to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_layout(raw: &str) -> Result<Layout, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "flat" => Ok(Layout::Flat),
        "owner" => Ok(Layout::Owner),
        _ => Err(ConfigError::InvalidValue {
            key: LAYOUT_VAR,
            value: raw.to_owned(),
            reason: "expected: flat, owner".to_string(),
        }),
    }
}

/// `~/code` → `<home>/code`.
fn expand_home(home: &Path, path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path,
    }
}
