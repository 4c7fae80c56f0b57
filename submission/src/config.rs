//! Transport configuration
//!
//! Endpoints and credentials come from the environment. A `.env` file in
//! the current directory or its parents is loaded first; variables already
//! present in the process environment win.
//!
//! ## Variables
//! - `TRUST_GAME_DATA_API_URL`, `TRUST_GAME_EXPERIMENT_ID`: direct data API
//! - `TRUST_GAME_PROXY_URLS`: comma-separated proxy endpoints, tried in order
//! - `TRUST_GAME_GITHUB_API`: API base, defaults to `https://api.github.com`
//! - `TRUST_GAME_GITHUB_REPO`, `TRUST_GAME_GITHUB_TOKEN`: dispatch and issue target
//!
//! Any strategy whose variables are absent stays in the chain and fails
//! fast with `NotConfigured`.

use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use shared::{component_warn, Component};

use crate::error::{SubmissionError, SubmissionResult};

pub const DATA_API_URL_VAR: &str = "TRUST_GAME_DATA_API_URL";
pub const EXPERIMENT_ID_VAR: &str = "TRUST_GAME_EXPERIMENT_ID";
pub const PROXY_URLS_VAR: &str = "TRUST_GAME_PROXY_URLS";
pub const GITHUB_API_VAR: &str = "TRUST_GAME_GITHUB_API";
pub const GITHUB_REPO_VAR: &str = "TRUST_GAME_GITHUB_REPO";
pub const GITHUB_TOKEN_VAR: &str = "TRUST_GAME_GITHUB_TOKEN";

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_DATA_DIR: &str = "./trust_game_data";

/// Repository that receives dispatch events and issues
#[derive(Debug, Clone, PartialEq)]
pub struct GitHubTarget {
    pub api_base: Url,
    pub owner: String,
    pub repo: String,
    pub token: String,
}

impl GitHubTarget {
    /// `repository` is `owner/repo`
    pub fn new(api_base: Url, repository: &str, token: impl Into<String>) -> SubmissionResult<Self> {
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty() && !r.contains('/'))
            .ok_or_else(|| SubmissionError::config(GITHUB_REPO_VAR, format!("expected owner/repo, got '{repository}'")))?;

        Ok(Self {
            api_base: with_trailing_slash(api_base),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.into(),
        })
    }

    /// `<api>/repos/<owner>/<repo>/<tail>`
    pub fn endpoint(&self, tail: &str) -> SubmissionResult<Url> {
        self.api_base
            .join(&format!("repos/{}/{}/{}", self.owner, self.repo, tail))
            .map_err(|e| SubmissionError::config(GITHUB_API_VAR, e.to_string()))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    pub data_api_url: Option<Url>,
    pub experiment_id: Option<String>,
    pub proxy_urls: Vec<Url>,
    pub github: Option<GitHubTarget>,
    /// Directory backing the local store
    pub data_dir: PathBuf,
    /// Where the fallback drops the CSV and JSON exports, if anywhere
    pub downloads_dir: Option<PathBuf>,
    pub attempt_timeout: Duration,
    /// Skip every remote strategy
    pub offline: bool,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            data_api_url: None,
            experiment_id: None,
            proxy_urls: Vec::new(),
            github: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            downloads_dir: None,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            offline: false,
        }
    }
}

impl SubmissionConfig {
    /// Read transport settings from the process environment
    pub fn from_env() -> SubmissionResult<Self> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read transport settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> SubmissionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_api_url = get(DATA_API_URL_VAR).map(|v| parse_url(DATA_API_URL_VAR, &v)).transpose()?;
        let experiment_id = get(EXPERIMENT_ID_VAR);

        let proxy_urls = match get(PROXY_URLS_VAR) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_url(PROXY_URLS_VAR, s))
                .collect::<SubmissionResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        let github = match (get(GITHUB_REPO_VAR), get(GITHUB_TOKEN_VAR)) {
            (Some(repository), Some(token)) => {
                let api = get(GITHUB_API_VAR).unwrap_or_else(|| DEFAULT_GITHUB_API.to_string());
                Some(GitHubTarget::new(parse_url(GITHUB_API_VAR, &api)?, &repository, token)?)
            }
            (Some(_), None) => {
                component_warn!(
                    Component::Submission,
                    "{} set without {}; dispatch and issue transports disabled",
                    GITHUB_REPO_VAR,
                    GITHUB_TOKEN_VAR
                );
                None
            }
            _ => None,
        };

        Ok(Self {
            data_api_url,
            experiment_id,
            proxy_urls,
            github,
            ..Self::default()
        })
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_downloads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.downloads_dir = Some(dir.into());
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}

fn parse_url(field: &str, value: &str) -> SubmissionResult<Url> {
    let url = Url::parse(value).map_err(|e| SubmissionError::config(field, format!("{value}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SubmissionError::config(field, format!("unsupported scheme '{other}'"))),
    }
}
