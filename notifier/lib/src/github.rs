//! GitHub Releases API client.
//!
//! Lists a repository's releases one page at a time, newest first. The
//! client only knows about transport; tag parsing and lookback bounds live in
//! the [scanner](crate::scanner).

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::error::TransportError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CLIENT_NAME: &str = concat!("release-notifier/", env!("CARGO_PKG_VERSION"));

/// GitHub refuses `per_page` values above this.
pub const MAX_PAGE_SIZE: u32 = 100;

/// One release as reported by the release host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEntry {
    /// Tag name (e.g., "v1.2.3")
    pub tag_name: String,
    /// Unpublished draft release
    pub draft: bool,
}

impl ReleaseEntry {
    /// A published (non-draft) entry for `tag_name`.
    pub fn published(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            draft: false,
        }
    }
}

/// Source of a repository's release history.
pub trait ReleaseHost {
    /// Lists one page of releases for `repository` (`owner/name`), newest
    /// first. Pages are numbered from 1; a page shorter than `per_page` is
    /// the last one.
    fn list_releases(
        &self,
        repository: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<ReleaseEntry>, TransportError>>;
}

/// GitHub API response for a single release.
///
/// The host's `prerelease` flag is not read; suffixed tags such as
/// `v1.5.0-rc.1` already fail to parse as versions.
#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
}

impl From<GitHubRelease> for ReleaseEntry {
    fn from(release: GitHubRelease) -> Self {
        Self {
            tag_name: release.tag_name,
            draft: release.draft,
        }
    }
}

/// GitHub API error response.
#[derive(Debug, Deserialize)]
struct GitHubError {
    message: String,
}

/// Authenticated client for the GitHub REST API.
///
/// ## Examples
///
/// ```rust,no_run
/// use notifier_lib::{GitHubClient, ReleaseHost};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GitHubClient::new("https://api.github.com", "ghp_xxx");
/// let newest = client.list_releases("tokio-rs/tokio", 1, 20).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: String,
    timeout: Duration,
}

impl GitHubClient {
    /// Creates a client for the API rooted at `api_url` (e.g.
    /// `https://api.github.com`), authenticating with `token`.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ReleaseHost for GitHubClient {
    #[tracing::instrument(skip(self), fields(api_url = %self.api_url))]
    async fn list_releases(
        &self,
        repository: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ReleaseEntry>, TransportError> {
        let url = format!("{}/repos/{}/releases", self.api_url, repository);

        let response = self
            .client
            .get(&url)
            .query(&[("per_page", per_page.min(MAX_PAGE_SIZE)), ("page", page)])
            .header(USER_AGENT, CLIENT_NAME)
            .header(ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(TransportError::RateLimitExceeded);
        }

        // GitHub signals an exhausted primary rate limit with a 403
        if status.as_u16() == 403
            && let Some(remaining) = response.headers().get("X-RateLimit-Remaining")
            && remaining.to_str().ok().and_then(|r| r.parse::<u32>().ok()) == Some(0)
        {
            return Err(TransportError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response.text().await?;
            let message = match serde_json::from_str::<GitHubError>(&error_text) {
                Ok(gh_error) => gh_error.message,
                Err(_) => error_text,
            };
            return Err(TransportError::GitHub {
                status: status.as_u16(),
                message,
            });
        }

        let releases: Vec<GitHubRelease> = response.json().await?;
        debug!(count = releases.len(), "received releases");

        Ok(releases.into_iter().map(ReleaseEntry::from).collect())
    }
}
