use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, header};

use crate::config::Config;

use super::error::FetchError;
use super::repo::GitHubRepo;
use super::types::Release;

/// Hard per-request timeout. On expiry the in-flight request is aborted and
/// surfaced as `FetchError::Timeout`; it is never retried.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API version accept header required by the releases endpoints.
pub const API_ACCEPT: &str = "application/vnd.github.v3+json";

/// Identifying client header sent with every outbound request.
pub const USER_AGENT: &str = concat!("side-releases/", env!("CARGO_PKG_VERSION"));

/// How many recent releases a single list call asks for.
const RELEASES_PER_PAGE: u32 = 30;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FetchReleases: Send + Sync {
    async fn get_latest_release(&self) -> Result<Release, FetchError>;
    async fn get_all_releases(&self) -> Result<Vec<Release>, FetchError>;
}

/// Client for the releases endpoints of one repository.
pub struct ReleaseClient {
    client: Client,
    repo: GitHubRepo,
    api_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl ReleaseClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self::with_api_url(
            client,
            config.repo.clone(),
            &config.api_url,
            config.token.clone(),
        )
    }

    pub fn with_api_url(
        client: Client,
        repo: GitHubRepo,
        api_url: &str,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            repo,
            api_url: api_url.to_string(),
            token,
            timeout: REQUEST_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Performs one GET against the API and returns the 2xx body as text.
    /// Non-success statuses and transport failures map to their
    /// `FetchError` variants here; schema checks happen at the call sites.
    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let mut request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(header::ACCEPT, API_ACCEPT)
            .header(header::USER_AGENT, USER_AGENT);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        response.text().await.map_err(FetchError::from_transport)
    }
}

#[async_trait]
impl FetchReleases for ReleaseClient {
    #[tracing::instrument(skip(self))]
    async fn get_latest_release(&self) -> Result<Release, FetchError> {
        let url = format!("{}/repos/{}/releases/latest", self.api_url, self.repo);
        debug!("Fetching latest release from {}...", url);

        let body = self.get_text(&url, &[]).await?;
        let release: Release =
            serde_json::from_str(&body).map_err(|e| FetchError::InvalidFormat(e.to_string()))?;
        release.validate()?;

        Ok(release)
    }

    #[tracing::instrument(skip(self))]
    async fn get_all_releases(&self) -> Result<Vec<Release>, FetchError> {
        let url = format!("{}/repos/{}/releases", self.api_url, self.repo);
        debug!("Fetching releases from {}...", url);

        let per_page = RELEASES_PER_PAGE.to_string();
        let body = self
            .get_text(&url, &[("per_page", per_page.as_str())])
            .await?;
        let releases: Vec<Release> =
            serde_json::from_str(&body).map_err(|e| FetchError::InvalidFormat(e.to_string()))?;
        for release in &releases {
            release.validate()?;
        }

        Ok(releases)
    }
}
