//! Process-wide configuration, assembled once at startup.

use std::net::SocketAddr;

use crate::github::GitHubRepo;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REPO: &str = "S-IDE-studio/S-IDE";
pub const DEFAULT_DOCS_REPO: &str = "S-IDE-studio/docs";
pub const DEFAULT_DOCS_BRANCH: &str = "main";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

/// Immutable runtime configuration. Built from CLI flags and environment in
/// `main` and handed explicitly to the components that need it; nothing
/// reads the environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository the application releases are published to.
    pub repo: GitHubRepo,
    /// Repository holding the documentation sources.
    pub docs_repo: GitHubRepo,
    /// Branch of the docs repository to sync from.
    pub docs_branch: String,
    /// API base URL; overridable for tests.
    pub api_url: String,
    /// Optional access token. Raises the unauthenticated rate limit;
    /// absence is tolerated and requests proceed unauthenticated.
    pub token: Option<String>,
    /// Address the HTTP server binds to.
    pub listen: SocketAddr,
}
