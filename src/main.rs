use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;

use side_releases::config::{self, Config};
use side_releases::docs;
use side_releases::github::ReleaseClient;
use side_releases::server::{self, AppState};

/// side-releases - release gateway for the S-IDE website
///
/// Serves the website's download API (release metadata and the download
/// proxy) and syncs the documentation sources from the docs repository.
///
/// If the GITHUB_TOKEN environment variable is set, it will be used for
/// authentication. This raises the GitHub API rate limit.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Releases repository (also via SIDE_RELEASES_REPO)
    #[arg(
        long,
        env = "SIDE_RELEASES_REPO",
        value_name = "OWNER/REPO",
        default_value = config::DEFAULT_REPO,
        global = true
    )]
    repo: String,

    /// Docs repository for sync-docs (also via DOCS_REPO)
    #[arg(
        long = "docs-repo",
        env = "DOCS_REPO",
        value_name = "OWNER/REPO",
        default_value = config::DEFAULT_DOCS_REPO,
        global = true
    )]
    docs_repo: String,

    /// Branch of the docs repository to sync from
    #[arg(
        long = "docs-branch",
        value_name = "BRANCH",
        default_value = config::DEFAULT_DOCS_BRANCH,
        global = true
    )]
    docs_branch: String,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(
        long = "api-url",
        value_name = "URL",
        default_value = config::DEFAULT_API_URL,
        global = true
    )]
    api_url: String,

    /// Access token for the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the website API server
    Serve(ServeArgs),

    /// Sync documentation from the docs repository
    SyncDocs(SyncDocsArgs),
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Address to listen on (also via SIDE_RELEASES_LISTEN)
    #[arg(
        long,
        env = "SIDE_RELEASES_LISTEN",
        value_name = "ADDR",
        default_value = config::DEFAULT_LISTEN
    )]
    listen: SocketAddr,
}

#[derive(clap::Args, Debug)]
struct SyncDocsArgs {
    /// Output directory for the synced Markdown files
    #[arg(long = "out-dir", value_name = "PATH", default_value = "src/content/docs")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let listen = match &cli.command {
        Commands::Serve(args) => args.listen,
        _ => config::DEFAULT_LISTEN
            .parse()
            .context("Invalid default listen address")?,
    };

    let config = Config {
        repo: cli.repo.parse().context("Invalid --repo")?,
        docs_repo: cli.docs_repo.parse().context("Invalid --docs-repo")?,
        docs_branch: cli.docs_branch,
        api_url: cli.api_url,
        token: cli.token.filter(|t| !t.is_empty()),
        listen,
    };

    let client = Client::new();

    match cli.command {
        Commands::Serve(_) => {
            let releases = ReleaseClient::new(client.clone(), &config);
            let state = AppState {
                releases: Arc::new(releases),
                proxy_client: client,
            };
            server::serve(config.listen, state).await
        }
        Commands::SyncDocs(args) => docs::sync_docs(&client, &config, &args.out_dir).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_serve_parsing() {
        let cli = Cli::try_parse_from(["side-releases", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.listen.to_string(), config::DEFAULT_LISTEN);
            }
            _ => panic!("Expected Serve command"),
        }
        assert_eq!(cli.repo, config::DEFAULT_REPO);
    }

    #[test]
    fn test_cli_serve_listen_parsing() {
        let cli =
            Cli::try_parse_from(["side-releases", "serve", "--listen", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.listen.to_string(), "0.0.0.0:9000");
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_sync_docs_parsing() {
        let cli = Cli::try_parse_from([
            "side-releases",
            "sync-docs",
            "--out-dir",
            "/tmp/docs",
        ])
        .unwrap();
        match cli.command {
            Commands::SyncDocs(args) => {
                assert_eq!(args.out_dir, PathBuf::from("/tmp/docs"));
            }
            _ => panic!("Expected SyncDocs command"),
        }
    }

    #[test]
    fn test_cli_global_repo_override() {
        let cli = Cli::try_parse_from(["side-releases", "--repo", "acme/ide", "serve"]).unwrap();
        assert_eq!(cli.repo, "acme/ide");
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["side-releases"]);
        assert!(result.is_err());
    }
}
