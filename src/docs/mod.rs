//! Documentation sync.
//!
//! Mirrors the Markdown sources of the docs repository into the site's
//! content directory so the static build can pick them up. One-shot: list
//! the content directory through the contents API, clear the local target,
//! download every Markdown file.

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{debug, info};
use reqwest::{Client, header};
use serde::Deserialize;

use crate::config::Config;
use crate::github::client::{API_ACCEPT, REQUEST_TIMEOUT, USER_AGENT};

/// Directory inside the docs repository that holds the published pages.
const CONTENT_DIR: &str = "docs";

/// One entry of a repository contents listing.
#[derive(Debug, Deserialize)]
struct ContentsEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    download_url: Option<String>,
}

impl ContentsEntry {
    fn is_markdown_file(&self) -> bool {
        self.kind == "file" && self.name.ends_with(".md")
    }
}

/// Syncs the docs repository's Markdown files into `out_dir`, replacing
/// whatever files were there.
#[tracing::instrument(skip(client, config))]
pub async fn sync_docs(client: &Client, config: &Config, out_dir: &Path) -> Result<()> {
    info!("Fetching docs from {}...", config.docs_repo);

    let entries = fetch_docs_list(client, config).await?;
    info!("Found {} documentation files", entries.len());

    clear_output_dir(out_dir).await?;
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for entry in &entries {
        debug!("Fetching {}...", entry.path);

        let url = entry
            .download_url
            .as_deref()
            .with_context(|| format!("Docs entry {} has no download URL", entry.path))?;
        let content = fetch_file(client, url)
            .await
            .with_context(|| format!("Failed to fetch {}", entry.path))?;

        tokio::fs::write(out_dir.join(&entry.name), content)
            .await
            .with_context(|| format!("Failed to write {}", entry.name))?;
    }

    info!("Documentation synced successfully");
    Ok(())
}

async fn fetch_docs_list(client: &Client, config: &Config) -> Result<Vec<ContentsEntry>> {
    let url = format!(
        "{}/repos/{}/contents/{}",
        config.api_url, config.docs_repo, CONTENT_DIR
    );

    let mut request = client
        .get(&url)
        .timeout(REQUEST_TIMEOUT)
        .query(&[("ref", config.docs_branch.as_str())])
        .header(header::ACCEPT, API_ACCEPT)
        .header(header::USER_AGENT, USER_AGENT);
    if let Some(token) = &config.token {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .context("Failed to request the docs listing")?;
    if !response.status().is_success() {
        bail!("Failed to fetch docs list: {}", response.status());
    }

    let entries: Vec<ContentsEntry> = response
        .json()
        .await
        .context("Failed to parse the docs listing")?;

    Ok(entries
        .into_iter()
        .filter(ContentsEntry::is_markdown_file)
        .collect())
}

async fn fetch_file(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .timeout(REQUEST_TIMEOUT)
        .header(header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .context("Failed to request file")?;
    if !response.status().is_success() {
        bail!("Failed to fetch file: {}", response.status());
    }

    Ok(response
        .bytes()
        .await
        .context("Failed to read file body")?
        .to_vec())
}

/// Removes the previous sync's files. A missing directory is fine; anything
/// that is not a plain file is left alone.
async fn clear_output_dir(dir: &Path) -> Result<()> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(_) => return Ok(()),
    };

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path())
                .await
                .with_context(|| format!("Failed to remove {}", entry.path().display()))?;
        }
    }

    Ok(())
}
