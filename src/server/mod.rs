//! HTTP surface of the site backend.

pub mod download;
pub mod releases;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use log::info;
use reqwest::Client;

use crate::github::FetchReleases;

/// State shared by the request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of validated release metadata.
    pub releases: Arc<dyn FetchReleases>,
    /// Client used by the download proxy. Carries no timeout: an installer
    /// download runs as long as the client keeps reading.
    pub proxy_client: Client,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/releases/latest", get(releases::latest))
        .route("/api/releases", get(releases::list))
        .route("/api/download", get(download::missing_filename))
        .route("/api/download/", get(download::missing_filename))
        .route("/api/download/{*file}", get(download::proxy))
        .with_state(state)
}

/// Binds the listen address and serves requests until the process stops.
pub async fn serve(listen: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;

    info!("Listening on {}", listen);

    axum::serve(listener, router(state))
        .await
        .context("Server error")
}
