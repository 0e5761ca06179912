//! Release metadata endpoints backing the download and release-notes pages.

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::{debug, error};
use serde::Serialize;

use crate::asset::{self, Platform, PlatformAssets, format_file_size};
use crate::github::{FetchError, FetchReleases, Release};

use super::AppState;

/// Revalidation hint for the rendered pages. There is no cache behind it;
/// every request re-fetches upstream.
const CACHE_CONTROL: &str = "public, max-age=300";

/// Payload of `/api/releases/latest`: the release itself plus the artifact
/// resolved for each platform.
#[derive(Debug, Serialize)]
pub struct LatestRelease {
    pub release: Release,
    pub platforms: PlatformAssets,
}

/// `GET /api/releases/latest`
pub async fn latest(State(state): State<AppState>) -> Response {
    match state.releases.get_latest_release().await {
        Ok(release) => {
            let platforms = asset::resolve_assets_by_platform(&release);
            for platform in Platform::ALL {
                if let Some(asset) = platforms.get(platform) {
                    debug!(
                        "{}: {} ({})",
                        platform.key(),
                        asset.name,
                        format_file_size(asset.size)
                    );
                }
            }
            with_cache_control(Json(LatestRelease { release, platforms }).into_response())
        }
        Err(e) => degrade(e),
    }
}

/// `GET /api/releases`
pub async fn list(State(state): State<AppState>) -> Response {
    match state.releases.get_all_releases().await {
        Ok(releases) => with_cache_control(Json(releases).into_response()),
        Err(e) => degrade(e),
    }
}

fn with_cache_control(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static(CACHE_CONTROL),
    );
    response
}

/// A failed fetch degrades the page data instead of crashing the render:
/// the error maps to a status, the detail stays in the server log.
fn degrade(error: FetchError) -> Response {
    error!("Release fetch failed: {}", error);

    let status = match &error {
        FetchError::NotFound { .. } => StatusCode::NOT_FOUND,
        FetchError::Forbidden { .. } => StatusCode::FORBIDDEN,
        FetchError::Timeout | FetchError::ServiceUnavailable { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::BAD_GATEWAY,
    };

    (status, error.to_string()).into_response()
}
