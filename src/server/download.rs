//! Download proxy endpoint.
//!
//! Proxies installer downloads from the release host so browsers get
//! direct-download headers instead of following a redirect chain. The
//! source URL is taken as-is from the query string; the site only ever
//! links here with URLs built from validated release data.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use log::{debug, error, warn};
use reqwest::Client;
use serde::Deserialize;

use super::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub url: Option<String>,
}

/// Failure channel of the upstream fetch. Upstream statuses are mirrored to
/// the caller; everything else collapses to an opaque 500.
#[derive(Debug)]
pub enum ProxyError {
    Upstream { status: u16, status_text: String },
    Internal(reqwest::Error),
}

/// A successful upstream response, ready to re-stream.
#[derive(Debug)]
pub struct UpstreamFile {
    pub content_type: String,
    pub content_length: Option<u64>,
    response: reqwest::Response,
}

impl UpstreamFile {
    /// Hands the upstream body to the response as a live stream. Chunks flow
    /// through as the client reads them; nothing is buffered in full.
    pub fn into_body(self) -> Body {
        Body::from_stream(
            self.response
                .bytes_stream()
                .inspect_err(|e| warn!("Upstream stream error: {}", e)),
        )
    }
}

/// Issues the single upstream GET and classifies the result.
pub async fn fetch_upstream(client: &Client, url: &str) -> Result<UpstreamFile, ProxyError> {
    let response = client.get(url).send().await.map_err(ProxyError::Internal)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProxyError::Upstream {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
        });
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    let content_length = response.content_length();

    Ok(UpstreamFile {
        content_type,
        content_length,
        response,
    })
}

/// `GET /api/download/{filename}?url=<source-url>`
pub async fn proxy(
    State(state): State<AppState>,
    Path(file): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    if file.is_empty() {
        return (StatusCode::BAD_REQUEST, "Filename is required").into_response();
    }
    let Some(url) = query.url else {
        return (StatusCode::BAD_REQUEST, "Download URL is required").into_response();
    };

    debug!("Proxying download of {} from {}", file, url);

    match fetch_upstream(&state.proxy_client, &url).await {
        Ok(upstream) => attachment_response(&file, upstream),
        Err(ProxyError::Upstream {
            status,
            status_text,
        }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, format!("Failed to fetch file: {}", status_text)).into_response()
        }
        Err(ProxyError::Internal(e)) => {
            error!("Download proxy error for {}: {}", url, e);
            internal_server_error()
        }
    }
}

/// Route target for `/api/download` with no filename segment.
pub async fn missing_filename() -> Response {
    (StatusCode::BAD_REQUEST, "Filename is required").into_response()
}

fn attachment_response(filename: &str, upstream: UpstreamFile) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, upstream.content_type.clone())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        );

    if let Some(length) = upstream.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    match builder.body(upstream.into_body()) {
        Ok(response) => response.into_response(),
        Err(e) => {
            error!("Failed to build download response for {}: {}", filename, e);
            internal_server_error()
        }
    }
}

fn internal_server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::github::MockFetchReleases;

    fn test_state(client: Client) -> AppState {
        AppState {
            releases: Arc::new(MockFetchReleases::new()),
            proxy_client: client,
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_upstream_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/file.bin")
            .with_status(200)
            .with_header("content-type", "application/x-msdownload")
            .with_body("binary-bytes")
            .create_async()
            .await;

        let upstream = fetch_upstream(&Client::new(), &format!("{}/file.bin", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(upstream.content_type, "application/x-msdownload");
        assert_eq!(upstream.content_length, Some(12));
    }

    #[tokio::test]
    async fn test_fetch_upstream_defaults_content_type() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/file.bin")
            .with_status(200)
            .with_body("x")
            .create_async()
            .await;

        let upstream = fetch_upstream(&Client::new(), &format!("{}/file.bin", server.url()))
            .await
            .unwrap();

        assert_eq!(upstream.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_fetch_upstream_maps_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone")
            .with_status(503)
            .create_async()
            .await;

        let err = fetch_upstream(&Client::new(), &format!("{}/gone", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::Upstream { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_upstream_connection_failure_is_internal() {
        // Nothing listens on this port.
        let err = fetch_upstream(&Client::new(), "http://127.0.0.1:1/file")
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::Internal(_)));
    }

    #[tokio::test]
    async fn test_proxy_requires_url_parameter() {
        let response = proxy(
            State(test_state(Client::new())),
            Path("installer.exe".to_string()),
            Query(DownloadQuery { url: None }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Download URL is required");
    }

    #[tokio::test]
    async fn test_proxy_requires_filename() {
        let response = proxy(
            State(test_state(Client::new())),
            Path(String::new()),
            Query(DownloadQuery {
                url: Some("https://example.com/file".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Filename is required");
    }

    #[tokio::test]
    async fn test_proxy_streams_upstream_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/s-ide-windows-setup.exe")
            .with_status(200)
            .with_header("content-type", "application/x-msdownload")
            .with_body("MZ-installer-payload")
            .create_async()
            .await;

        let response = proxy(
            State(test_state(Client::new())),
            Path("s-ide-windows-setup.exe".to_string()),
            Query(DownloadQuery {
                url: Some(format!("{}/s-ide-windows-setup.exe", server.url())),
            }),
        )
        .await;

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .unwrap(),
            "attachment; filename=\"s-ide-windows-setup.exe\""
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/x-msdownload"
        );
        assert_eq!(body_text(response).await, "MZ-installer-payload");
    }

    #[tokio::test]
    async fn test_proxy_mirrors_upstream_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/file")
            .with_status(503)
            .create_async()
            .await;

        let response = proxy(
            State(test_state(Client::new())),
            Path("file".to_string()),
            Query(DownloadQuery {
                url: Some(format!("{}/file", server.url())),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body_text(response).await,
            "Failed to fetch file: Service Unavailable"
        );
    }

    #[tokio::test]
    async fn test_proxy_unreachable_upstream_is_opaque_500() {
        let response = proxy(
            State(test_state(Client::new())),
            Path("file".to_string()),
            Query(DownloadQuery {
                url: Some("http://127.0.0.1:1/file".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Internal server error");
    }
}
