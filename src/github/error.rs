//! Error taxonomy for the releases API client.

use reqwest::StatusCode;

/// Failure modes of a single fetch against the releases API.
///
/// Transport failures, upstream HTTP errors and schema violations are kept
/// as distinct variants so callers can tell "GitHub said no" apart from
/// "GitHub changed its payload". None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request exceeded the fixed timeout and was aborted.
    Timeout,
    /// Connection-level failure (DNS, TLS, reset, ...).
    Request(String),
    /// Upstream answered 404.
    NotFound { status: u16, status_text: String },
    /// Upstream answered 403 (rate limited or forbidden).
    Forbidden { status: u16, status_text: String },
    /// Upstream answered with a 5xx status.
    ServiceUnavailable { status: u16, status_text: String },
    /// Any other non-2xx status.
    RequestFailed { status: u16, status_text: String },
    /// The body did not match the release schema.
    InvalidFormat(String),
}

impl FetchError {
    /// Maps a non-success HTTP status to its error variant.
    pub fn from_status(status: StatusCode) -> Self {
        let status_text = status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string();
        match status {
            StatusCode::NOT_FOUND => FetchError::NotFound {
                status: status.as_u16(),
                status_text,
            },
            StatusCode::FORBIDDEN => FetchError::Forbidden {
                status: status.as_u16(),
                status_text,
            },
            s if s.is_server_error() => FetchError::ServiceUnavailable {
                status: s.as_u16(),
                status_text,
            },
            s => FetchError::RequestFailed {
                status: s.as_u16(),
                status_text,
            },
        }
    }

    /// Maps a reqwest transport failure, keeping timeouts distinct.
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(error.to_string())
        }
    }

    /// The HTTP status carried by this error, if it has one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::NotFound { status, .. }
            | FetchError::Forbidden { status, .. }
            | FetchError::ServiceUnavailable { status, .. }
            | FetchError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Request(msg) => write!(f, "request failed: {}", msg),
            FetchError::NotFound {
                status,
                status_text,
            } => {
                write!(f, "resource not found ({} {})", status, status_text)
            }
            FetchError::Forbidden {
                status,
                status_text,
            } => {
                write!(f, "rate limited or forbidden ({} {})", status, status_text)
            }
            FetchError::ServiceUnavailable {
                status,
                status_text,
            } => {
                write!(f, "service unavailable ({} {})", status, status_text)
            }
            FetchError::RequestFailed {
                status,
                status_text,
            } => {
                write!(f, "request failed: {} {}", status, status_text)
            }
            FetchError::InvalidFormat(msg) => {
                write!(f, "invalid response format: {}", msg)
            }
        }
    }
}

impl std::error::Error for FetchError {}
