use serde::Serialize;
use std::time::Duration;

/// Coarse classification surfaced on fallback outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    HttpStatus,
    Network,
    Timeout,
    MalformedResponse,
}

/// Failure of a remote analysis attempt. Every variant is recovered by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("API proxy request failed: {status}. Details: {details}")]
    HttpStatus { status: u16, details: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("API request timeout after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            Self::HttpStatus { .. } => RemoteErrorKind::HttpStatus,
            Self::Network(_) => RemoteErrorKind::Network,
            Self::Timeout(_) => RemoteErrorKind::Timeout,
            Self::MalformedResponse(_) => RemoteErrorKind::MalformedResponse,
        }
    }

    /// Network failures and 5xx statuses may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::Timeout(_) | Self::MalformedResponse(_) => false,
        }
    }
}
