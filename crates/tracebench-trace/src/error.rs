//! Error types for trace retrieval.

use thiserror::Error;

/// Result type for trace retrieval
pub type Result<T> = std::result::Result<T, FetchError>;

/// Ways fetching a trace from the observability backend can fail.
///
/// None of these abort a sweep: callers record the trace as having no metrics.
#[derive(Error, Debug)]
pub enum FetchError {
    /// A required credential is not configured
    #[error("Missing observability credentials: {names}")]
    MissingCredentials { names: String },

    /// Transport-level failure (connect, TLS, timeout)
    #[error("Trace request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Trace request for {trace_id} returned status {status}: {body}")]
    Status {
        trace_id: String,
        status: u16,
        body: String,
    },

    /// Response body is not a JSON document
    #[error("Failed to decode trace {trace_id}")]
    Decode {
        trace_id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn missing_credentials<S: Into<String>>(names: S) -> Self {
        Self::MissingCredentials {
            names: names.into(),
        }
    }

    pub fn status<S: Into<String>>(trace_id: S, status: u16, body: String) -> Self {
        Self::Status {
            trace_id: trace_id.into(),
            status,
            body,
        }
    }

    pub fn decode<S: Into<String>>(trace_id: S, source: serde_json::Error) -> Self {
        Self::Decode {
            trace_id: trace_id.into(),
            source,
        }
    }

    /// True for authentication and authorization rejections
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}
