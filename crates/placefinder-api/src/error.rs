use thiserror::Error;

/// Errors surfaced by the geocoding API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured endpoint URL could not be parsed.
    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The server answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request was superseded by a newer one of the same kind. Not a
    /// failure: callers drop the result and emit nothing further.
    #[error("request canceled")]
    Canceled,
}

impl ApiError {
    /// True for the cancellation marker, which is never reported as an error.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, ApiError::Canceled)
    }
}
