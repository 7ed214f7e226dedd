use gymshop_core::StorageError;
use thiserror::Error;

/// Errors returned by the storefront API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The access token was rejected. A refresh has been attempted; the
    /// original request is not replayed.
    #[error("unauthorized: access token rejected")]
    Unauthorized,

    /// The refresh token was missing or rejected and the session was wiped.
    #[error("session expired, sign in again")]
    SessionExpired,

    /// Non-2xx response from the API.
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Local session storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// An operation needs a signed-in customer and there is none.
    #[error("no signed-in customer")]
    NotSignedIn,
}

impl ApiError {
    /// HTTP status for `Status` errors, 401 for auth failures.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized | ApiError::SessionExpired => Some(401),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
