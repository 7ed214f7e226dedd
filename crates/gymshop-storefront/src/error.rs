use gymshop_client::ApiError;
use gymshop_core::{StorageError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Another cart mutation is still in flight.
    #[error("another update is in progress")]
    Busy,

    #[error("{0} not found")]
    NotFound(String),

    #[error("not allowed in the current state: {0}")]
    InvalidState(&'static str),

    #[error("invalid payment return URL '{url}': {reason}")]
    InvalidReturnUrl { url: String, reason: String },
}
