//! Error types for the collection-request client.

use thiserror::Error;

/// Result type for collection-request API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Fallback message when an error response carries no `detail`.
pub const GENERIC_ERROR_DETAIL: &str = "An error occurred";

/// Collection-request API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response (connection failed, timeout)
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    /// Service answered with a non-2xx status
    #[error("{path} returned {status}: {detail}")]
    Status {
        path: String,
        status: u16,
        detail: String,
    },

    /// Request body could not be serialized
    #[error("failed to encode request body for {path}: {message}")]
    Encode { path: String, message: String },

    /// Response body did not match the expected shape
    #[error("failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },

    /// Signature verification requested before a signature was issued
    #[error("No signature to verify")]
    MissingSignature,

    /// HTTP client could not be built from the configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of the response, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
