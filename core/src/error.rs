//! Error types for the farm portal client.
//!
//! # Design
//! A non-2xx status becomes `Status` whose display text is the
//! operation-specific message (or the backend's `detail` for login), so
//! callers can surface it directly. The certificate-verification 404 is
//! not an error at all; it is reported as `Ok(None)` by the parser.

use thiserror::Error;

/// Errors returned by the client, its transport and its session store.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The persisted session could not be read, written or removed.
    #[error("session store error: {0}")]
    Session(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of a `Status` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
