//! Error types for anchorcert core.

use thiserror::Error;

/// Errors raised by the pure certification primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The document could not be represented as a JSON object.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A verification code did not match `IL2-<serial>-<hash8>`.
    #[error("invalid verification code format: {0}")]
    InvalidCodeFormat(String),

    /// A ledger payload was not a base64-encoded UTF-8 JSON envelope.
    #[error("payload decode error: {0}")]
    PayloadDecode(String),

    /// A certificate is structurally unusable.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
