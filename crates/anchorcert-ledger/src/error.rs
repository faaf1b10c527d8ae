//! Error types for the ledger gateway.

use anchorcert_core::CoreError;
use thiserror::Error;

/// Errors that can occur while talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger could not be reached, or the connection failed mid-request.
    #[error("transport error: {0}")]
    Transport(String),

    /// The ledger refused a submission.
    #[error("submission rejected with status {status}: {body}")]
    Submission { status: u16, body: String },

    /// A read returned a status the gateway does not handle.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A response body could not be parsed.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The gateway is misconfigured.
    #[error("configuration error: {0}")]
    Config(String),

    /// Core primitive error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        LedgerError::Transport(e.to_string())
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
