//! Error types for the engine.

use anchorcert_core::{ChainId, CoreError, Serial};
use anchorcert_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur during certification or verification.
///
/// Verification verdicts such as "record not found" or "document altered"
/// are not errors; they are reported as a
/// [`VerificationOutcome`](crate::VerificationOutcome).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Core primitive error (document serialization, code format, ...).
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Ledger gateway error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The target chain is not listed by the ledger.
    #[error("chain not found: {0}")]
    ChainNotFound(ChainId),

    /// The ledger accepted a submission but does not return the record.
    #[error("record {serial} missing on chain {chain_id} after submission")]
    RecordMissing { chain_id: ChainId, serial: Serial },

    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
