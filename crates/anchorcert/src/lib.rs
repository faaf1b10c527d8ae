//! # Anchorcert
//!
//! Proof-of-existence certificates for JSON documents, anchored on an
//! external append-only ledger.
//!
//! ## Overview
//!
//! - **Certify**: hash a document, anchor the hash on a ledger chain, and
//!   issue a certificate with a short verification code
//! - **Verify**: locate the anchored record by code, serial or certificate,
//!   recompute the document hash, and return a verdict
//!
//! ## Key Concepts
//!
//! - **Envelope**: the document plus registration metadata; the unit anchored.
//! - **Inner hash**: hash of the raw document. This is what verification checks.
//! - **Outer hash**: hash of the envelope bytes. Unique per registration.
//! - **Verification code**: `IL2-<serial>-<HASH8>`, where `HASH8` is the start
//!   of the ledger's record hash.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use anchorcert::{Engine, EngineConfig, VerificationTarget};
//! use anchorcert::core::document_from_str;
//! use anchorcert::ledger::{HttpLedger, HttpLedgerConfig};
//!
//! async fn example() {
//!     let ledger = HttpLedger::new(HttpLedgerConfig::new("https://node.example:32020")).unwrap();
//!     let engine = Engine::new(ledger, EngineConfig::new("my-chain-id"));
//!
//!     let document = document_from_str(r#"{"tipo":"NOTA_FISCAL","numero":"NF-1"}"#).unwrap();
//!     let certificate = engine.certify(&document, None).await.unwrap();
//!
//!     let target = VerificationTarget::code(certificate.verification_code.clone());
//!     let result = engine.verify(&target, &document).await.unwrap();
//!     assert!(result.valid);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `anchorcert::core` - Hash binding, codes, certificates
//! - `anchorcert::ledger` - Ledger gateway trait and adapters

pub mod config;
pub mod engine;
pub mod error;
pub mod verification;

// Re-export component crates
pub use anchorcert_core as core;
pub use anchorcert_ledger as ledger;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use verification::{
    humanize_elapsed, VerificationOutcome, VerificationReport, VerificationResult,
    VerificationTarget,
};

// Re-export commonly used core types
pub use anchorcert_core::{
    Certificate, ChainId, ChainInfo, Document, LedgerRecord, Serial, Sha256Hash,
    VerificationCode,
};
pub use anchorcert_ledger::{HttpLedger, HttpLedgerConfig, LedgerGateway, MemoryLedger};
