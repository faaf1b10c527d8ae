//! # Anchorcert Core
//!
//! Pure primitives for anchorcert: hash binding, verification codes,
//! ledger record types, and certificates.
//!
//! This crate contains no I/O, no storage, no networking. The ledger is
//! reached through `anchorcert-ledger`; orchestration lives in `anchorcert`.
//!
//! ## Key Types
//!
//! - [`HashBinder`] - Wraps a document in an envelope and hashes it
//! - [`Envelope`] - The unit anchored on the ledger
//! - [`Sha256Hash`] - Inner (document) and outer (envelope) hashes
//! - [`VerificationCode`] - `IL2-<serial>-<HASH8>` locator
//! - [`Certificate`] - Proof of registration handed to the document owner
//!
//! ## Hashing
//!
//! Documents hash as compact JSON in their original key order. See
//! [`binding`] module.

pub mod binding;
pub mod certificate;
pub mod code;
pub mod crypto;
pub mod error;
pub mod record;
pub mod timefmt;
pub mod types;

pub use binding::{
    document_from_str, document_from_value, document_hash, Binding, Document, Envelope,
    HashBinder,
};
pub use certificate::{Certificate, CertificateBuilder, CertificateData, DigestInfo, Instructions};
pub use code::VerificationCode;
pub use crypto::Sha256Hash;
pub use error::{CoreError, Result};
pub use record::{ChainInfo, LedgerRecord, RecordMetadata, Submission};
pub use types::{ChainId, Serial};
