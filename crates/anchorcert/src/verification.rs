//! Verification verdicts.
//!
//! A verification always produces a [`VerificationResult`] unless the ledger
//! could not be reached or the presented document could not be hashed. Every
//! way a document can fail to verify is a [`VerificationOutcome`].

use anchorcert_core::{
    timefmt, Certificate, ChainId, Envelope, RecordMetadata, Serial, Sha256Hash,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a verification concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationOutcome {
    /// The document matches the anchored hash.
    Authentic,
    /// The record exists but the document differs from the anchored one.
    DocumentMismatch,
    /// The record hash does not start with the code's hash segment.
    CodeMismatch,
    /// No record at the requested serial.
    RecordNotFound,
    /// The verification code is malformed.
    InvalidCode,
    /// The record payload is not an envelope.
    PayloadUndecodable,
    /// The certificate's code is malformed or disagrees with its serial.
    InvalidCertificate,
}

impl VerificationOutcome {
    pub fn is_valid(self) -> bool {
        self == VerificationOutcome::Authentic
    }

    /// Short human-readable description.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Authentic => "document is authentic and unaltered",
            Self::DocumentMismatch => "document was altered or is not the registered one",
            Self::CodeMismatch => "hash mismatch",
            Self::RecordNotFound => "record not found",
            Self::InvalidCode => "invalid verification code",
            Self::PayloadUndecodable => "record payload is not a registration envelope",
            Self::InvalidCertificate => "invalid certificate",
        }
    }
}

/// How the caller locates the anchored record.
#[derive(Debug, Clone)]
pub enum VerificationTarget {
    /// A printed `IL2-<serial>-<HASH8>` code.
    Code(String),
    /// A bare serial, optionally pinned to a chain and spot-checked.
    Serial {
        serial: Serial,
        chain_id: Option<ChainId>,
        expected_hash8: Option<String>,
    },
    /// A previously issued certificate.
    Certificate(Box<Certificate>),
}

impl VerificationTarget {
    pub fn code(code: impl Into<String>) -> Self {
        Self::Code(code.into())
    }

    pub fn serial(serial: Serial) -> Self {
        Self::Serial {
            serial,
            chain_id: None,
            expected_hash8: None,
        }
    }

    pub fn certificate(certificate: Certificate) -> Self {
        Self::Certificate(Box::new(certificate))
    }
}

/// Verdict of one verification. Never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub valid: bool,
    pub outcome: VerificationOutcome,
    pub serial: Option<Serial>,
    pub chain_id: Option<ChainId>,
    pub record_hash: Option<String>,
    pub provided_document_hash: Option<Sha256Hash>,
    pub anchored_document_hash: Option<Sha256Hash>,
    pub hashes_match: bool,
    #[serde(default, with = "timefmt::millis_opt")]
    pub registered_at: Option<DateTime<Utc>>,
    #[serde(with = "timefmt::millis")]
    pub verified_at: DateTime<Utc>,
    pub elapsed_since_registration: Option<String>,
    pub anchored_envelope: Option<Envelope>,
    pub metadata: Option<RecordMetadata>,
    pub error: Option<String>,
}

impl VerificationResult {
    /// A negative verdict carrying no record data.
    pub(crate) fn rejected(
        outcome: VerificationOutcome,
        serial: Option<Serial>,
        chain_id: Option<ChainId>,
        error: impl Into<String>,
        verified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            valid: false,
            outcome,
            serial,
            chain_id,
            record_hash: None,
            provided_document_hash: None,
            anchored_document_hash: None,
            hashes_match: false,
            registered_at: None,
            verified_at,
            elapsed_since_registration: None,
            anchored_envelope: None,
            metadata: None,
            error: Some(error.into()),
        }
    }
}

/// Humanise the time between registration and verification.
///
/// Uses the largest whole unit: days, then hours, minutes, seconds. A
/// registration in the future counts as zero seconds.
pub fn humanize_elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let seconds = (to - from).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{days} day(s) ago")
    } else if hours > 0 {
        format!("{hours} hour(s) ago")
    } else if minutes > 0 {
        format!("{minutes} minute(s) ago")
    } else {
        format!("{seconds} second(s) ago")
    }
}

/// Verdict label in reports.
pub const VERDICT_AUTHENTIC: &str = "AUTHENTIC";
pub const VERDICT_NOT_AUTHENTIC: &str = "NOT AUTHENTIC";

/// Shareable verification report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub title: String,
    #[serde(with = "timefmt::millis")]
    pub generated_at: DateTime<Utc>,
    pub verdict: String,
    pub result: VerificationResult,
}

impl VerificationReport {
    pub fn new(result: VerificationResult, generated_at: DateTime<Utc>) -> Self {
        let verdict = if result.valid {
            VERDICT_AUTHENTIC
        } else {
            VERDICT_NOT_AUTHENTIC
        };
        Self {
            title: "DOCUMENT VERIFICATION REPORT".to_string(),
            generated_at,
            verdict: verdict.to_string(),
            result,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
