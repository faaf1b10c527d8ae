//! Verification codes: `IL2-<serial>-<hash8>`.
//!
//! A code is short enough to print on paper. It locates a record by serial
//! and spot-checks it with the first eight hex characters of the ledger's
//! record hash. Serials are only unique per chain, so the code alone can
//! match records on several chains.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::types::Serial;

/// Literal first segment of every code.
pub const CODE_PREFIX: &str = "IL2";

/// Number of record-hash characters carried by a code.
pub const HASH8_LEN: usize = 8;

/// A decoded verification code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerificationCode {
    /// Record serial.
    pub serial: Serial,
    /// First eight hex characters of the record hash, lowercase.
    pub hash8: String,
}

impl VerificationCode {
    /// Build a code from a serial and a full record hash.
    pub fn new(serial: Serial, record_hash: &str) -> Self {
        Self {
            serial,
            hash8: record_hash.chars().take(HASH8_LEN).collect::<String>().to_lowercase(),
        }
    }

    /// Parse a code string. See [`decode`].
    pub fn parse(code: &str) -> Result<Self> {
        decode(code)
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", CODE_PREFIX, self.serial, self.hash8.to_uppercase())
    }
}

impl FromStr for VerificationCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

/// Encode a serial and record hash as `IL2-{serial}-{HASH8}`.
pub fn encode(serial: Serial, record_hash: &str) -> String {
    VerificationCode::new(serial, record_hash).to_string()
}

/// Decode a code string.
///
/// Requires exactly three `-` separated segments: the literal `IL2`, a decimal
/// serial, and eight hex characters. Surrounding whitespace is ignored.
pub fn decode(code: &str) -> Result<VerificationCode> {
    let code = code.trim();
    let invalid = |reason: &str| CoreError::InvalidCodeFormat(format!("{reason}: {code:?}"));

    let segments: Vec<&str> = code.split('-').collect();
    if segments.len() != 3 {
        return Err(invalid("expected three segments"));
    }

    if segments[0] != CODE_PREFIX {
        return Err(invalid("missing IL2 prefix"));
    }

    let serial_text = segments[1];
    if serial_text.is_empty() || !serial_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("serial is not a non-negative integer"));
    }
    let serial: Serial = serial_text
        .parse()
        .map_err(|_| invalid("serial out of range"))?;

    let hash8 = segments[2];
    if hash8.len() != HASH8_LEN || !hash8.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("hash segment must be 8 hex characters"));
    }

    Ok(VerificationCode {
        serial,
        hash8: hash8.to_lowercase(),
    })
}
