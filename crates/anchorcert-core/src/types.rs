//! Strong type definitions for anchorcert.
//!
//! Identifiers handed out by the ledger are newtypes so a chain id can never
//! be passed where a record hash is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a record within a chain, assigned by the ledger on submission.
pub type Serial = u64;

/// Opaque identifier of a ledger chain.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Create a chain id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChainId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChainId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_display() {
        let id = ChainId::new("V6Ge5NDq1oScy-05K85xEzntKHYUMh9m5G-fI0wy1gA");
        assert_eq!(id.to_string(), "V6Ge5NDq1oScy-05K85xEzntKHYUMh9m5G-fI0wy1gA");
        assert_eq!(format!("{:?}", ChainId::from("abc")), "ChainId(abc)");
    }

    #[test]
    fn test_chain_id_serializes_as_plain_string() {
        let id = ChainId::from("chain-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"chain-1\"");

        let back: ChainId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
