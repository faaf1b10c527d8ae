//! Values exchanged with the ledger.
//!
//! These mirror the JSON the ledger speaks (camelCase keys), so the HTTP
//! gateway can deserialize responses directly into them.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{ChainId, Serial};

/// A chain as listed by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub id: ChainId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Serial of the most recent record on the chain.
    #[serde(default)]
    pub last_record: Serial,
}

/// What the ledger answers after accepting a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub serial: Serial,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// A record read back from the ledger. Owned by the ledger; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub serial: Serial,
    #[serde(default)]
    pub chain_id: Option<ChainId>,
    /// Ledger-computed record hash, hex of unspecified case.
    pub hash: String,
    /// Base64 of the anchored bytes.
    pub payload_bytes: String,
    #[serde(default)]
    pub application_id: Option<u64>,
    #[serde(default)]
    pub payload_tag_id: Option<u64>,
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl LedgerRecord {
    /// Decode the base64 payload.
    pub fn decode_payload(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.payload_bytes.trim())
            .map_err(|e| CoreError::PayloadDecode(format!("payload is not base64: {e}")))
    }

    /// First eight characters of the record hash, lowercase.
    ///
    /// Shorter hashes are returned whole.
    pub fn hash_prefix(&self) -> String {
        self.hash.chars().take(8).collect::<String>().to_lowercase()
    }

    /// Whether the record hash starts with `hash8`, ignoring case.
    pub fn matches_hash8(&self, hash8: &str) -> bool {
        hash8.len() == 8 && self.hash_prefix() == hash8.to_lowercase()
    }

    /// Metadata worth surfacing in a verification verdict.
    pub fn metadata(&self) -> RecordMetadata {
        RecordMetadata {
            application_id: self.application_id,
            payload_tag_id: self.payload_tag_id,
            record_type: self.record_type.clone(),
            version: self.version,
            network: self.network.clone(),
            created_at: self.created_at.clone(),
            reference: self.reference.clone(),
        }
    }
}

/// Base64 payload form expected by the ledger.
pub fn encode_payload(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Ledger-side metadata of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub application_id: Option<u64>,
    pub payload_tag_id: Option<u64>,
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub version: Option<u32>,
    pub network: Option<String>,
    pub created_at: Option<String>,
    pub reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str, payload: &str) -> LedgerRecord {
        LedgerRecord {
            serial: 7,
            chain_id: Some(ChainId::from("c1")),
            hash: hash.to_string(),
            payload_bytes: payload.to_string(),
            application_id: Some(1),
            payload_tag_id: Some(300),
            record_type: Some("Data".to_string()),
            version: Some(1),
            network: Some("Minerva".to_string()),
            created_at: None,
            reference: Some("Minerva:c1@7".to_string()),
        }
    }

    #[test]
    fn test_parse_ledger_json() {
        let json = r#"{
            "applicationId": 1,
            "chainId": "V6Ge5NDq1oScy-05K85xEzntKHYUMh9m5G-fI0wy1gA",
            "createdAt": "2025-11-21T13:00:00.000+00:00",
            "hash": "ABCD1234EF",
            "network": "Minerva",
            "payloadBytes": "e30=",
            "payloadTagId": 300,
            "reference": "Minerva:V6Ge@42",
            "serial": 42,
            "type": "Data",
            "version": 1
        }"#;
        let record: LedgerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.serial, 42);
        assert_eq!(record.record_type.as_deref(), Some("Data"));
        assert_eq!(record.decode_payload().unwrap(), b"{}");
        assert_eq!(record.hash_prefix(), "abcd1234");
    }

    #[test]
    fn test_minimal_record_json() {
        let record: LedgerRecord =
            serde_json::from_str(r#"{"serial": 3, "hash": "aa", "payloadBytes": ""}"#).unwrap();
        assert_eq!(record.metadata(), RecordMetadata::default());
        assert!(record.decode_payload().unwrap().is_empty());
    }

    #[test]
    fn test_matches_hash8_ignores_case() {
        let r = record("ABCD1234FFFF", "");
        assert!(r.matches_hash8("abcd1234"));
        assert!(r.matches_hash8("ABCD1234"));
        assert!(!r.matches_hash8("abcd1235"));
        assert!(!r.matches_hash8("abcd"));
    }

    #[test]
    fn test_short_hash_never_matches() {
        let r = record("ABCD", "");
        assert_eq!(r.hash_prefix(), "abcd");
        assert!(!r.matches_hash8("abcd0000"));
    }

    #[test]
    fn test_bad_base64_is_payload_error() {
        let r = record("00", "not base64!!");
        assert!(matches!(r.decode_payload(), Err(CoreError::PayloadDecode(_))));
    }

    #[test]
    fn test_payload_encoding() {
        let encoded = encode_payload(b"{\"a\":1}");
        assert_eq!(encoded, "eyJhIjoxfQ==");
        assert_eq!(record("00", &encoded).decode_payload().unwrap(), b"{\"a\":1}");
    }

    #[test]
    fn test_chain_listing_json() {
        let chains: Vec<ChainInfo> = serde_json::from_str(
            r#"[{"id": "a", "name": "SBR Chain #3", "description": "docs", "lastRecord": 41},
                {"id": "b", "name": "Other"}]"#,
        )
        .unwrap();
        assert_eq!(chains[0].last_record, 41);
        assert_eq!(chains[1].description, None);
        assert_eq!(chains[1].last_record, 0);
    }
}
