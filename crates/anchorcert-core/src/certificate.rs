//! Registration certificates.
//!
//! A certificate is handed to the document owner after anchoring. It is stored
//! and exchanged as JSON under the wire keys registrations have always used
//! (`titulo`, `dados`, `codigoVerificacao`, ...), so existing certificate files
//! keep loading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::binding::{Binding, Document};
use crate::code::{self, VerificationCode};
use crate::crypto::Sha256Hash;
use crate::error::{CoreError, Result};
use crate::record::{ChainInfo, LedgerRecord, Submission};
use crate::timefmt;
use crate::types::{ChainId, Serial};

/// Certificate layout version written by this crate.
pub const CERTIFICATE_VERSION: &str = "2.0";

/// Default certificate title.
pub const DEFAULT_TITLE: &str = "DOCUMENT REGISTRATION CERTIFICATE";

/// Name of the digest algorithm recorded in certificates.
pub const DIGEST_ALGORITHM: &str = "SHA-256";

/// Ledger name recorded in certificates.
pub const LEDGER_NAME: &str = "InterlockLedger (IL2)";

/// A proof-of-registration certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "versao")]
    pub version: String,

    #[serde(rename = "emissao", with = "timefmt::millis")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "dados")]
    pub data: CertificateData,

    /// `IL2-<serial>-<HASH8>`.
    #[serde(rename = "codigoVerificacao")]
    pub verification_code: String,

    #[serde(rename = "documentoOriginal")]
    pub original_document: Document,

    #[serde(rename = "instrucoes", default)]
    pub instructions: Instructions,

    #[serde(rename = "assinatura_digital", alias = "assinaturaDigital", default)]
    pub digest: DigestInfo,
}

/// Where and when the document was anchored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateData {
    pub serial: Serial,

    #[serde(rename = "chainId")]
    pub chain_id: ChainId,

    #[serde(rename = "chainName", default)]
    pub chain_name: String,

    #[serde(default)]
    pub network: Option<String>,

    #[serde(default)]
    pub reference: Option<String>,

    /// Inner hash: the raw document.
    #[serde(rename = "hashDocumento")]
    pub document_hash: Sha256Hash,

    /// Outer hash: the anchored envelope bytes.
    #[serde(rename = "hashEnvelope", default)]
    pub envelope_hash: Option<Sha256Hash>,

    /// Ledger record hash, as the ledger reported it.
    #[serde(rename = "hashRegistro", alias = "hashBlockchain", default)]
    pub record_hash: String,

    #[serde(rename = "timestampRegistro", default, with = "timefmt::millis_opt")]
    pub registered_at: Option<DateTime<Utc>>,

    #[serde(rename = "urlVerificacao", default, skip_serializing_if = "Option::is_none")]
    pub verification_url: Option<String>,
}

/// Human-readable verification instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructions {
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "passos", default)]
    pub steps: Vec<String>,
    #[serde(rename = "observacoes", default)]
    pub notes: Vec<String>,
}

impl Default for Instructions {
    fn default() -> Self {
        Self {
            title: "How to verify this document:".to_string(),
            steps: [
                "1. Open the verification portal",
                "2. Enter the verification code or the serial number",
                "3. Submit the original document",
                "4. The document hash is recomputed and compared with the anchored one",
                "5. A match confirms the document is authentic and unaltered",
            ]
            .map(String::from)
            .to_vec(),
            notes: [
                "This certificate is a cryptographic proof of registration",
                "The document is permanently anchored on the ledger",
                "Any change to the original document produces a different hash",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Digest descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestInfo {
    #[serde(rename = "algoritmo", default)]
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(rename = "blockchain", default)]
    pub ledger: String,
    #[serde(default)]
    pub network: Option<String>,
}

impl Default for DigestInfo {
    fn default() -> Self {
        Self {
            algorithm: DIGEST_ALGORITHM.to_string(),
            hash: None,
            ledger: LEDGER_NAME.to_string(),
            network: None,
        }
    }
}

impl Certificate {
    /// Compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON, as written to certificate files.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a certificate from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::InvalidCertificate(e.to_string()))
    }

    /// Decode the verification code and check it agrees with `dados.serial`.
    pub fn decoded_code(&self) -> Result<VerificationCode> {
        let decoded = code::decode(&self.verification_code)
            .map_err(|e| CoreError::InvalidCertificate(e.to_string()))?;
        if decoded.serial != self.data.serial {
            return Err(CoreError::InvalidCertificate(format!(
                "code serial {} disagrees with certificate serial {}",
                decoded.serial, self.data.serial
            )));
        }
        Ok(decoded)
    }
}

/// Assembles certificates from the results of a registration.
#[derive(Debug, Clone)]
pub struct CertificateBuilder {
    title: String,
    verification_url_base: Option<String>,
}

impl CertificateBuilder {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            verification_url_base: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Certificates link to `{base}/records@{chainId}/{serial}`.
    pub fn with_verification_url_base(mut self, base: Option<String>) -> Self {
        self.verification_url_base = base.map(|b| b.trim_end_matches('/').to_string());
        self
    }

    /// Build a certificate. Deterministic apart from `issued_at`.
    ///
    /// Network and reference come from the submission answer, falling back to
    /// the record.
    pub fn build(
        &self,
        binding: &Binding,
        submission: &Submission,
        record: &LedgerRecord,
        chain: &ChainInfo,
        issued_at: DateTime<Utc>,
    ) -> Certificate {
        let serial = submission.serial;
        let network = submission.network.clone().or_else(|| record.network.clone());
        let reference = submission
            .reference
            .clone()
            .or_else(|| record.reference.clone());

        let verification_url = self
            .verification_url_base
            .as_ref()
            .map(|base| format!("{base}/records@{}/{serial}", chain.id));

        Certificate {
            title: self.title.clone(),
            version: CERTIFICATE_VERSION.to_string(),
            issued_at: timefmt::truncate_millis(issued_at),
            data: CertificateData {
                serial,
                chain_id: chain.id.clone(),
                chain_name: chain.name.clone(),
                network: network.clone(),
                reference,
                document_hash: binding.document_hash,
                envelope_hash: Some(binding.envelope_hash),
                record_hash: record.hash.clone(),
                registered_at: Some(binding.envelope.registered_at),
                verification_url,
            },
            verification_code: code::encode(serial, &record.hash),
            original_document: binding.envelope.document.clone(),
            instructions: Instructions::default(),
            digest: DigestInfo {
                hash: Some(binding.document_hash.to_hex()),
                network,
                ..DigestInfo::default()
            },
        }
    }
}

impl Default for CertificateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{document_from_value, HashBinder};
    use chrono::TimeZone;
    use serde_json::json;

    fn fixture() -> (Binding, Submission, LedgerRecord, ChainInfo) {
        let doc = document_from_value(json!({"tipo": "NOTA_FISCAL", "numero": "NF-1"})).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 11, 21, 12, 0, 0).unwrap();
        let binding = HashBinder::default().bind(&doc, at).unwrap();
        let submission = Submission {
            serial: 42,
            network: None,
            reference: Some("Minerva:chain-a@42".to_string()),
        };
        let record = LedgerRecord {
            serial: 42,
            chain_id: Some(ChainId::from("chain-a")),
            hash: "ABCD1234EF00".to_string(),
            payload_bytes: crate::record::encode_payload(&binding.envelope_bytes),
            application_id: Some(8),
            payload_tag_id: None,
            record_type: None,
            version: None,
            network: Some("Minerva".to_string()),
            created_at: None,
            reference: None,
        };
        let chain = ChainInfo {
            id: ChainId::from("chain-a"),
            name: "SBR Chain #3".to_string(),
            description: None,
            last_record: 42,
        };
        (binding, submission, record, chain)
    }

    fn issued() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 21, 12, 0, 5).unwrap()
    }

    #[test]
    fn test_build_fills_data() {
        let (binding, submission, record, chain) = fixture();
        let cert = CertificateBuilder::new()
            .with_verification_url_base(Some("https://node.example:32020/".to_string()))
            .build(&binding, &submission, &record, &chain, issued());

        assert_eq!(cert.verification_code, "IL2-42-ABCD1234");
        assert_eq!(cert.data.serial, 42);
        assert_eq!(cert.data.chain_name, "SBR Chain #3");
        assert_eq!(cert.data.network.as_deref(), Some("Minerva"));
        assert_eq!(cert.data.reference.as_deref(), Some("Minerva:chain-a@42"));
        assert_eq!(cert.data.document_hash, binding.document_hash);
        assert_eq!(cert.data.envelope_hash, Some(binding.envelope_hash));
        assert_eq!(cert.data.record_hash, "ABCD1234EF00");
        assert_eq!(
            cert.data.verification_url.as_deref(),
            Some("https://node.example:32020/records@chain-a/42")
        );
        assert_eq!(cert.original_document, binding.envelope.document);
        assert_eq!(cert.digest.algorithm, "SHA-256");
    }

    #[test]
    fn test_build_is_deterministic_given_issue_time() {
        let (binding, submission, record, chain) = fixture();
        let builder = CertificateBuilder::new();
        assert_eq!(
            builder.build(&binding, &submission, &record, &chain, issued()),
            builder.build(&binding, &submission, &record, &chain, issued())
        );
    }

    #[test]
    fn test_json_uses_wire_keys() {
        let (binding, submission, record, chain) = fixture();
        let cert = CertificateBuilder::new().build(&binding, &submission, &record, &chain, issued());
        let value: serde_json::Value = serde_json::from_str(&cert.to_json().unwrap()).unwrap();

        for key in [
            "titulo",
            "versao",
            "emissao",
            "dados",
            "codigoVerificacao",
            "documentoOriginal",
            "instrucoes",
            "assinatura_digital",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value.get("assinaturaDigital").is_none());
        assert_eq!(value["assinatura_digital"]["algoritmo"], "SHA-256");
        assert_eq!(value["emissao"], "2025-11-21T12:00:05.000Z");
        assert_eq!(value["dados"]["hashDocumento"], binding.document_hash.to_hex());
        assert!(value["dados"].get("urlVerificacao").is_none());

        let back = Certificate::from_json(&cert.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, cert);
    }

    #[test]
    fn test_legacy_certificate_loads() {
        let hash = "A".repeat(64);
        let json = format!(
            r#"{{
                "titulo": "CERTIFICADO",
                "versao": "2.0",
                "emissao": "2025-11-21T13:00:00.000Z",
                "dados": {{
                    "serial": 7,
                    "chainId": "c1",
                    "chainName": "Chain",
                    "network": "Minerva",
                    "reference": "Minerva:c1@7",
                    "hashDocumento": "{hash}",
                    "timestampRegistro": "2025-11-21T12:59:59.000Z",
                    "urlVerificacao": "https://x/jsonDocuments@c1/7"
                }},
                "codigoVerificacao": "IL2-7-AAAAAAAA",
                "documentoOriginal": {{"nome": "Teste"}},
                "assinatura_digital": {{"algoritmo": "SHA-256", "hash": "{hash}", "blockchain": "InterlockLedger (IL2)", "network": "Minerva"}}
            }}"#
        );
        let cert = Certificate::from_json(&json).unwrap();
        assert_eq!(cert.data.envelope_hash, None);
        assert_eq!(cert.data.document_hash.to_hex(), hash.to_lowercase());
        assert_eq!(cert.digest.network.as_deref(), Some("Minerva"));
        assert_eq!(cert.decoded_code().unwrap().serial, 7);
    }

    #[test]
    fn test_camel_case_digest_key_still_loads() {
        let (binding, submission, record, chain) = fixture();
        let cert = CertificateBuilder::new().build(&binding, &submission, &record, &chain, issued());
        let json = cert.to_json().unwrap().replace("\"assinatura_digital\"", "\"assinaturaDigital\"");

        let back = Certificate::from_json(&json).unwrap();
        assert_eq!(back.digest, cert.digest);
    }

    #[test]
    fn test_decoded_code_rejects_inconsistent_certificate() {
        let (binding, submission, record, chain) = fixture();
        let mut cert =
            CertificateBuilder::new().build(&binding, &submission, &record, &chain, issued());

        cert.verification_code = "IL2-43-ABCD1234".to_string();
        assert!(matches!(cert.decoded_code(), Err(CoreError::InvalidCertificate(_))));

        cert.verification_code = "garbage".to_string();
        assert!(matches!(cert.decoded_code(), Err(CoreError::InvalidCertificate(_))));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Certificate::from_json("{\"titulo\": 1}"),
            Err(CoreError::InvalidCertificate(_))
        ));
    }
}
