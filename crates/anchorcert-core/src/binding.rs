//! Hash binding: turning a caller document into an anchorable envelope.
//!
//! Two hashes come out of a binding:
//!
//! - the **document hash** is SHA-256 over the compact JSON of the raw
//!   document. It is stored inside the envelope and is what verification
//!   recomputes, so it must only depend on the document itself.
//! - the **envelope hash** is SHA-256 over the exact envelope bytes sent to the
//!   ledger. It changes on every registration because the envelope carries
//!   the registration time.
//!
//! Key order is part of the hashed bytes. Documents are `serde_json` maps with
//! `preserve_order`, so a document hashes the same way it was written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::crypto::Sha256Hash;
use crate::error::{CoreError, Result};
use crate::timefmt;

/// A caller-supplied document: an ordered JSON object.
pub type Document = Map<String, Value>;

/// Envelope schema version written by this crate.
pub const SCHEMA_VERSION: &str = "1.0";

/// Default value of the envelope `source` tag.
pub const DEFAULT_SOURCE: &str = "ANCHORCERT";

/// Convert an arbitrary JSON value into a document.
///
/// Only JSON objects are documents.
pub fn document_from_value(value: Value) -> Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::Serialization(format!(
            "document must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Parse a document from JSON text.
pub fn document_from_str(json: &str) -> Result<Document> {
    let value: Value = serde_json::from_str(json)?;
    document_from_value(value)
}

/// Compact JSON bytes of a document, exactly as they are hashed.
pub fn document_bytes(document: &Document) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(document)?)
}

/// SHA-256 of the compact JSON serialization of a document.
///
/// Certification and verification both go through this function.
pub fn document_hash(document: &Document) -> Result<Sha256Hash> {
    Ok(Sha256Hash::hash(&document_bytes(document)?))
}

/// The unit anchored on the ledger: the document plus registration metadata.
///
/// The document sits under its own `document` key, so any document can be
/// anchored whatever keys it uses:
///
/// ```text
/// {"document":{...},"registeredAt":"...","source":"...","schemaVersion":"1.0","documentHash":"..."}
/// ```
///
/// Older registrations wrote the document fields flattened next to
/// `timestampRegistro` and `hashDocumento`. Those payloads still decode; the
/// remaining top-level keys become the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    /// The caller's document, fields in their original order.
    pub document: Document,

    /// When the envelope was created, millisecond precision.
    #[serde(rename = "registeredAt", with = "timefmt::millis")]
    pub registered_at: DateTime<Utc>,

    /// Free-form tag naming the registering system.
    pub source: String,

    /// Envelope layout version.
    #[serde(rename = "schemaVersion")]
    pub schema_version: String,

    /// Hash of `document` alone.
    #[serde(rename = "documentHash")]
    pub document_hash: Sha256Hash,
}

/// Layouts accepted when reading an envelope back, newest first.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnvelopeRepr {
    Nested(NestedEnvelope),
    Flattened(FlattenedEnvelope),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NestedEnvelope {
    document: Document,
    #[serde(rename = "registeredAt", with = "timefmt::millis")]
    registered_at: DateTime<Utc>,
    #[serde(default)]
    source: String,
    #[serde(rename = "schemaVersion", default)]
    schema_version: String,
    #[serde(rename = "documentHash")]
    document_hash: Sha256Hash,
}

#[derive(Deserialize)]
struct FlattenedEnvelope {
    #[serde(flatten)]
    document: Document,
    #[serde(rename = "timestampRegistro", alias = "registeredAt", with = "timefmt::millis")]
    registered_at: DateTime<Utc>,
    #[serde(default)]
    source: String,
    #[serde(rename = "schemaVersion", default)]
    schema_version: String,
    #[serde(rename = "hashDocumento", alias = "documentHash")]
    document_hash: Sha256Hash,
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match EnvelopeRepr::deserialize(deserializer)? {
            EnvelopeRepr::Nested(e) => Envelope {
                document: e.document,
                registered_at: e.registered_at,
                source: e.source,
                schema_version: e.schema_version,
                document_hash: e.document_hash,
            },
            EnvelopeRepr::Flattened(e) => Envelope {
                document: e.document,
                registered_at: e.registered_at,
                source: e.source,
                schema_version: e.schema_version,
                document_hash: e.document_hash,
            },
        })
    }
}

impl Envelope {
    /// Compact UTF-8 JSON bytes of this envelope.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse an envelope from raw payload bytes.
    pub fn from_payload(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CoreError::PayloadDecode(format!("payload is not UTF-8: {e}")))?;
        serde_json::from_str(text)
            .map_err(|e| CoreError::PayloadDecode(format!("payload is not an envelope: {e}")))
    }

    /// The envelope as a JSON value, for reporting.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Everything produced by binding a document.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The envelope that was serialized.
    pub envelope: Envelope,
    /// The exact bytes to submit to the ledger.
    pub envelope_bytes: Vec<u8>,
    /// Inner hash (document only).
    pub document_hash: Sha256Hash,
    /// Outer hash (envelope bytes).
    pub envelope_hash: Sha256Hash,
}

/// Builds envelopes with a fixed source tag and schema version.
#[derive(Debug, Clone)]
pub struct HashBinder {
    source: String,
    schema_version: String,
}

impl HashBinder {
    /// Create a binder writing the given source tag.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }

    /// Override the schema version written into envelopes.
    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }

    /// The source tag written into envelopes.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Bind a document, stamping it with `registered_at`.
    ///
    /// Any JSON object binds; the document keeps its own keys under
    /// `document` and cannot collide with envelope metadata.
    ///
    /// The timestamp is truncated to milliseconds so that the envelope read
    /// back from the ledger compares equal to the one written.
    pub fn bind(&self, document: &Document, registered_at: DateTime<Utc>) -> Result<Binding> {
        let registered_at = timefmt::truncate_millis(registered_at);
        let document_hash = document_hash(document)?;

        let envelope = Envelope {
            document: document.clone(),
            registered_at,
            source: self.source.clone(),
            schema_version: self.schema_version.clone(),
            document_hash,
        };

        let envelope_bytes = envelope.to_bytes()?;
        let envelope_hash = Sha256Hash::hash(&envelope_bytes);

        Ok(Binding {
            envelope,
            envelope_bytes,
            document_hash,
            envelope_hash,
        })
    }
}

impl Default for HashBinder {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
