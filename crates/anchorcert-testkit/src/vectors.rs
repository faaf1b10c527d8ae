//! Golden test vectors for deterministic hashing.
//!
//! Document hashes are SHA-256 over the compact JSON text of the document, so
//! any JSON encoder that keeps key order and writes no whitespace must
//! reproduce these values.

use anchorcert_core::binding::{document_from_str, document_hash, HashBinder};
use anchorcert_core::ChainId;
use anchorcert_ledger::MemoryLedger;

use crate::fixtures::fixed_time;

/// A golden document hash vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Document as compact JSON.
    pub document: &'static str,
    /// Expected inner hash (lowercase hex).
    pub expected_hash: &'static str,
}

/// Get all golden document vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "nota fiscal NF-1",
            document: r#"{"tipo":"NOTA_FISCAL","numero":"NF-1"}"#,
            expected_hash: "dfaeca04a465bee995b10fdd12979c6539d50f268e4424e8a1411ac6e1067862",
        },
        GoldenVector {
            name: "nota fiscal NF-2",
            document: r#"{"tipo":"NOTA_FISCAL","numero":"NF-2"}"#,
            expected_hash: "9894121f3f225f69a12fca64154bc152ddc63544a8f965b8d03e0479c6da614b",
        },
        GoldenVector {
            name: "empty document",
            document: "{}",
            expected_hash: "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
        },
        GoldenVector {
            name: "nested document with non-ASCII text",
            document: r#"{"titulo":"Contrato de Prestação de Serviços","partes":{"contratante":"SBR Prime","valor":15000},"itens":[1,2,3],"ativo":true,"obs":null}"#,
            expected_hash: "153402b79e835eebead476c8e1676a73fa959379e80cf7aa711f86f74c4b95f4",
        },
        GoldenVector {
            name: "nota fiscal NF-1 with keys swapped",
            document: r#"{"numero":"NF-1","tipo":"NOTA_FISCAL"}"#,
            expected_hash: "d9680096efedaf366c01ec0260a8a2fd819dfdb509cf07ddd28781b33af5ce98",
        },
    ]
}

/// Envelope bytes of NF-1 bound at [`fixed_time`] with the default source.
pub const NF1_ENVELOPE: &str = r#"{"document":{"tipo":"NOTA_FISCAL","numero":"NF-1"},"registeredAt":"2025-11-21T12:00:00.000Z","source":"ANCHORCERT","schemaVersion":"1.0","documentHash":"dfaeca04a465bee995b10fdd12979c6539d50f268e4424e8a1411ac6e1067862"}"#;

/// Outer hash of [`NF1_ENVELOPE`].
pub const NF1_ENVELOPE_HASH: &str =
    "f8433f1a8dd51b635e2b2793a1c8c02fda130c24c568b28f5a4527907dec392b";

/// In-memory ledger record hash of payload `{}` at `chain-a` serial 42.
pub const MEMORY_RECORD_HASH: &str =
    "85C8CE921DECAC62031E09205108B89B00213D213E40A44A0C3239D44C7C3ACE";

/// Verify a single vector, returning the computed hash on mismatch.
pub fn verify_vector(vector: &GoldenVector) -> Result<(), String> {
    let document = document_from_str(vector.document).map_err(|e| e.to_string())?;
    let hash = document_hash(&document).map_err(|e| e.to_string())?;
    if hash.to_hex() == vector.expected_hash {
        Ok(())
    } else {
        Err(format!("{}: got {}", vector.name, hash.to_hex()))
    }
}

/// Verify every golden vector, including the envelope and record hashes.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        verify_vector(&vector)?;
    }

    let nf1 = document_from_str(all_vectors()[0].document).map_err(|e| e.to_string())?;
    let binding = HashBinder::default()
        .bind(&nf1, fixed_time())
        .map_err(|e| e.to_string())?;
    if binding.envelope_bytes != NF1_ENVELOPE.as_bytes() {
        return Err(format!(
            "envelope: got {}",
            String::from_utf8_lossy(&binding.envelope_bytes)
        ));
    }
    if binding.envelope_hash.to_hex() != NF1_ENVELOPE_HASH {
        return Err(format!("envelope hash: got {}", binding.envelope_hash));
    }

    let record_hash = MemoryLedger::record_hash(&ChainId::from("chain-a"), 42, b"{}");
    if record_hash != MEMORY_RECORD_HASH {
        return Err(format!("record hash: got {record_hash}"));
    }
    Ok(())
}
