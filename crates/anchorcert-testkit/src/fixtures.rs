//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use anchorcert::{Engine, EngineConfig};
use anchorcert_core::{
    document_from_value, ChainId, Document, HashBinder, LedgerRecord, Serial,
};
use anchorcert_ledger::MemoryLedger;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

/// First listed chain; its last record is 41, so the next serial is 42.
pub const CHAIN_A: &str = "chain-a";
/// Second listed chain, initially empty.
pub const CHAIN_B: &str = "chain-b";

/// A test fixture with an in-memory ledger and an engine over it.
pub struct TestFixture {
    pub ledger: Arc<MemoryLedger>,
    pub engine: Engine<MemoryLedger>,
}

impl TestFixture {
    /// Two chains, `chain-a` (default, last record 41) then `chain-b`.
    pub fn new() -> Self {
        let ledger = MemoryLedger::new()
            .with_chain_at(CHAIN_A, "Chain A", 41)
            .with_chain(CHAIN_B, "Chain B");
        Self::with_ledger(ledger, EngineConfig::new(CHAIN_A))
    }

    /// Wrap an existing ledger.
    pub fn with_ledger(ledger: MemoryLedger, config: EngineConfig) -> Self {
        let ledger = Arc::new(ledger);
        let engine = Engine::with_shared(Arc::clone(&ledger), config);
        Self { ledger, engine }
    }

    pub fn chain_a() -> ChainId {
        ChainId::from(CHAIN_A)
    }

    pub fn chain_b() -> ChainId {
        ChainId::from(CHAIN_B)
    }

    /// Anchor `document` at an arbitrary serial, bypassing the engine's
    /// serial assignment.
    pub async fn anchor_at(
        &self,
        chain_id: &ChainId,
        serial: Serial,
        document: &Document,
    ) -> LedgerRecord {
        let binding = HashBinder::default()
            .bind(document, fixed_time())
            .expect("bindable document");
        self.ledger
            .insert_record(chain_id, serial, &binding.envelope_bytes)
            .await
            .expect("chain exists")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixed registration time: 2025-11-21T12:00:00Z.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 21, 12, 0, 0)
        .single()
        .expect("valid date")
}

/// Build a document from a JSON object literal.
pub fn document(value: Value) -> Document {
    document_from_value(value).expect("document must be a JSON object")
}

/// `{"tipo": "NOTA_FISCAL", "numero": <numero>}`.
pub fn nota_fiscal(numero: &str) -> Document {
    document(json!({"tipo": "NOTA_FISCAL", "numero": numero}))
}

/// A contract with nested objects, arrays and non-ASCII text.
pub fn contract() -> Document {
    document(json!({
        "titulo": "Contrato de Prestação de Serviços",
        "numero": "CNTR-2025-001",
        "partes": {
            "contratante": {"razaoSocial": "SBR Prime Soluções Empresariais Ltda", "cnpj": "12.345.678/0001-90"},
            "contratado": {"nome": "Tech Solutions Ltda"}
        },
        "valor": 15000,
        "clausulas": ["objeto", "prazo", "pagamento"],
        "assinado": true
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorcert_ledger::LedgerGateway;

    #[tokio::test]
    async fn test_fixture_chains() {
        let fixture = TestFixture::new();
        let chains = fixture.ledger.list_chains().await.unwrap();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].id, TestFixture::chain_a());
        assert_eq!(chains[0].last_record, 41);
    }

    #[tokio::test]
    async fn test_anchor_at() {
        let fixture = TestFixture::new();
        let record = fixture
            .anchor_at(&TestFixture::chain_b(), 42, &nota_fiscal("NF-1"))
            .await;
        assert_eq!(record.serial, 42);
        assert_eq!(fixture.ledger.record_count(&TestFixture::chain_b()).await, 1);
    }
}
