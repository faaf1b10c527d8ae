//! In-memory implementation of the LedgerGateway trait.
//!
//! This is primarily for testing. It behaves like a ledger node: chains keep
//! their insertion order, serials grow by one per submission, and every record
//! carries a ledger-computed hash. Nothing is persisted.

use std::collections::BTreeMap;

use anchorcert_core::record::encode_payload;
use anchorcert_core::{timefmt, ChainId, ChainInfo, LedgerRecord, Serial, Sha256Hash, Submission};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{LedgerError, Result};
use crate::traits::LedgerGateway;

/// Network label reported by the in-memory ledger unless overridden.
pub const DEFAULT_NETWORK: &str = "Memory";

/// Application id stamped on records unless overridden.
pub const DEFAULT_APPLICATION_ID: u64 = 8;

/// In-memory ledger.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock.
pub struct MemoryLedger {
    inner: RwLock<MemoryLedgerInner>,
    network: String,
    application_id: u64,
}

struct MemoryLedgerInner {
    /// Chains in listing order.
    chains: Vec<MemoryChain>,
}

struct MemoryChain {
    info: ChainInfo,
    records: BTreeMap<Serial, LedgerRecord>,
}

impl MemoryLedgerInner {
    fn chain_mut(&mut self, chain_id: &ChainId) -> Option<&mut MemoryChain> {
        self.chains.iter_mut().find(|c| &c.info.id == chain_id)
    }
}

impl MemoryLedger {
    /// Create a ledger with no chains.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryLedgerInner { chains: Vec::new() }),
            network: DEFAULT_NETWORK.to_string(),
            application_id: DEFAULT_APPLICATION_ID,
        }
    }

    /// Set the network label reported in submissions and records.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    /// Add an empty chain. The first submission gets serial 1.
    pub fn with_chain(self, id: impl Into<ChainId>, name: impl Into<String>) -> Self {
        self.with_chain_at(id, name, 0)
    }

    /// Add a chain whose last record is `last_record`.
    ///
    /// The next submission gets `last_record + 1`. Earlier serials are not
    /// materialised; use [`MemoryLedger::insert_record`] to place records there.
    pub fn with_chain_at(
        mut self,
        id: impl Into<ChainId>,
        name: impl Into<String>,
        last_record: Serial,
    ) -> Self {
        self.inner.get_mut().chains.push(MemoryChain {
            info: ChainInfo {
                id: id.into(),
                name: name.into(),
                description: None,
                last_record,
            },
            records: BTreeMap::new(),
        });
        self
    }

    /// Record hash the way this ledger computes it.
    ///
    /// Upper-case hex SHA-256 over the chain id, the decimal serial and the
    /// payload bytes, concatenated.
    pub fn record_hash(chain_id: &ChainId, serial: Serial, payload: &[u8]) -> String {
        Sha256Hash::hash_parts(&[
            chain_id.as_str().as_bytes(),
            serial.to_string().as_bytes(),
            payload,
        ])
        .to_hex()
        .to_uppercase()
    }

    /// Place `payload` at an arbitrary serial, replacing any record there.
    ///
    /// Test hook: lets a test put the same serial on several chains, or
    /// anchor a payload that is not an envelope.
    pub async fn insert_record(
        &self,
        chain_id: &ChainId,
        serial: Serial,
        payload: &[u8],
    ) -> Result<LedgerRecord> {
        let record = self.make_record(chain_id, serial, payload);
        self.put_record(chain_id, record.clone()).await?;
        Ok(record)
    }

    /// Store a fully formed record as-is.
    pub async fn put_record(&self, chain_id: &ChainId, record: LedgerRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        let chain = inner.chain_mut(chain_id).ok_or_else(|| unknown_chain(chain_id))?;
        chain.info.last_record = chain.info.last_record.max(record.serial);
        chain.records.insert(record.serial, record);
        Ok(())
    }

    /// Number of records stored on a chain.
    pub async fn record_count(&self, chain_id: &ChainId) -> usize {
        let inner = self.inner.read().await;
        inner
            .chains
            .iter()
            .find(|c| &c.info.id == chain_id)
            .map(|c| c.records.len())
            .unwrap_or(0)
    }

    fn make_record(&self, chain_id: &ChainId, serial: Serial, payload: &[u8]) -> LedgerRecord {
        LedgerRecord {
            serial,
            chain_id: Some(chain_id.clone()),
            hash: Self::record_hash(chain_id, serial, payload),
            payload_bytes: encode_payload(payload),
            application_id: Some(self.application_id),
            payload_tag_id: None,
            record_type: Some("Data".to_string()),
            version: Some(1),
            network: Some(self.network.clone()),
            created_at: Some(timefmt::format(&Utc::now())),
            reference: Some(self.reference(chain_id, serial)),
        }
    }

    fn reference(&self, chain_id: &ChainId, serial: Serial) -> String {
        format!("{}:{}@{}", self.network, chain_id, serial)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn unknown_chain(chain_id: &ChainId) -> LedgerError {
    LedgerError::Submission {
        status: 404,
        body: format!("chain not found: {chain_id}"),
    }
}

#[async_trait]
impl LedgerGateway for MemoryLedger {
    async fn list_chains(&self) -> Result<Vec<ChainInfo>> {
        let inner = self.inner.read().await;
        Ok(inner.chains.iter().map(|c| c.info.clone()).collect())
    }

    async fn submit(&self, chain_id: &ChainId, envelope: &[u8]) -> Result<Submission> {
        let mut inner = self.inner.write().await;
        let chain = inner.chain_mut(chain_id).ok_or_else(|| unknown_chain(chain_id))?;

        let serial = chain.info.last_record + 1;
        let record = self.make_record(chain_id, serial, envelope);
        chain.records.insert(serial, record);
        chain.info.last_record = serial;

        Ok(Submission {
            serial,
            network: Some(self.network.clone()),
            reference: Some(self.reference(chain_id, serial)),
        })
    }

    async fn fetch_record(
        &self,
        chain_id: &ChainId,
        serial: Serial,
    ) -> Result<Option<LedgerRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .chains
            .iter()
            .find(|c| &c.info.id == chain_id)
            .and_then(|c| c.records.get(&serial).cloned()))
    }

    async fn list_records(
        &self,
        chain_id: &ChainId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<LedgerRecord>> {
        let inner = self.inner.read().await;
        let chain = inner
            .chains
            .iter()
            .find(|c| &c.info.id == chain_id)
            .ok_or_else(|| LedgerError::UnexpectedStatus {
                status: 404,
                body: format!("chain not found: {chain_id}"),
            })?;

        let skip = page as usize * page_size as usize;
        Ok(chain
            .records
            .values()
            .skip(skip)
            .take(page_size as usize)
            .cloned()
            .collect())
    }
}
