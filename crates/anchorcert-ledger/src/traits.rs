//! LedgerGateway trait: the narrow put/get contract the engine relies on.
//!
//! The ledger itself is external. Implementations include an HTTP adapter
//! for a ledger node and an in-memory ledger for tests.

use std::sync::Arc;

use anchorcert_core::{ChainId, ChainInfo, LedgerRecord, Serial, Submission};
use async_trait::async_trait;

use crate::error::Result;

/// Async interface to an append-only ledger.
///
/// # Design Notes
///
/// - **No retries**: a failed `submit` is reported once. Retrying may anchor
///   the same envelope twice.
/// - **Not found is data**: `fetch_record` returns `Ok(None)` for a serial the
///   chain does not have. Errors are reserved for transport and protocol
///   failures.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// List the chains the ledger exposes, in the ledger's order.
    async fn list_chains(&self) -> Result<Vec<ChainInfo>>;

    /// Append envelope bytes to a chain.
    ///
    /// # Returns
    /// The serial the ledger assigned, plus network and reference labels when
    /// the ledger reports them.
    async fn submit(&self, chain_id: &ChainId, envelope: &[u8]) -> Result<Submission>;

    /// Read the record at `(chain_id, serial)`.
    async fn fetch_record(&self, chain_id: &ChainId, serial: Serial)
        -> Result<Option<LedgerRecord>>;

    /// Read one page of a chain's records in serial order.
    ///
    /// Pages are zero-based. A page past the end is empty. An unknown chain
    /// is an error, as the ledger answers it with a status.
    async fn list_records(
        &self,
        chain_id: &ChainId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<LedgerRecord>>;
}

#[async_trait]
impl<L: LedgerGateway + ?Sized> LedgerGateway for Arc<L> {
    async fn list_chains(&self) -> Result<Vec<ChainInfo>> {
        (**self).list_chains().await
    }

    async fn submit(&self, chain_id: &ChainId, envelope: &[u8]) -> Result<Submission> {
        (**self).submit(chain_id, envelope).await
    }

    async fn fetch_record(
        &self,
        chain_id: &ChainId,
        serial: Serial,
    ) -> Result<Option<LedgerRecord>> {
        (**self).fetch_record(chain_id, serial).await
    }

    async fn list_records(
        &self,
        chain_id: &ChainId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<LedgerRecord>> {
        (**self).list_records(chain_id, page, page_size).await
    }
}

#[async_trait]
impl<L: LedgerGateway + ?Sized> LedgerGateway for &L {
    async fn list_chains(&self) -> Result<Vec<ChainInfo>> {
        (**self).list_chains().await
    }

    async fn submit(&self, chain_id: &ChainId, envelope: &[u8]) -> Result<Submission> {
        (**self).submit(chain_id, envelope).await
    }

    async fn fetch_record(
        &self,
        chain_id: &ChainId,
        serial: Serial,
    ) -> Result<Option<LedgerRecord>> {
        (**self).fetch_record(chain_id, serial).await
    }

    async fn list_records(
        &self,
        chain_id: &ChainId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<LedgerRecord>> {
        (**self).list_records(chain_id, page, page_size).await
    }
}

/// Extension trait for lookups built on the gateway primitives.
pub trait LedgerGatewayExt: LedgerGateway {
    /// Find a serial on any listed chain.
    ///
    /// Chains are tried in listing order and the first hit wins. Serials are
    /// only unique per chain, so when several chains hold the serial the
    /// answer depends on the ledger's listing order.
    fn find_record(
        &self,
        serial: Serial,
    ) -> impl std::future::Future<Output = Result<Option<(ChainInfo, LedgerRecord)>>> + Send;

    /// Look up a chain by id in the ledger's listing.
    fn find_chain(
        &self,
        chain_id: &ChainId,
    ) -> impl std::future::Future<Output = Result<Option<ChainInfo>>> + Send;
}

impl<L: LedgerGateway + ?Sized> LedgerGatewayExt for L {
    async fn find_record(&self, serial: Serial) -> Result<Option<(ChainInfo, LedgerRecord)>> {
        let chains = self.list_chains().await?;
        for chain in chains {
            if let Some(record) = self.fetch_record(&chain.id, serial).await? {
                return Ok(Some((chain, record)));
            }
        }
        Ok(None)
    }

    async fn find_chain(&self, chain_id: &ChainId) -> Result<Option<ChainInfo>> {
        let chains = self.list_chains().await?;
        Ok(chains.into_iter().find(|c| &c.id == chain_id))
    }
}
