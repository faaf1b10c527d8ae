//! # Anchorcert Ledger
//!
//! Gateway abstraction for the external append-only ledger. The engine only
//! ever talks to the ledger through the [`LedgerGateway`] trait.
//!
//! ## Key Types
//!
//! - [`LedgerGateway`] - The async put/get contract
//! - [`LedgerGatewayExt`] - Cross-chain lookups built on top of it
//! - [`HttpLedger`] - REST adapter for a ledger node
//! - [`MemoryLedger`] - In-memory ledger for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use anchorcert_core::ChainId;
//! use anchorcert_ledger::{HttpLedger, HttpLedgerConfig, LedgerGateway};
//!
//! async fn example() {
//!     let config = HttpLedgerConfig::new("https://node.example:32020");
//!     let ledger = HttpLedger::new(config).unwrap();
//!
//!     let chains = ledger.list_chains().await.unwrap();
//!     let record = ledger.fetch_record(&chains[0].id, 42).await.unwrap();
//!     # let _ = (record, ChainId::from("x"));
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Not found is data**: a missing record is `Ok(None)`, never an error
//! - **No retries**: a failed submission is reported once to the caller

pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use error::{LedgerError, Result};
pub use http::{HttpLedger, HttpLedgerConfig};
pub use memory::MemoryLedger;
pub use traits::{LedgerGateway, LedgerGatewayExt};
