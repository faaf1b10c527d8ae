//! # Anchorcert Testkit
//!
//! Testing utilities for anchorcert.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known documents with their expected hashes
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: An engine over an in-memory ledger, plus sample documents
//!
//! ## Golden Vectors
//!
//! ```rust
//! use anchorcert_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().unwrap();
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use anchorcert_core::document_hash;
//! use anchorcert_testkit::generators::document;
//!
//! proptest! {
//!     #[test]
//!     fn hash_is_deterministic(d in document()) {
//!         prop_assert_eq!(document_hash(&d).unwrap(), document_hash(&d).unwrap());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use anchorcert_testkit::fixtures::{nota_fiscal, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let document = nota_fiscal("NF-1");
//! assert_eq!(document["numero"], "NF-1");
//! # let _ = fixture;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{contract, document, fixed_time, nota_fiscal, TestFixture};
pub use generators::{alter_field, document_with_field};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
