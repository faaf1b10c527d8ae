//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Value};

use anchorcert_core::{ChainId, Document, Serial};

/// Generate a JSON leaf value.
///
/// Floats are left out: their text form is not stable across JSON encoders,
/// and documents are hashed over their text form.
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 çãéõ._-]{0,24}".prop_map(Value::String),
    ]
}

/// Generate an arbitrary JSON value, nested up to a few levels.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((field_name(), inner), 0..6)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

/// Generate a document field name.
pub fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,11}"
}

/// Generate a document.
///
/// Field names sometimes collide with envelope metadata keys, which
/// documents are free to use.
pub fn document() -> impl Strategy<Value = Document> {
    let name = prop_oneof![
        4 => field_name(),
        1 => prop::sample::select(vec![
            "source",
            "schemaVersion",
            "registeredAt",
            "documentHash",
            "document",
        ])
        .prop_map(str::to_string),
    ];
    prop::collection::vec((name, json_value()), 0..8)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Generate a non-empty document together with the index of one of its fields.
pub fn document_with_field() -> impl Strategy<Value = (Document, usize)> {
    document()
        .prop_filter("document needs a field", |d| !d.is_empty())
        .prop_flat_map(|d| {
            let len = d.len();
            (Just(d), 0..len)
        })
}

/// Replace the value of the field at `index` with a value that differs from it.
pub fn alter_field(document: &Document, index: usize) -> Document {
    let mut altered = document.clone();
    if let Some((_, value)) = altered.iter_mut().nth(index) {
        *value = json!({ "altered": value.clone() });
    }
    altered
}

/// Generate a chain id.
pub fn chain_id() -> impl Strategy<Value = ChainId> {
    "[A-Za-z0-9_-]{8,43}".prop_map(ChainId::from)
}

/// Generate a serial.
pub fn serial() -> impl Strategy<Value = Serial> {
    any::<u64>()
}

/// Generate a record hash as a ledger would report it, in either case.
pub fn record_hash() -> impl Strategy<Value = String> {
    prop_oneof!["[0-9a-f]{64}", "[0-9A-F]{64}"]
}
