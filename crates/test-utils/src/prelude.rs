//! Re-exports of the most commonly used test utilities.

pub use crate::{
    generators::{generate_address, generate_hash, generate_node_id, generate_u256},
    ledger::InMemoryLedger,
    services::{FixedNonceHistory, RecordingTaskSink, StaticNodePool},
};
