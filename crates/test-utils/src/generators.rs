//! Module to generate random values for testing.

use bubble_primitives::types::{Address, NodeId, TxHash};
use primitive_types::U256;
use rand::{thread_rng, Rng};

/// Generates a random address.
pub fn generate_address() -> Address {
    let mut bytes = [0u8; 20];
    thread_rng().fill(&mut bytes);

    Address::from(bytes)
}

/// Generates a random transaction hash.
///
/// Never returns the all-zero hash, so the result is always a real (non-estimation) hash.
pub fn generate_hash() -> TxHash {
    let mut bytes = [0u8; 32];
    thread_rng().fill(&mut bytes);
    bytes[0] |= 0x01;

    TxHash::from(bytes)
}

/// Generates a random node id.
pub fn generate_node_id() -> NodeId {
    let mut bytes = [0u8; 64];
    thread_rng().fill(&mut bytes[..]);

    NodeId::from(bytes)
}

/// Generates a random amount below `max`.
pub fn generate_u256(max: u64) -> U256 {
    U256::from(thread_rng().gen_range(0..max.max(1)))
}
