//! Scalar types shared by every crate in the workspace.

use primitive_types::{H160, H256, H512, U256};

/// An account or contract address on the parent chain.
pub type Address = H160;

/// A 32-byte transaction or block hash.
pub type TxHash = H256;

/// The unique identifier of a bubble.
pub type BubbleId = U256;

/// The identifier of a node, i.e. its uncompressed public key without the prefix byte.
pub type NodeId = H512;

/// A block number on the parent chain.
pub type BlockNumber = u64;

/// The size class of a bubble.
///
/// The meaning of each code (operator counts, staking minimum) is defined by the parameters, not
/// by this type.
pub type SizeCode = u8;

/// The all-zero transaction hash that marks a gas-estimation (dry-run) invocation.
pub const ESTIMATION_TX_HASH: TxHash = H256::zero();

/// Returns `true` if the transaction hash is the gas-estimation sentinel.
pub fn is_estimation(tx_hash: &TxHash) -> bool {
    *tx_hash == ESTIMATION_TX_HASH
}

/// Converts a bubble id into the fixed-width big-endian representation used in topics.
pub fn bubble_id_to_h256(bubble_id: BubbleId) -> H256 {
    let mut bytes = [0u8; 32];
    bubble_id.to_big_endian(&mut bytes);
    H256::from(bytes)
}
