//! Storage key derivation for bubble records.
//!
//! Per-bubble keys have the shape `prefix ‖ rlp(bubble_id) [‖ suffix]`. Global indices (size
//! classes, node occupancy, the id counter) are keyed by their prefix and selector alone. Every
//! prefix here is part of the on-disk layout.

use crate::{
    bubble::BubTxType,
    types::{Address, BubbleId, NodeId, SizeCode, TxHash},
};

/// Prefix of [`BubbleBasics`](crate::bubble::BubbleBasics) records.
pub const BUBBLE_PREFIX: &[u8] = b"Bubble";
/// Prefix of per-bubble account lists.
pub const ACC_LIST_PREFIX: &[u8] = b"AccList";
/// Prefix of per-account asset records.
pub const ACC_ASSET_PREFIX: &[u8] = b"AccAsset";
/// Prefix of the L2 to L1 settlement hash mapping.
pub const TX_HASH_PREFIX: &[u8] = b"TxHash";
/// Prefix of [`BubbleStatus`](crate::bubble::BubbleStatus) records.
pub const BUB_STATUS_PREFIX: &[u8] = b"BubStatus";
/// Prefix of per-type transaction histories.
pub const BUB_TX_LIST_PREFIX: &[u8] = b"BubTxList";
/// Prefix of remotely deployed contract registrations.
pub const BUB_CONTRACT_PREFIX: &[u8] = b"BubContract";
/// Prefix of the bubble-local bytecode cache.
pub const BYTE_CODE_PREFIX: &[u8] = b"ByteCode";
/// Prefix of the size-class index.
pub const BUB_SIZE_PREFIX: &[u8] = b"BubSize";
/// Prefix of node occupancy records.
pub const NODE_BUBBLE_PREFIX: &[u8] = b"NodeBubble";
/// Key of the bubble id counter.
pub const BUBBLE_COUNTER_KEY: &[u8] = b"BubbleCounter";

fn bubble_key(prefix: &[u8], bubble_id: &BubbleId, suffix: &[u8]) -> Vec<u8> {
    let encoded_id = rlp::encode(bubble_id);

    let mut key = Vec::with_capacity(prefix.len() + encoded_id.len() + suffix.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(&encoded_id);
    key.extend_from_slice(suffix);
    key
}

/// Key of the basics of a bubble.
pub fn bubble_basics(bubble_id: &BubbleId) -> Vec<u8> {
    bubble_key(BUBBLE_PREFIX, bubble_id, &[])
}

/// Key of the list of accounts that staked into a bubble.
pub fn acc_list(bubble_id: &BubbleId) -> Vec<u8> {
    bubble_key(ACC_LIST_PREFIX, bubble_id, &[])
}

/// Key of the asset of `account` inside a bubble.
pub fn acc_asset(bubble_id: &BubbleId, account: &Address) -> Vec<u8> {
    bubble_key(ACC_ASSET_PREFIX, bubble_id, account.as_bytes())
}

/// Key of the parent-chain hash of the settlement identified by `l2_hash`.
pub fn l1_hash_by_l2_hash(bubble_id: &BubbleId, l2_hash: &TxHash) -> Vec<u8> {
    bubble_key(TX_HASH_PREFIX, bubble_id, l2_hash.as_bytes())
}

/// Key of the lifecycle status of a bubble.
pub fn bubble_status(bubble_id: &BubbleId) -> Vec<u8> {
    bubble_key(BUB_STATUS_PREFIX, bubble_id, &[])
}

/// Key of the history of transactions of type `tx_type` recorded against a bubble.
pub fn tx_hash_list(bubble_id: &BubbleId, tx_type: BubTxType) -> Vec<u8> {
    bubble_key(BUB_TX_LIST_PREFIX, bubble_id, &[tx_type as u8])
}

/// Key of the registration of the contract at `address` inside a bubble.
pub fn bub_contract(bubble_id: &BubbleId, address: &Address) -> Vec<u8> {
    bubble_key(BUB_CONTRACT_PREFIX, bubble_id, address.as_bytes())
}

/// Key of the bytecode cached for `address` inside a bubble.
pub fn byte_code(bubble_id: &BubbleId, address: &Address) -> Vec<u8> {
    bubble_key(BYTE_CODE_PREFIX, bubble_id, address.as_bytes())
}

/// Key of the ids of bubbles of the given size class.
pub fn bubbles_by_size(size: SizeCode) -> Vec<u8> {
    let mut key = BUB_SIZE_PREFIX.to_vec();
    key.push(size);
    key
}

/// Key of the bubble a node is currently serving.
pub fn node_bubble(node_id: &NodeId) -> Vec<u8> {
    let mut key = NODE_BUBBLE_PREFIX.to_vec();
    key.extend_from_slice(node_id.as_bytes());
    key
}
