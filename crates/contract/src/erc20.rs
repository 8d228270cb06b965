//! Calldata of the token transfers forwarded by the asset bridge.

use bubble_primitives::{
    constants::{ABI_H160_LEFT_PADDING, ABI_WORD_LEN, SELECTOR_LEN, TOKEN_TRANSFER_SIGNATURE},
    hashing::function_selector,
    types::Address,
};
use primitive_types::U256;

/// Encodes a call to `transfer(to, amount)`.
pub(crate) fn transfer_calldata(to: &Address, amount: &U256) -> Vec<u8> {
    let mut input = Vec::with_capacity(SELECTOR_LEN + 2 * ABI_WORD_LEN);
    input.extend_from_slice(&function_selector(TOKEN_TRANSFER_SIGNATURE));

    input.extend_from_slice(&ABI_H160_LEFT_PADDING);
    input.extend_from_slice(to.as_bytes());

    let mut amount_word = [0u8; ABI_WORD_LEN];
    amount.to_big_endian(&mut amount_word);
    input.extend_from_slice(&amount_word);

    input
}
