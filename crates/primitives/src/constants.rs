//! Constants that are shared between the contract, its storage layer and the tooling.
//!
//! Changing any of these values changes either the on-chain storage layout or the calldata that
//! is forwarded to token contracts, so they must be identical on every node.

/// The denominator of ratios expressed in basis points.
pub const BASIS_POINTS: u32 = 10_000;

/// The canonical signature of the token transfer function forwarded during staking/withdrawal.
pub const TOKEN_TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";

/// The length of a function selector in bytes.
pub const SELECTOR_LEN: usize = 4;

/// All ABI arguments are padded to 32 bytes.
pub const ABI_WORD_LEN: usize = 32;

/// Left padding applied to a 20-byte address inside an ABI word.
pub const ABI_H160_LEFT_PADDING: [u8; 12] = [0u8; 12];
