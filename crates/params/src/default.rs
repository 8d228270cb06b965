//! Default values for the bubble parameters.

use bubble_primitives::{constants::BASIS_POINTS, types::Address};
use primitive_types::H160;

/// Default address of the bubble system contract.
///
/// The contract's own balance is the custody wallet for every bubble.
pub(crate) const BUBBLE_CONTRACT_ADDRESS: Address = H160([
    0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x02,
]);

/// Default ceiling of the node use ratio (in basis points) below which new bubbles are created.
pub(crate) const MAX_NODE_USE_RATIO_BPS: u32 = BASIS_POINTS * 8 / 10;

/// Flat gas charged for any non-empty call into the contract.
pub(crate) const BUBBLE_GAS: u64 = 21_000;

pub(crate) const ALLOT_BUBBLE_GAS: u64 = 32_000;
pub(crate) const UPDATE_STATE_GAS: u64 = 16_000;
pub(crate) const STAKING_TOKEN_GAS: u64 = 24_000;
pub(crate) const WITHDREW_TOKEN_GAS: u64 = 24_000;
pub(crate) const SETTLE_BUBBLE_GAS: u64 = 32_000;
pub(crate) const REMOTE_DEPLOY_GAS: u64 = 32_000;
pub(crate) const REMOTE_CALL_GAS: u64 = 21_000;
pub(crate) const REMOTE_CALL_EXECUTOR_GAS: u64 = 21_000;
pub(crate) const REMOTE_CLEAR_GAS: u64 = 16_000;

/// Minimum staking amounts of the default size classes, in wei.
pub(crate) const SMALL_MIN_STAKING: &str = "1000000000000000000";
pub(crate) const MEDIUM_MIN_STAKING: &str = "5000000000000000000";
pub(crate) const LARGE_MIN_STAKING: &str = "10000000000000000000";
