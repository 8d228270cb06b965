//! The gas schedule of the bubble contract.

use serde::{Deserialize, Serialize};

use crate::default::{
    ALLOT_BUBBLE_GAS, BUBBLE_GAS, REMOTE_CALL_EXECUTOR_GAS, REMOTE_CALL_GAS, REMOTE_CLEAR_GAS,
    REMOTE_DEPLOY_GAS, SETTLE_BUBBLE_GAS, STAKING_TOKEN_GAS, UPDATE_STATE_GAS,
    WITHDREW_TOKEN_GAS,
};

/// Gas charged by each operation of the contract.
///
/// The flat `bubble_gas` is what the host reserves for any non-empty call. The per-operation
/// costs are charged up front by the operation itself, before anything is read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasSchedule {
    /// Required gas of any non-empty call.
    pub bubble_gas: u64,

    /// Cost of `allotBubble`.
    pub allot_bubble: u64,

    /// Cost of `updateBubbleState`.
    pub update_state: u64,

    /// Cost of `stakingToken`.
    pub staking_token: u64,

    /// Cost of `withdrewToken`.
    pub withdrew_token: u64,

    /// Cost of `settleBubble`.
    pub settle_bubble: u64,

    /// Cost of `remoteDeploy`.
    pub remote_deploy: u64,

    /// Cost of `remoteCall`.
    pub remote_call: u64,

    /// Cost of `remoteCallExecutor`, not including the gas used by the relayed call.
    pub remote_call_executor: u64,

    /// Cost of `remoteClear`.
    pub remote_clear: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self {
            bubble_gas: BUBBLE_GAS,
            allot_bubble: ALLOT_BUBBLE_GAS,
            update_state: UPDATE_STATE_GAS,
            staking_token: STAKING_TOKEN_GAS,
            withdrew_token: WITHDREW_TOKEN_GAS,
            settle_bubble: SETTLE_BUBBLE_GAS,
            remote_deploy: REMOTE_DEPLOY_GAS,
            remote_call: REMOTE_CALL_GAS,
            remote_call_executor: REMOTE_CALL_EXECUTOR_GAS,
            remote_clear: REMOTE_CLEAR_GAS,
        }
    }
}
