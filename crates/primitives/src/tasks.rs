//! The cross-chain tasks that the bubble contract hands to the off-chain operator dispatch
//! channel.
//!
//! Tasks are one-shot messages. They are never persisted here; delivery and retries are the
//! business of whoever consumes the channel.

use serde::{Deserialize, Serialize};

use crate::{
    asset::AccountAsset,
    types::{Address, BubbleId, TxHash},
};

/// Deploy a contract inside a bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDeployTask {
    /// The parent-chain transaction that requested the deployment.
    pub tx_hash: TxHash,
    /// The block containing that transaction.
    pub block_hash: TxHash,
    /// The target bubble.
    pub bubble_id: BubbleId,
    /// The address of the contract being deployed.
    pub address: Address,
    /// Deployment payload.
    pub data: Vec<u8>,
    /// RPC endpoint of the bubble's primary sub-ledger operator.
    pub rpc: String,
    /// Address of the bubble's primary parent-chain operator.
    pub op_addr: Address,
}

/// Invoke a contract inside a bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCallTask {
    /// The parent-chain transaction that requested the call.
    pub tx_hash: TxHash,
    /// The origin of that transaction.
    pub caller: Address,
    /// The target bubble.
    pub bubble_id: BubbleId,
    /// The contract to invoke.
    pub contract: Address,
    /// Call payload.
    pub data: Vec<u8>,
    /// RPC endpoint of the bubble's primary sub-ledger operator.
    pub rpc: String,
    /// Address of the bubble's primary parent-chain operator.
    pub op_addr: Address,
}

/// Credit staked assets on the sub-ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintTokenTask {
    /// The staking transaction.
    pub tx_hash: TxHash,
    /// The target bubble.
    pub bubble_id: BubbleId,
    /// The staked asset to mint.
    pub acc_asset: AccountAsset,
    /// RPC endpoint of the bubble's primary sub-ledger operator.
    pub rpc: String,
    /// Address of the bubble's primary parent-chain operator.
    pub op_addr: Address,
}

/// Any task that can be posted to the dispatch channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossChainTask {
    /// See [`RemoteDeployTask`].
    RemoteDeploy(RemoteDeployTask),
    /// See [`RemoteCallTask`].
    RemoteCall(RemoteCallTask),
    /// See [`MintTokenTask`].
    MintToken(MintTokenTask),
}

impl CrossChainTask {
    /// The bubble the task targets.
    pub const fn bubble_id(&self) -> &BubbleId {
        match self {
            CrossChainTask::RemoteDeploy(task) => &task.bubble_id,
            CrossChainTask::RemoteCall(task) => &task.bubble_id,
            CrossChainTask::MintToken(task) => &task.bubble_id,
        }
    }

    /// The parent-chain transaction that produced the task.
    pub const fn tx_hash(&self) -> &TxHash {
        match self {
            CrossChainTask::RemoteDeploy(task) => &task.tx_hash,
            CrossChainTask::RemoteCall(task) => &task.tx_hash,
            CrossChainTask::MintToken(task) => &task.tx_hash,
        }
    }

    /// The routing target: the RPC endpoint and operator address the task must be delivered to.
    pub fn route(&self) -> (&str, &Address) {
        match self {
            CrossChainTask::RemoteDeploy(task) => (&task.rpc, &task.op_addr),
            CrossChainTask::RemoteCall(task) => (&task.rpc, &task.op_addr),
            CrossChainTask::MintToken(task) => (&task.rpc, &task.op_addr),
        }
    }
}

impl std::fmt::Display for CrossChainTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let display_str = match self {
            CrossChainTask::RemoteDeploy(task) => format!(
                "RemoteDeploy (bubble_id: {}, address: {:?})",
                task.bubble_id, task.address
            ),
            CrossChainTask::RemoteCall(task) => format!(
                "RemoteCall (bubble_id: {}, contract: {:?})",
                task.bubble_id, task.contract
            ),
            CrossChainTask::MintToken(task) => format!(
                "MintToken (bubble_id: {}, account: {:?})",
                task.bubble_id, task.acc_asset.account
            ),
        };
        write!(f, "{}", display_str)
    }
}

impl From<RemoteDeployTask> for CrossChainTask {
    fn from(task: RemoteDeployTask) -> Self {
        CrossChainTask::RemoteDeploy(task)
    }
}

impl From<RemoteCallTask> for CrossChainTask {
    fn from(task: RemoteCallTask) -> Self {
        CrossChainTask::RemoteCall(task)
    }
}

impl From<MintTokenTask> for CrossChainTask {
    fn from(task: MintTokenTask) -> Self {
        CrossChainTask::MintToken(task)
    }
}
