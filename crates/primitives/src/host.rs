//! The interfaces through which the bubble contract reaches its collaborators.
//!
//! None of these are implemented for production here: the virtual machine, the candidate node
//! registry, the VRF nonce history and the dispatch channel all belong to the host node.

use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    tasks::CrossChainTask,
    types::{Address, BlockNumber, NodeId, TxHash},
};

/// The block the current transaction executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockContext {
    /// Height of the block.
    pub number: BlockNumber,
    /// Hash of the block.
    pub hash: H256,
    /// Hash of the parent block.
    pub parent_hash: H256,
}

/// A single, immutable message call into the virtual machine.
///
/// A new frame is built for every sub-call; nothing is shared with the frame of the outer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    /// The account the callee sees as its caller.
    pub caller: Address,
    /// The account whose storage the call executes against.
    pub address: Address,
    /// The account whose code is executed.
    pub code_address: Address,
    /// The hash of the executed code.
    pub code_hash: H256,
    /// The executed code.
    pub code: Vec<u8>,
    /// Calldata.
    pub input: Vec<u8>,
    /// Value transferred with the call.
    pub value: U256,
    /// Gas made available to the call.
    pub gas: u64,
}

/// The result of a successful call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallOutcome {
    /// Data returned by the callee.
    pub output: Vec<u8>,
    /// Gas consumed by the call.
    pub gas_used: u64,
}

/// Reasons a virtual-machine call can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// The callee reverted.
    #[error("execution reverted")]
    Reverted {
        /// Data returned along with the revert.
        output: Vec<u8>,
        /// Gas consumed before the revert.
        gas_used: u64,
    },

    /// The call ran out of gas.
    #[error("out of gas")]
    OutOfGas,

    /// Any other failure reported by the machine.
    #[error("{0}")]
    Other(String),
}

impl ExecError {
    /// Gas consumed by the failed call.
    pub const fn gas_used(&self, gas_limit: u64) -> u64 {
        match self {
            ExecError::Reverted { gas_used, .. } => *gas_used,
            ExecError::OutOfGas | ExecError::Other(_) => gas_limit,
        }
    }
}

/// A log entry emitted through the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// The emitting account.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<H256>,
    /// Payload.
    pub data: Vec<u8>,
}

/// The execution environment of the contract: the parent chain's virtual machine and state.
pub trait EvmHost {
    /// The block the current transaction executes in.
    fn block(&self) -> BlockContext;

    /// The hash of the current transaction; zero during gas estimation.
    fn tx_hash(&self) -> TxHash;

    /// The external account that signed the current transaction.
    fn origin(&self) -> Address;

    /// The nonce of `address`.
    fn nonce(&self, address: &Address) -> u64;

    /// The native balance of `address`.
    fn balance(&self, address: &Address) -> U256;

    /// Credits `amount` to `address`.
    fn add_balance(&mut self, address: &Address, amount: U256);

    /// Debits `amount` from `address`.
    ///
    /// Callers check the balance beforehand.
    fn sub_balance(&mut self, address: &Address, amount: U256);

    /// The code deployed at `address`; empty when there is none.
    fn code(&self, address: &Address) -> Vec<u8>;

    /// The hash of the code deployed at `address`.
    fn code_hash(&self, address: &Address) -> H256;

    /// Takes a snapshot of the state and returns its id.
    fn snapshot(&mut self) -> usize;

    /// Undoes every state change made since the snapshot `id` was taken.
    fn revert_to_snapshot(&mut self, id: usize);

    /// Executes `frame` to completion.
    fn call(&mut self, frame: CallFrame) -> Result<CallOutcome, ExecError>;

    /// Appends a log entry to the current transaction's receipt.
    fn add_log(&mut self, log: Log);
}

/// Errors reported by the node-side services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The candidate node registry could not be read.
    #[error("candidate nodes unavailable at block {block:?}: {reason}")]
    NodePool {
        /// Hash of the queried block.
        block: H256,
        /// What went wrong.
        reason: String,
    },

    /// The nonce history could not be read.
    #[error("nonce history unavailable for parent {parent:?}: {reason}")]
    NonceHistory {
        /// Hash of the queried parent block.
        parent: H256,
        /// What went wrong.
        reason: String,
    },
}

/// The role a candidate node may take in a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Operates the bubble on the parent chain.
    L1Operator,
    /// Operates the bubble's sub-ledger.
    L2Operator,
}

/// A node that may be picked as a bubble operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateNode {
    /// The node.
    pub node_id: NodeId,
    /// The role it can take.
    pub role: NodeRole,
    /// The address it transacts from.
    pub op_addr: Address,
    /// Its RPC endpoint; only meaningful for sub-ledger operators.
    #[serde(default)]
    pub rpc: String,
}

/// The registry of nodes that may be picked as bubble operators.
pub trait NodePool {
    /// All candidates registered as of the block `block_hash`.
    fn candidates(&self, block_hash: &H256) -> Result<Vec<CandidateNode>, ServiceError>;
}

/// The VRF nonce history of the parent chain.
pub trait NonceHistory {
    /// The nonces recorded up to the block `parent_hash`, oldest first.
    fn load(&self, parent_hash: &H256) -> Result<Vec<Vec<u8>>, ServiceError>;
}

/// Errors raised when posting a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskSinkError {
    /// The consumer side of the channel is gone.
    #[error("task channel closed, dropped {0}")]
    Closed(String),
}

/// The channel cross-chain tasks are handed to.
pub trait TaskSink {
    /// Enqueues `task`.
    fn post(&self, task: CrossChainTask) -> Result<(), TaskSinkError>;
}

impl TaskSink for UnboundedSender<CrossChainTask> {
    fn post(&self, task: CrossChainTask) -> Result<(), TaskSinkError> {
        self.send(task)
            .map_err(|err| TaskSinkError::Closed(err.0.to_string()))
    }
}
