//! Static stand-ins for the node-side services.

use std::cell::RefCell;

use bubble_primitives::{
    host::{
        CandidateNode, NodePool, NodeRole, NonceHistory, ServiceError, TaskSink, TaskSinkError,
    },
    tasks::CrossChainTask,
};
use primitive_types::H256;

use crate::generators::{generate_address, generate_node_id};

/// A [`NodePool`] with a fixed set of candidates.
#[derive(Debug, Clone, Default)]
pub struct StaticNodePool {
    candidates: Vec<CandidateNode>,
    unavailable: bool,
}

impl StaticNodePool {
    /// Creates a pool of the given candidates.
    pub fn new(candidates: Vec<CandidateNode>) -> Self {
        Self {
            candidates,
            unavailable: false,
        }
    }

    /// Creates a pool of `l1` random parent-chain and `l2` random sub-ledger candidates.
    pub fn generate(l1: usize, l2: usize) -> Self {
        let l1_nodes = (0..l1).map(|_| CandidateNode {
            node_id: generate_node_id(),
            role: NodeRole::L1Operator,
            op_addr: generate_address(),
            rpc: String::new(),
        });
        let l2_nodes = (0..l2).map(|i| CandidateNode {
            node_id: generate_node_id(),
            role: NodeRole::L2Operator,
            op_addr: generate_address(),
            rpc: format!("http://127.0.0.1:{}", 8545 + i),
        });

        Self::new(l1_nodes.chain(l2_nodes).collect())
    }

    /// Creates a pool whose every query fails.
    pub fn unavailable() -> Self {
        Self {
            candidates: Vec::new(),
            unavailable: true,
        }
    }

    /// The candidates of the pool.
    pub fn nodes(&self) -> &[CandidateNode] {
        &self.candidates
    }
}

impl NodePool for StaticNodePool {
    fn candidates(&self, block_hash: &H256) -> Result<Vec<CandidateNode>, ServiceError> {
        if self.unavailable {
            return Err(ServiceError::NodePool {
                block: *block_hash,
                reason: "pool unavailable".to_string(),
            });
        }

        Ok(self.candidates.clone())
    }
}

/// A [`NonceHistory`] that always returns the same nonces.
#[derive(Debug, Clone, Default)]
pub struct FixedNonceHistory {
    nonces: Vec<Vec<u8>>,
    unavailable: bool,
}

impl FixedNonceHistory {
    /// Creates a history returning `nonces`.
    pub fn new(nonces: Vec<Vec<u8>>) -> Self {
        Self {
            nonces,
            unavailable: false,
        }
    }

    /// Creates a history whose every query fails.
    pub fn unavailable() -> Self {
        Self {
            nonces: Vec::new(),
            unavailable: true,
        }
    }
}

impl NonceHistory for FixedNonceHistory {
    fn load(&self, parent_hash: &H256) -> Result<Vec<Vec<u8>>, ServiceError> {
        if self.unavailable {
            return Err(ServiceError::NonceHistory {
                parent: *parent_hash,
                reason: "history unavailable".to_string(),
            });
        }

        Ok(self.nonces.clone())
    }
}

/// A [`TaskSink`] that keeps every posted task.
#[derive(Debug, Default)]
pub struct RecordingTaskSink {
    tasks: RefCell<Vec<CrossChainTask>>,
    closed: bool,
}

impl RecordingTaskSink {
    /// Creates an open sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that rejects every task.
    pub fn closed() -> Self {
        Self {
            tasks: RefCell::new(Vec::new()),
            closed: true,
        }
    }

    /// The tasks posted so far.
    pub fn tasks(&self) -> Vec<CrossChainTask> {
        self.tasks.borrow().clone()
    }
}

impl TaskSink for RecordingTaskSink {
    fn post(&self, task: CrossChainTask) -> Result<(), TaskSinkError> {
        if self.closed {
            return Err(TaskSinkError::Closed(task.to_string()));
        }

        self.tasks.borrow_mut().push(task);
        Ok(())
    }
}
