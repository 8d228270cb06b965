//! Configuration and collaborators of the bubble contract.

use std::fmt::Debug;

use bubble_params::BubbleParams;
use bubble_primitives::{
    host::{NodePool, NonceHistory, TaskSink},
    types::{Address, NodeId},
};

/// The system accounts the contract moves funds through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemAccounts {
    /// The address logs are emitted from.
    pub contract: Address,
    /// The account holding staked and escrowed funds.
    pub custody: Address,
}

impl SystemAccounts {
    /// Reads the accounts from the parameters.
    pub const fn from_params(params: &BubbleParams) -> Self {
        Self {
            contract: params.contract_address,
            custody: params.custody_address,
        }
    }
}

/// Static configuration of the contract on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCfg {
    /// Consensus parameters.
    pub params: BubbleParams,

    /// The node executing the contract.
    ///
    /// Only decides whether cross-chain tasks are posted; the state transition is the same on
    /// every node.
    pub local_node: NodeId,

    /// See [`SystemAccounts`].
    pub accounts: SystemAccounts,
}

impl ContractCfg {
    /// Creates the configuration of the node `local_node`.
    pub fn new(params: BubbleParams, local_node: NodeId) -> Self {
        let accounts = SystemAccounts::from_params(&params);

        Self {
            params,
            local_node,
            accounts,
        }
    }
}

/// The node-side services the contract reads from and posts to.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    /// The registry of candidate operators.
    pub node_pool: &'a dyn NodePool,
    /// The VRF nonce history.
    pub nonce_history: &'a dyn NonceHistory,
    /// The cross-chain task channel.
    pub tasks: &'a dyn TaskSink,
}

impl Debug for Services<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
