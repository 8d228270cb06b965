//! Errors raised by the bubble contract.
//!
//! [`BubbleError`]s are business failures: they are turned into a failure receipt carrying a
//! stable code and the transition completes normally. [`FatalError`]s abort the transition.

use bubble_db::DbError;
use bubble_params::errors::ParamsError;
use bubble_primitives::{
    bubble::BubbleState,
    host::{ServiceError, TaskSinkError},
    types::{Address, BubbleId, SizeCode},
};
use thiserror::Error;

use crate::dispatch::DecodeError;

/// Code of a successful outcome.
pub const SUCCESS_CODE: u32 = 0;

/// Business failures of the bubble contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BubbleError {
    /// The bubble, or its status, is not recorded.
    #[error("the bubble does not exist")]
    BubbleNotExist,

    /// The bubble has been released.
    #[error("the bubble has been released")]
    BubbleIsReleased,

    /// The bubble has not been released yet.
    #[error("the bubble has not been released")]
    BubbleIsNotReleased,

    /// The bubble is about to be released.
    #[error("the bubble is ready to release")]
    BubbleIsPreRelease,

    /// The staked asset belongs to another account.
    #[error("the staking account does not match the caller")]
    StakingAccount,

    /// The paying account, the caller or the custody account, cannot afford the operation.
    #[error("the account's balance is not enough")]
    AccountNoEnough,

    /// No code is deployed at the token address.
    #[error("the token contract {0:?} does not exist")]
    TokenNotExist(Address),

    /// The token contract rejected the transfer.
    #[error("the token transfer of {0:?} failed")]
    TokenTransferFailed(Address),

    /// The sender is not the bubble's primary sub-ledger operator.
    #[error("the sender is not the sub-chain operator")]
    NotSubChainOperator,

    /// The settlement does not cover exactly the accounts of the bubble.
    #[error("the settlement does not match the bubble's account list")]
    SettleAccListMismatch,

    /// The settlement contains an account without a staked asset.
    #[error("the settled account {0:?} has no staked asset")]
    SettleAccNotExist(Address),

    /// The escrowed amount is below the size class minimum.
    #[error("staking amount is too low")]
    StakingAmountTooLow,

    /// No bytecode is known for the contract.
    #[error("the contract code is empty or abnormal")]
    EmptyContractCode,

    /// The contract is already registered in the bubble.
    #[error("the contract already exists in the bubble")]
    ContractIsExist,

    /// The contract is not registered in the bubble.
    #[error("the contract does not exist in the bubble")]
    ContractNotExist,

    /// The sender is not the bubble's primary operator.
    #[error("the sender is not the operator")]
    SenderIsNotOperator,

    /// The sender did not deploy the contract.
    #[error("the sender is not the creator")]
    SenderIsNotCreator,

    /// The relayed call failed.
    #[error("the contract returned an error: {0}")]
    ContractReturns(String),

    /// No settlement is recorded under the sub-ledger hash.
    #[error("no settlement is recorded for the hash")]
    L1HashNotFound,

    /// No bubble of the requested size can be elected.
    #[error("no eligible bubble of size {0}")]
    NoEligibleBubble(SizeCode),

    /// The account has no asset in the bubble.
    #[error("the account asset does not exist")]
    AccountAssetNotExist,

    /// The requested lifecycle transition is not allowed.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// The current state.
        from: BubbleState,
        /// The requested state.
        to: BubbleState,
    },

    /// There are not enough free candidate nodes for a new bubble.
    #[error("not enough free nodes for a bubble of size {0}")]
    InsufficientNodes(SizeCode),

    /// The size class is not configured.
    #[error("size class {0} is not configured")]
    UnknownSizeCode(SizeCode),

    /// A query could not be answered.
    #[error("query failed: {0}")]
    QueryFailed(String),
}

impl BubbleError {
    /// The stable code reported in failure receipts.
    pub const fn code(&self) -> u32 {
        match self {
            BubbleError::BubbleNotExist => 310001,
            BubbleError::BubbleIsReleased => 310002,
            BubbleError::BubbleIsNotReleased => 310003,
            BubbleError::BubbleIsPreRelease => 310004,
            BubbleError::StakingAccount => 310005,
            BubbleError::AccountNoEnough => 310006,
            BubbleError::TokenNotExist(_) => 310007,
            BubbleError::TokenTransferFailed(_) => 310008,
            BubbleError::NotSubChainOperator => 310009,
            BubbleError::SettleAccListMismatch => 310010,
            BubbleError::SettleAccNotExist(_) => 310011,
            BubbleError::StakingAmountTooLow => 310012,
            BubbleError::EmptyContractCode => 310013,
            BubbleError::ContractIsExist => 310014,
            BubbleError::ContractNotExist => 310015,
            BubbleError::SenderIsNotOperator => 310016,
            BubbleError::SenderIsNotCreator => 310017,
            BubbleError::ContractReturns(_) => 310018,
            BubbleError::L1HashNotFound => 310019,
            BubbleError::NoEligibleBubble(_) => 310020,
            BubbleError::AccountAssetNotExist => 310021,
            BubbleError::InvalidStateTransition { .. } => 310022,
            BubbleError::InsufficientNodes(_) => 310023,
            BubbleError::UnknownSizeCode(_) => 310024,
            BubbleError::QueryFailed(_) => 310025,
        }
    }
}

/// Failures that abort the whole state transition.
#[derive(Debug, Error)]
pub enum FatalError {
    /// The call ran out of gas.
    #[error("out of gas")]
    OutOfGas,

    /// The bubble store failed.
    #[error("store: {0}")]
    Db(#[from] DbError),

    /// A node-side service failed.
    #[error("service: {0}")]
    Service(#[from] ServiceError),

    /// A task could not be handed to the dispatch channel.
    #[error("task dispatch: {0}")]
    TaskSink(#[from] TaskSinkError),

    /// The parameters do not cover a recorded bubble.
    #[error("params: {0}")]
    Params(#[from] ParamsError),

    /// The input could not be decoded.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] DecodeError),

    /// A virtual-machine call failed during gas estimation.
    #[error("{0}")]
    Estimation(String),

    /// A recorded bubble has no primary operator.
    #[error("bubble {0} has no primary operator")]
    MissingOperators(BubbleId),

    /// A query result could not be serialized.
    #[error("result encoding: {0}")]
    Encode(String),
}

/// Any failure of a contract operation.
#[derive(Debug, Error)]
pub enum ContractError {
    /// See [`BubbleError`].
    #[error("business error: {0}")]
    Business(#[from] BubbleError),

    /// See [`FatalError`].
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl From<DbError> for ContractError {
    fn from(err: DbError) -> Self {
        ContractError::Fatal(err.into())
    }
}

impl From<ServiceError> for ContractError {
    fn from(err: ServiceError) -> Self {
        ContractError::Fatal(err.into())
    }
}

impl From<TaskSinkError> for ContractError {
    fn from(err: TaskSinkError) -> Self {
        ContractError::Fatal(err.into())
    }
}

/// The result type of contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use primitive_types::H160;

    use super::*;

    #[test]
    fn business_codes_are_unique() {
        let errors = [
            BubbleError::BubbleNotExist,
            BubbleError::BubbleIsReleased,
            BubbleError::BubbleIsNotReleased,
            BubbleError::BubbleIsPreRelease,
            BubbleError::StakingAccount,
            BubbleError::AccountNoEnough,
            BubbleError::TokenNotExist(H160::zero()),
            BubbleError::TokenTransferFailed(H160::zero()),
            BubbleError::NotSubChainOperator,
            BubbleError::SettleAccListMismatch,
            BubbleError::SettleAccNotExist(H160::zero()),
            BubbleError::StakingAmountTooLow,
            BubbleError::EmptyContractCode,
            BubbleError::ContractIsExist,
            BubbleError::ContractNotExist,
            BubbleError::SenderIsNotOperator,
            BubbleError::SenderIsNotCreator,
            BubbleError::ContractReturns(String::new()),
            BubbleError::L1HashNotFound,
            BubbleError::NoEligibleBubble(1),
            BubbleError::AccountAssetNotExist,
            BubbleError::InvalidStateTransition {
                from: BubbleState::Active,
                to: BubbleState::Created,
            },
            BubbleError::InsufficientNodes(1),
            BubbleError::UnknownSizeCode(1),
            BubbleError::QueryFailed(String::new()),
        ];

        let codes: BTreeSet<_> = errors.iter().map(BubbleError::code).collect();

        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|code| *code != SUCCESS_CODE));
    }
}
