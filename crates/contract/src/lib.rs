//! The bubble system contract.
//!
//! Every inbound call is an RLP list `[selector, args...]` that is decoded into a [`BubbleCall`]
//! and executed by [`BubbleContract`] as a single state transition against the host virtual
//! machine ([`EvmHost`](bubble_primitives::host::EvmHost)) and the bubble records
//! ([`BubbleStore`](bubble_db::BubbleStore)).
//!
//! Transactions return the decimal business code of their outcome and emit a log carrying the
//! details; queries return a JSON document. Business failures never abort the transition, only
//! [`FatalError`]s do.

pub mod config;
pub mod contract;
pub mod dispatch;
mod erc20;
pub mod errors;
pub mod gas;
pub mod receipt;
mod transitions;
mod vrf;

#[cfg(test)]
mod tests;

pub use config::{ContractCfg, Services, SystemAccounts};
pub use contract::{required_gas, BubbleContract};
pub use dispatch::{BubbleCall, Selector};
pub use errors::{BubbleError, ContractError, FatalError};
