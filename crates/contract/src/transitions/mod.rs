//! The state transitions of the contract, grouped by component.
//!
//! Every module adds methods to [`BubbleContract`](crate::BubbleContract). Transactions return
//! `Ok(None)` when executed in estimation mode after all checks and virtual-machine calls have
//! run, and before anything is written or posted.

mod bridge;
mod queries;
mod registry;
mod relay;
mod settlement;
