//! This crate contains the consensus-critical parameters that dictate the behavior of the bubble
//! contract in a way that ensures that all nodes come to the same state when executing the same
//! transactions.

pub mod bubble;
mod default;
pub mod errors;
pub mod gas;
pub mod size;

pub use bubble::BubbleParams;
pub use gas::GasSchedule;
pub use size::SizeConfig;
