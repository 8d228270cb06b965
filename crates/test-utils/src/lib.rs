//! This crate provides test-utilities for the bubble workspace.
//!
//! These are in-memory stand-ins for the collaborators the contract talks to (the virtual
//! machine, the candidate node registry, the nonce history and the task channel) plus generators
//! of random values.

pub mod generators;
pub mod ledger;
pub mod prelude;
pub mod services;
