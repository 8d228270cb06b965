//! This crate contains general types, traits and pure functions that need to be shared across
//! multiple crates.
//!
//! It is not intended to be used directly by end users, but rather to be used as a dependency by
//! other crates. Also note that this crate lies at the bottom of the crate-hierarchy in this
//! workspace i.e., it does not depend on any other crate in this workspace.
//!
//! Besides the bubble records and their storage keys, this crate also defines the narrow
//! interfaces through which the bubble contract talks to its collaborators (the virtual machine,
//! the candidate node pool, the VRF nonce history and the cross-chain task channel).

pub mod asset;
pub mod bubble;
pub mod constants;
pub mod hashing;
pub mod host;
pub mod keys;
pub mod tasks;
pub mod types;
