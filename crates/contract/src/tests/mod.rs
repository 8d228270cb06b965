//! Tests of the contract against the in-memory collaborators.

mod common;
mod registry;
mod relay;
