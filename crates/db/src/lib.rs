//! Persistence of bubble records.
//!
//! The contract never sees raw bytes: it goes through [`BubbleStore`], which derives keys with
//! [`bubble_primitives::keys`] and RLP-encodes values according to the row specs in
//! [`row_spec`]. The backing key/value engine is abstracted by [`KvStore`]; an in-memory and a
//! `sled` backend are provided.

pub mod errors;
pub mod inmemory;
pub mod persistent;
pub mod row_spec;
pub mod store;
pub mod traits;

pub use errors::{DbError, DbResult};
pub use inmemory::InMemoryKv;
pub use persistent::SledKv;
pub use store::BubbleStore;
pub use traits::KvStore;
