//! In-memory key/value store, used by tests and by the CLI when no data directory is given.

use std::{collections::BTreeMap, convert::Infallible};

use tracing::trace;

use crate::traits::KvStore;

/// A [`KvStore`] backed by an ordered map.
///
/// Two stores compare equal when they hold exactly the same entries, which is what tests use to
/// assert that an operation did not write anything.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InMemoryKv {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKv {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

impl KvStore for InMemoryKv {
    type Error = Infallible;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), Self::Error> {
        trace!(key = %String::from_utf8_lossy(key), len = value.len(), "put");
        self.entries.insert(key.to_vec(), value);

        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), Self::Error> {
        trace!(key = %String::from_utf8_lossy(key), "delete");
        self.entries.remove(key);

        Ok(())
    }
}
