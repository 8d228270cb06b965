//! The key/value engine underneath the bubble store.

use std::error::Error;

/// A byte-oriented key/value store.
///
/// Writes go straight to the store; the host is responsible for discarding them if the
/// enclosing state transition is rolled back.
pub trait KvStore {
    /// The error type returned by the store operations.
    type Error: Error + Send + Sync + 'static;

    /// Gets, if present, the value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), Self::Error>;

    /// Deletes the value stored under `key`, if any.
    fn delete(&mut self, key: &[u8]) -> Result<(), Self::Error>;
}

impl<S: KvStore> KvStore for &mut S {
    type Error = S::Error;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error> {
        (**self).get(key)
    }

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), Self::Error> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), Self::Error> {
        (**self).delete(key)
    }
}
