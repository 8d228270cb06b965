//! `sled`-backed key/value store.

use std::path::Path;

use tracing::{debug, trace};

use crate::traits::KvStore;

/// A [`KvStore`] persisted with `sled`.
#[derive(Debug, Clone)]
pub struct SledKv {
    db: sled::Db,
}

impl SledKv {
    /// Opens (or creates) the store under `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, sled::Error> {
        debug!(path = %path.as_ref().display(), "opening sled store");
        let db = sled::open(path)?;

        Ok(Self { db })
    }

    /// Opens a store that is deleted when dropped.
    pub fn temporary() -> Result<Self, sled::Error> {
        let db = sled::Config::new().temporary(true).open()?;

        Ok(Self { db })
    }

    /// Flushes pending writes to disk.
    pub fn flush(&self) -> Result<usize, sled::Error> {
        self.db.flush()
    }
}

impl KvStore for SledKv {
    type Error = sled::Error;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.db.get(key)?.map(|value| value.to_vec()))
    }

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), Self::Error> {
        trace!(key = %String::from_utf8_lossy(key), len = value.len(), "put");
        self.db.insert(key, value)?;

        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), Self::Error> {
        trace!(key = %String::from_utf8_lossy(key), "delete");
        self.db.remove(key)?;

        Ok(())
    }
}
