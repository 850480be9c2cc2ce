//! Dbm Module
//!
//! Dict-style handle over the record store.
//!
//! ## Value Pipeline
//! ```text
//! set:  value ─► Codec::encode ─► Compressor::pack ───► RecordStore::upsert
//! get:  value ◄─ Codec::decode ◄─ Compressor::unpack ◄─ RecordStore::fetch
//! ```
//!
//! Encoding happens before anything touches the database, so a value the
//! codec rejects leaves the stored state unchanged.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::codec::Codec;
use crate::compression::Compressor;
use crate::config::Config;
use crate::error::{DbmError, Result};
use crate::store::{KeyScan, Location, Record, RecordStore};

/// A dict-like key-value store holding values of type `V`
///
/// Keys are strings and iterate in ascending order. Deleting a missing key
/// is not an error; use [`Dbm::pop`] to learn whether anything was removed.
///
/// With the raw-host dumper every write is decoded back as `V` before it is
/// stored, and values that would not read back (dynamic types such as
/// `serde_json::Value`, or fields skipped with `skip_serializing_if`) fail
/// with `DbmError::Encode`.
///
/// The handle is single-threaded: share it across threads only behind a
/// lock. Call [`Dbm::close`] to commit and compact; dropping the handle
/// discards writes that were never committed.
pub struct Dbm<V> {
    store: RecordStore,
    codec: Codec,
    compressor: Compressor,
    _value: PhantomData<fn() -> V>,
}

impl<V> Dbm<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Open or create a store
    ///
    /// `location` is a path or `":memory:"` for an ephemeral store.
    pub fn open(location: impl Into<Location>, config: Config) -> Result<Self> {
        let location = location.into();
        let store = RecordStore::open(&location, &config)?;

        debug!(
            location = %location,
            dumper = %config.dumper,
            level = config.compression_level,
            smart = config.smart_compress,
            "opened dbm"
        );

        Ok(Self {
            store,
            codec: Codec::from_config(&config),
            compressor: Compressor::from_config(&config),
            _value: PhantomData,
        })
    }

    /// Open an ephemeral store
    pub fn open_in_memory(config: Config) -> Result<Self> {
        Self::open(Location::Memory, config)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn contains(&self, key: &str) -> Result<bool> {
        self.store.contains(key)
    }

    /// Get a value, failing with `KeyNotFound` when absent
    pub fn get(&self, key: &str) -> Result<V> {
        self.get_opt(key)?
            .ok_or_else(|| DbmError::KeyNotFound(key.to_string()))
    }

    /// Get a value, or `None` when absent
    pub fn get_opt(&self, key: &str) -> Result<Option<V>> {
        match self.store.fetch(key)? {
            Some(record) => self.decode(&record).map(Some),
            None => Ok(None),
        }
    }

    /// Get a value, or `default` when absent
    pub fn get_or(&self, key: &str, default: V) -> Result<V> {
        Ok(self.get_opt(key)?.unwrap_or(default))
    }

    /// The stored record as-is (header and payload), without decoding
    pub fn raw_record(&self, key: &str) -> Result<Option<Record>> {
        self.store.fetch(key)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert or replace a value
    pub fn set(&mut self, key: &str, value: &V) -> Result<()> {
        let encoded = self.codec.encode(value)?;
        if !self.codec.is_self_describing() {
            self.codec.decode::<V>(&encoded).map_err(|e| {
                DbmError::Encode(format!("key {:?}: value does not read back: {}", key, e))
            })?;
        }
        let encoded_len = encoded.len();
        let stored = self.compressor.pack(encoded)?;

        trace!(
            key,
            encoded = encoded_len,
            stored = stored.len(),
            compressed = Compressor::is_compressed(&stored),
            "set"
        );

        self.store.upsert(key, &stored)
    }

    /// Remove a key; missing keys are ignored
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.store.delete(key)?;
        Ok(())
    }

    /// Remove a key and return its value, if it had one
    pub fn pop(&mut self, key: &str) -> Result<Option<V>> {
        let value = self.get_opt(key)?;
        if value.is_some() {
            self.store.delete(key)?;
        }
        Ok(value)
    }

    /// Store `default` unless the key exists; return the stored value
    pub fn set_default(&mut self, key: &str, default: V) -> Result<V> {
        if let Some(existing) = self.get_opt(key)? {
            return Ok(existing);
        }
        self.set(key, &default)?;
        Ok(default)
    }

    /// Set every pair from an iterator
    ///
    /// Each pair is an independent write; with auto-commit off they all land
    /// in the pending transaction.
    pub fn update<I, K>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        for (key, value) in pairs {
            self.set(key.as_ref(), &value)?;
        }
        Ok(())
    }

    /// Remove every record
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        Ok(())
    }

    // =========================================================================
    // Size and Iteration
    // =========================================================================

    pub fn len(&self) -> Result<usize> {
        self.store.count()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// All keys, materialized, in ascending order
    pub fn keys(&self) -> Result<Vec<String>> {
        self.iter().collect()
    }

    /// Lazy key iterator in ascending order; each call starts a new scan
    pub fn iter(&self) -> KeyScan<'_> {
        self.store.scan_ids()
    }

    /// Lazy iterator over `(key, value)` pairs
    pub fn items(&self) -> Items<'_, V> {
        Items {
            dbm: self,
            keys: self.store.scan_ids(),
        }
    }

    /// Lazy iterator over values
    pub fn values(&self) -> Values<'_, V> {
        Values { items: self.items() }
    }

    // =========================================================================
    // Transactions and Lifecycle
    // =========================================================================

    /// Flush writes buffered while auto-commit is off
    pub fn commit(&mut self) -> Result<()> {
        self.store.commit()
    }

    pub fn has_pending(&self) -> bool {
        self.store.has_pending()
    }

    pub fn auto_commit(&self) -> bool {
        self.store.auto_commit()
    }

    /// Switch commit policy; enabling auto-commit flushes pending writes
    pub fn set_auto_commit(&mut self, enabled: bool) -> Result<()> {
        self.store.set_auto_commit(enabled)
    }

    /// Commit, reclaim free space, and close the connection
    pub fn close(self) -> Result<()> {
        self.store.compact_and_close()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn location(&self) -> &Location {
        self.store.location()
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn compressor(&self) -> Compressor {
        self.compressor
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn decode(&self, record: &Record) -> Result<V> {
        Compressor::unpack(&record.value)
            .and_then(|bytes| self.codec.decode(&bytes))
            .map_err(|e| match e {
                DbmError::Corruption(msg) => {
                    DbmError::Corruption(format!("key {:?}: {}", record.id, msg))
                }
                other => other,
            })
    }
}

/// Iterator over `(key, value)` pairs, see [`Dbm::items`]
pub struct Items<'a, V> {
    dbm: &'a Dbm<V>,
    keys: KeyScan<'a>,
}

impl<V> Iterator for Items<'_, V>
where
    V: Serialize + DeserializeOwned,
{
    type Item = Result<(String, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = match self.keys.next()? {
                Ok(key) => key,
                Err(e) => return Some(Err(e)),
            };

            match self.dbm.get_opt(&key) {
                Ok(Some(value)) => return Some(Ok((key, value))),
                // Removed by another connection since the page was read
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Iterator over values, see [`Dbm::values`]
pub struct Values<'a, V> {
    items: Items<'a, V>,
}

impl<V> Iterator for Values<'_, V>
where
    V: Serialize + DeserializeOwned,
{
    type Item = Result<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items
            .next()
            .map(|item| item.map(|(_, value)| value))
    }
}
