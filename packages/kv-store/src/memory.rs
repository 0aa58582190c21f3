//! In-process backend with Redis-like command semantics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::{FieldPairs, KvError, KvStore};

/// A value held under one key.
#[derive(Clone, Debug, PartialEq)]
enum Entry {
    Counter(u64),
    Hash(HashMap<String, String>),
}

/// An in-memory [`KvStore`].
///
/// Keys hold either a counter (written by `INCR`) or a hash (written by
/// `HMSET`). Mixing the two on one key is a protocol error, like Redis'
/// `WRONGTYPE`. One mutex guards the whole keyspace, which makes every command
/// atomic with respect to the others.
///
/// # Example
///
/// ```rust
/// use kvorm_kv_store::{KvStore, MemoryKv};
///
/// let kv = MemoryKv::new();
/// assert_eq!(kv.incr("ids").unwrap(), 1);
/// assert_eq!(kv.incr("ids").unwrap(), 2);
/// assert!(kv.hgetall("nothing-here").unwrap().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, Entry>>,
    closed: AtomicBool,
}

impl MemoryKv {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// True when no keys are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `key` holds any value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, KvError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(KvError::Closed);
        }
        self.entries
            .lock()
            .map_err(|_| KvError::protocol("memory store lock poisoned"))
    }
}

impl KvStore for MemoryKv {
    fn incr(&self, key: &str) -> Result<u64, KvError> {
        let mut entries = self.entries()?;
        let entry = entries.entry(key.to_string()).or_insert(Entry::Counter(0));
        match entry {
            Entry::Counter(n) => {
                *n = n
                    .checked_add(1)
                    .ok_or_else(|| KvError::protocol("increment would overflow"))?;
                Ok(*n)
            }
            Entry::Hash(_) => Err(KvError::protocol(format!(
                "WRONGTYPE key '{}' holds a hash, not a counter",
                key
            ))),
        }
    }

    fn hmset(&self, key: &str, fields: &FieldPairs) -> Result<(), KvError> {
        if fields.is_empty() {
            return Err(KvError::protocol("wrong number of arguments for HMSET"));
        }

        let mut entries = self.entries()?;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(HashMap::new()));
        match entry {
            Entry::Hash(hash) => {
                for (name, value) in fields {
                    hash.insert(name.clone(), value.clone());
                }
                Ok(())
            }
            Entry::Counter(_) => Err(KvError::protocol(format!(
                "WRONGTYPE key '{}' holds a counter, not a hash",
                key
            ))),
        }
    }

    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        let entries = self.entries()?;
        match entries.get(key) {
            None => Ok(HashMap::new()),
            Some(Entry::Hash(hash)) => Ok(hash.clone()),
            Some(Entry::Counter(_)) => Err(KvError::protocol(format!(
                "WRONGTYPE key '{}' holds a counter, not a hash",
                key
            ))),
        }
    }

    fn del(&self, key: &str) -> Result<u64, KvError> {
        let mut entries = self.entries()?;
        Ok(u64::from(entries.remove(key).is_some()))
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("memory store closed");
        }
    }
}
