//! The backend trait.

use std::collections::HashMap;
use std::sync::Arc;

use crate::KvError;

/// Field name/value pairs written by a single `HMSET`.
pub type FieldPairs = [(String, String)];

/// A key-value backend supporting counters and flat string hashes.
///
/// All methods take `&self`: a backend is shared by every in-flight request,
/// so implementations synchronize internally (a connection pool, a mutex,
/// a lock-free map...).
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn KvStore>`.
pub trait KvStore: Send + Sync {
    /// Atomically increment the integer counter at `key` and return the new
    /// value. A missing key counts from zero, so the first call returns 1.
    fn incr(&self, key: &str) -> Result<u64, KvError>;

    /// Set every `(field, value)` pair on the hash at `key`, creating it if
    /// needed. Fields not mentioned are left untouched.
    fn hmset(&self, key: &str, fields: &FieldPairs) -> Result<(), KvError>;

    /// Read every field of the hash at `key`.
    ///
    /// A missing key is not an error: the result is an empty map.
    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError>;

    /// Remove `key`, returning the number of keys removed (0 or 1).
    fn del(&self, key: &str) -> Result<u64, KvError>;

    /// Release the backend's resources. Commands issued afterwards may fail.
    fn close(&self) {}
}

// Blanket implementations for references and smart pointers

impl<T: KvStore + ?Sized> KvStore for &T {
    fn incr(&self, key: &str) -> Result<u64, KvError> {
        (**self).incr(key)
    }

    fn hmset(&self, key: &str, fields: &FieldPairs) -> Result<(), KvError> {
        (**self).hmset(key, fields)
    }

    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        (**self).hgetall(key)
    }

    fn del(&self, key: &str) -> Result<u64, KvError> {
        (**self).del(key)
    }

    fn close(&self) {
        (**self).close()
    }
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn incr(&self, key: &str) -> Result<u64, KvError> {
        self.as_ref().incr(key)
    }

    fn hmset(&self, key: &str, fields: &FieldPairs) -> Result<(), KvError> {
        self.as_ref().hmset(key, fields)
    }

    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        self.as_ref().hgetall(key)
    }

    fn del(&self, key: &str) -> Result<u64, KvError> {
        self.as_ref().del(key)
    }

    fn close(&self) {
        self.as_ref().close()
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn incr(&self, key: &str) -> Result<u64, KvError> {
        self.as_ref().incr(key)
    }

    fn hmset(&self, key: &str, fields: &FieldPairs) -> Result<(), KvError> {
        self.as_ref().hmset(key, fields)
    }

    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        self.as_ref().hgetall(key)
    }

    fn del(&self, key: &str) -> Result<u64, KvError> {
        self.as_ref().del(key)
    }

    fn close(&self) {
        self.as_ref().close()
    }
}
