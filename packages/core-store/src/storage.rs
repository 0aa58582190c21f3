//! The storage adapter: records as flat string hashes in a key-value store.

use std::sync::Arc;

use kvorm_kv_store::KvStore;

use crate::codec::{from_store_text, to_store_text};
use crate::descriptor::TypeDescriptor;
use crate::record_value::{counter_key, storage_key, RecordValue};
use crate::Error;

/// Persist, load and delete records.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn RecordStore>`.
pub trait RecordStore: Send + Sync {
    /// Write every non-key field of `record`.
    ///
    /// An unassigned primary key is replaced by a freshly allocated one
    /// before anything is written.
    fn save(&self, record: &mut RecordValue) -> Result<(), Error>;

    /// Load the record of `descriptor`'s type with primary key `id`.
    ///
    /// # Returns
    ///
    /// * `Err(Error::NotFound)` - No such record.
    /// * `Err(Error::Store)` - The backing store failed.
    fn load(&self, id: u64, descriptor: &Arc<TypeDescriptor>) -> Result<RecordValue, Error>;

    /// Delete the record of type `type_name` with primary key `id`.
    fn delete(&self, type_name: &str, id: u64) -> Result<(), Error>;

    /// Release the underlying store.
    fn close(&self);
}

/// A [`RecordStore`] over any [`KvStore`].
///
/// Keys are scoped by an application namespace:
/// - `{namespace}:{TypeName}` holds the primary-key counter of a type;
/// - `{namespace}:{TypeName}:{id}` holds one record's fields as a hash.
///
/// Allocation is a single `INCR`, so concurrent saves of new records always
/// receive distinct keys. Saving the same assigned record concurrently is
/// last-write-wins per field.
#[derive(Debug)]
pub struct KvRecordStore<K> {
    kv: K,
    namespace: String,
}

impl<K: KvStore> KvRecordStore<K> {
    pub fn new(kv: K, namespace: impl Into<String>) -> Self {
        Self {
            kv,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }
}

impl<K: KvStore> RecordStore for KvRecordStore<K> {
    fn save(&self, record: &mut RecordValue) -> Result<(), Error> {
        let descriptor = Arc::clone(record.descriptor());

        // Encode before allocating, so a rejected record consumes no key.
        let mut fields = Vec::with_capacity(descriptor.field_count().saturating_sub(1));
        for (index, def) in descriptor.fields().iter().enumerate() {
            if index == descriptor.primary_key_index() {
                continue;
            }
            let value = record.field(index).ok_or_else(|| {
                Error::internal(format!(
                    "Field '{}' of '{}' is missing from the record.",
                    def.name,
                    descriptor.type_name()
                ))
            })?;
            fields.push((def.name.to_string(), to_store_text(&value)?));
        }

        if !record.is_assigned() {
            let id = self
                .kv
                .incr(&counter_key(&self.namespace, descriptor.type_name()))?;
            record.set_primary_key(id);
        }
        let key = record.storage_key(&self.namespace);

        // A record made of nothing but its key still needs a hash to exist.
        if fields.is_empty() {
            fields.push((
                descriptor.primary_key_name().to_string(),
                record.primary_key().to_string(),
            ));
        }

        self.kv.hmset(&key, &fields)?;
        tracing::debug!(key = %key, fields = fields.len(), "saved record");
        Ok(())
    }

    fn load(&self, id: u64, descriptor: &Arc<TypeDescriptor>) -> Result<RecordValue, Error> {
        let mut record = RecordValue::with_primary_key(Arc::clone(descriptor), id);
        let key = record.storage_key(&self.namespace);

        let stored = self.kv.hgetall(&key)?;
        if stored.is_empty() {
            return Err(Error::not_found(format!(
                "{} with id {} not found.",
                descriptor.type_name(),
                id
            )));
        }

        for (name, text) in &stored {
            let Some(index) = descriptor.field_index(name) else {
                continue;
            };
            if index == descriptor.primary_key_index() {
                continue;
            }
            let kind = descriptor.fields()[index].kind;
            match from_store_text(kind, text)? {
                Some(value) => record.set_field(index, value)?,
                None => tracing::warn!(
                    key = %key,
                    field = %name,
                    value = %text,
                    "skipping unparseable {} field",
                    kind
                ),
            }
        }

        tracing::debug!(key = %key, "loaded record");
        Ok(record)
    }

    fn delete(&self, type_name: &str, id: u64) -> Result<(), Error> {
        let key = storage_key(&self.namespace, type_name, id);
        if self.kv.del(&key)? == 0 {
            return Err(Error::not_found(format!(
                "{} with id {} not found.",
                type_name, id
            )));
        }
        tracing::debug!(key = %key, "deleted record");
        Ok(())
    }

    fn close(&self) {
        self.kv.close();
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn save(&self, record: &mut RecordValue) -> Result<(), Error> {
        self.as_ref().save(record)
    }

    fn load(&self, id: u64, descriptor: &Arc<TypeDescriptor>) -> Result<RecordValue, Error> {
        self.as_ref().load(id, descriptor)
    }

    fn delete(&self, type_name: &str, id: u64) -> Result<(), Error> {
        self.as_ref().delete(type_name, id)
    }

    fn close(&self) {
        self.as_ref().close()
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn save(&self, record: &mut RecordValue) -> Result<(), Error> {
        self.as_ref().save(record)
    }

    fn load(&self, id: u64, descriptor: &Arc<TypeDescriptor>) -> Result<RecordValue, Error> {
        self.as_ref().load(id, descriptor)
    }

    fn delete(&self, type_name: &str, id: u64) -> Result<(), Error> {
        self.as_ref().delete(type_name, id)
    }

    fn close(&self) {
        self.as_ref().close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, FieldValue, PrimaryKey};
    use chrono::{TimeZone, Utc};
    use kvorm_kv_store::{KvError, MemoryKv};
    use std::collections::HashMap;

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Widget {
            id: PrimaryKey,
            name: String,
            count: i64,
            stock: u64,
            price: f64,
            active: bool,
            made: chrono::DateTime<Utc>,
            blob: Vec<u8>,
        }
    }

    crate::record! {
        struct Bare {
            id: PrimaryKey,
        }
    }

    fn descriptor<T: crate::Record>() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::build::<T>().unwrap())
    }

    fn sample() -> Widget {
        Widget {
            id: PrimaryKey::UNASSIGNED,
            name: "gear".to_string(),
            count: -3,
            stock: 12,
            price: 9.75,
            active: true,
            made: Utc.timestamp_opt(1_700_000_000, 500).unwrap(),
            blob: vec![0, 1, 254, 255],
        }
    }

    /// A store whose every command fails at the transport level.
    struct BrokenKv;

    impl KvStore for BrokenKv {
        fn incr(&self, _key: &str) -> Result<u64, KvError> {
            Err(std::io::Error::other("connection refused").into())
        }

        fn hmset(&self, _key: &str, _fields: &[(String, String)]) -> Result<(), KvError> {
            Err(std::io::Error::other("connection refused").into())
        }

        fn hgetall(&self, _key: &str) -> Result<HashMap<String, String>, KvError> {
            Err(std::io::Error::other("connection refused").into())
        }

        fn del(&self, _key: &str) -> Result<u64, KvError> {
            Err(std::io::Error::other("connection refused").into())
        }
    }

    #[test]
    fn save_allocates_then_writes() {
        let store = KvRecordStore::new(MemoryKv::new(), "app");
        let d = descriptor::<Widget>();

        let mut record = RecordValue::from_record(Arc::clone(&d), sample()).unwrap();
        store.save(&mut record).unwrap();
        assert_eq!(record.primary_key(), 1);

        let stored = store.kv().hgetall("app:Widget:1").unwrap();
        assert_eq!(stored["name"], "gear");
        assert_eq!(stored["count"], "-3");
        assert_eq!(stored["active"], "true");
        assert_eq!(stored["blob"], "AAH+/w==");
        assert!(!stored.contains_key("id"));

        let mut second = RecordValue::new(d);
        store.save(&mut second).unwrap();
        assert_eq!(second.primary_key(), 2);
    }

    #[test]
    fn unstorable_time_is_rejected_before_allocation() {
        let store = KvRecordStore::new(MemoryKv::new(), "app");
        let mut widget = sample();
        widget.made = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();

        let mut record = RecordValue::from_record(descriptor::<Widget>(), widget).unwrap();
        let err = store.save(&mut record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(!record.is_assigned());
        assert!(store.kv().is_empty());
    }

    #[test]
    fn save_assigned_keeps_key() {
        let store = KvRecordStore::new(MemoryKv::new(), "app");
        let mut record = RecordValue::with_primary_key(descriptor::<Widget>(), 40);
        store.save(&mut record).unwrap();
        assert_eq!(record.primary_key(), 40);
        assert!(store.kv().contains_key("app:Widget:40"));
        assert!(!store.kv().contains_key("app:Widget"));
    }

    #[test]
    fn save_then_load_roundtrips_every_kind() {
        let store = KvRecordStore::new(MemoryKv::new(), "app");
        let d = descriptor::<Widget>();

        let mut record = RecordValue::from_record(Arc::clone(&d), sample()).unwrap();
        store.save(&mut record).unwrap();

        let loaded: Widget = store.load(1, &d).unwrap().into_record().unwrap();
        let mut expected = sample();
        expected.id = PrimaryKey(1);
        assert_eq!(loaded, expected);
    }

    #[test]
    fn key_only_record_still_exists() {
        let store = KvRecordStore::new(MemoryKv::new(), "app");
        let d = descriptor::<Bare>();
        let mut record = RecordValue::new(Arc::clone(&d));
        store.save(&mut record).unwrap();

        let loaded = store.load(1, &d).unwrap();
        assert_eq!(loaded.primary_key(), 1);
    }

    #[test]
    fn load_missing_is_not_found() {
        let store = KvRecordStore::new(MemoryKv::new(), "app");
        let err = store.load(9, &descriptor::<Widget>()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Widget with id 9 not found.");
    }

    #[test]
    fn load_ignores_unknown_and_skips_unparseable() {
        let store = KvRecordStore::new(MemoryKv::new(), "app");
        store
            .kv()
            .hmset(
                "app:Widget:3",
                &[
                    ("name".to_string(), "old".to_string()),
                    ("retired_field".to_string(), "x".to_string()),
                    ("count".to_string(), "many".to_string()),
                    ("active".to_string(), "1".to_string()),
                    ("id".to_string(), "77".to_string()),
                ],
            )
            .unwrap();

        let loaded = store.load(3, &descriptor::<Widget>()).unwrap();
        let widget = loaded.downcast_ref::<Widget>().unwrap();
        assert_eq!(widget.id, PrimaryKey(3));
        assert_eq!(widget.name, "old");
        assert_eq!(widget.count, 0);
        assert!(widget.active);
    }

    #[test]
    fn load_corrupt_time_is_internal() {
        let store = KvRecordStore::new(MemoryKv::new(), "app");
        store
            .kv()
            .hmset(
                "app:Widget:1",
                &[("made".to_string(), "last tuesday".to_string())],
            )
            .unwrap();

        let err = store.load(1, &descriptor::<Widget>()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn delete_twice_is_not_found() {
        let store = KvRecordStore::new(MemoryKv::new(), "app");
        let mut record = RecordValue::new(descriptor::<Widget>());
        store.save(&mut record).unwrap();

        store.delete("Widget", 1).unwrap();
        let err = store.delete("Widget", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn transport_failures_are_not_reclassified() {
        let store = KvRecordStore::new(BrokenKv, "app");
        let d = descriptor::<Widget>();

        let mut record = RecordValue::new(Arc::clone(&d));
        let err = store.save(&mut record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(record.primary_key(), 0);

        assert_eq!(store.load(1, &d).unwrap_err().kind(), ErrorKind::Store);
        let err = store.delete("Widget", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
    }

    #[test]
    fn namespaces_are_isolated() {
        let kv = Arc::new(MemoryKv::new());
        let a = KvRecordStore::new(Arc::clone(&kv), "a");
        let b = KvRecordStore::new(Arc::clone(&kv), "b");
        let d = descriptor::<Widget>();

        let mut record = RecordValue::new(Arc::clone(&d));
        record
            .set_field(1, FieldValue::String("only in a".to_string()))
            .unwrap();
        a.save(&mut record).unwrap();

        assert!(a.load(1, &d).is_ok());
        assert_eq!(b.load(1, &d).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn close_closes_backend() {
        let store = KvRecordStore::new(MemoryKv::new(), "app");
        store.close();
        let err = store.delete("Widget", 1).unwrap_err();
        assert!(matches!(err, Error::Store(KvError::Closed)));
    }
}
