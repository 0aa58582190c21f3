use std::sync::Arc;
use std::thread;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use kvorm_core::{
    record, ErrorKind, KvRecordStore, MemoryKv, PrimaryKey, RecordStore, RecordValue,
    TypeDescriptor, TypeRegistry,
};

record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Sensor {
        pub id: PrimaryKey,
        pub label: String,
        pub offset: i64,
        pub samples: u64,
        pub gain: f64,
        pub enabled: bool,
        pub calibrated: DateTime<Utc>,
        pub firmware: Vec<u8>,
    }
}

fn sensor_descriptor() -> Arc<TypeDescriptor> {
    let mut registry = TypeRegistry::new();
    registry.register::<Sensor>(None).unwrap()
}

#[test]
fn concurrent_saves_get_distinct_keys() {
    let store = Arc::new(KvRecordStore::new(MemoryKv::new(), "props"));
    let descriptor = sensor_descriptor();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let descriptor = Arc::clone(&descriptor);
            thread::spawn(move || {
                (0..25)
                    .map(|_| {
                        let mut record = RecordValue::new(Arc::clone(&descriptor));
                        store.save(&mut record).unwrap();
                        record.primary_key()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut keys: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), 200);
    assert!(keys.iter().all(|&k| k > 0));
}

#[test]
fn deleted_records_stay_deleted() {
    let store = KvRecordStore::new(MemoryKv::new(), "props");
    let descriptor = sensor_descriptor();

    let mut record = RecordValue::new(Arc::clone(&descriptor));
    store.save(&mut record).unwrap();
    let id = record.primary_key();

    store.delete(descriptor.type_name(), id).unwrap();
    assert_eq!(
        store.delete(descriptor.type_name(), id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        store.load(id, &descriptor).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

fn any_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
}

fn any_sensor() -> impl Strategy<Value = Sensor> {
    (
        ".*",
        any::<i64>(),
        any::<u64>(),
        any::<f64>().prop_filter("finite", |f| f.is_finite()),
        any::<bool>(),
        any_time(),
        proptest::collection::vec(any::<u8>(), 0..64),
    )
        .prop_map(
            |(label, offset, samples, gain, enabled, calibrated, firmware)| Sensor {
                id: PrimaryKey::UNASSIGNED,
                label,
                offset,
                samples,
                gain,
                enabled,
                calibrated,
                firmware,
            },
        )
}

proptest! {
    #[test]
    fn prop_save_load_roundtrip(sensor in any_sensor()) {
        let store = KvRecordStore::new(MemoryKv::new(), "props");
        let descriptor = sensor_descriptor();

        let mut record = RecordValue::from_record(Arc::clone(&descriptor), sensor.clone()).unwrap();
        store.save(&mut record).unwrap();
        let id = record.primary_key();

        let loaded: Sensor = store.load(id, &descriptor).unwrap().into_record().unwrap();
        let mut expected = sensor;
        expected.id = PrimaryKey(id);
        prop_assert_eq!(loaded, expected);
    }
}
