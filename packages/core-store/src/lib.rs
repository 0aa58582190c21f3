//! kvorm core: the record mapping engine
//!
//! This layer maps registered record types onto the flat strings of the
//! key-value layer:
//! - `record!` / `Record`: a record type declares its shape once
//! - `TypeDescriptor`: compiled-once metadata (fields, primary key, path name)
//! - `TypeRegistry`: external path name -> descriptor
//! - `RecordValue`: a type-erased record bound to its descriptor
//! - `RecordStore` / `KvRecordStore`: save, load and delete as flat hashes
//! - `Resolver`: request paths -> (descriptor, id, record)
//!
//! # Example
//!
//! ```rust
//! use kvorm_core::{record, KvRecordStore, PrimaryKey, RecordStore, RecordValue, TypeRegistry};
//! use kvorm_kv_store::MemoryKv;
//!
//! record! {
//!     #[derive(Debug, PartialEq)]
//!     pub struct Widget {
//!         pub id: PrimaryKey,
//!         pub name: String,
//!     }
//! }
//!
//! let mut registry = TypeRegistry::new();
//! let descriptor = registry.register::<Widget>(None).unwrap();
//! let store = KvRecordStore::new(MemoryKv::new(), "demo");
//!
//! let widget = Widget { id: PrimaryKey::UNASSIGNED, name: "gear".into() };
//! let mut value = RecordValue::from_record(descriptor.clone(), widget).unwrap();
//! store.save(&mut value).unwrap();
//! assert_eq!(value.primary_key(), 1);
//!
//! let loaded: Widget = store.load(1, &descriptor).unwrap().into_record().unwrap();
//! assert_eq!(loaded.name, "gear");
//! ```

pub mod codec;
mod descriptor;
mod error;
mod record;
mod record_value;
mod registry;
mod resolver;
mod storage;
mod value;

pub use descriptor::TypeDescriptor;
pub use error::{BoxError, Error, ErrorKind};
pub use record::{FieldDef, Fields, Record, Shape};
pub use record_value::{counter_key, storage_key, RecordValue};
pub use registry::TypeRegistry;
pub use resolver::{resolve_path, Resolved, ResolvedObject, Resolver};
pub use storage::{KvRecordStore, RecordStore};
pub use value::{FieldKind, FieldType, FieldValue, PrimaryKey};

// Re-export backend types for convenience
pub use kvorm_kv_store::{KvError, KvStore, MemoryKv};
