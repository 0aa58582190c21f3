//! Record values: a type-erased record instance bound to its descriptor.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::record::{Fields, Record};
use crate::value::{FieldValue, PrimaryKey};
use crate::Error;

/// One in-memory instance of a registered type.
///
/// The engine handles records through this wrapper without knowing their
/// concrete type; [`RecordValue::downcast_ref`] and
/// [`RecordValue::into_record`] recover it.
pub struct RecordValue {
    descriptor: Arc<TypeDescriptor>,
    inner: Box<dyn Fields>,
}

impl RecordValue {
    /// A zero-valued instance with an unassigned primary key.
    pub fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        let inner = descriptor.instantiate();
        Self { descriptor, inner }
    }

    /// A zero-valued instance with its primary key preset.
    pub fn with_primary_key(descriptor: Arc<TypeDescriptor>, id: u64) -> Self {
        let mut value = Self::new(descriptor);
        value.set_primary_key(id);
        value
    }

    /// Wrap a concrete record.
    ///
    /// # Errors
    ///
    /// An internal error when `descriptor` was built for another type.
    pub fn from_record<T: Record>(
        descriptor: Arc<TypeDescriptor>,
        record: T,
    ) -> Result<Self, Error> {
        if descriptor.type_id() != std::any::TypeId::of::<T>() {
            return Err(Error::internal(format!(
                "Descriptor for '{}' cannot hold a value of type '{}'.",
                descriptor.type_name(),
                std::any::type_name::<T>()
            )));
        }
        Ok(Self {
            descriptor,
            inner: Box::new(record),
        })
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// The primary key, 0 when unassigned.
    pub fn primary_key(&self) -> u64 {
        match self.inner.field(self.descriptor.primary_key_index()) {
            Some(FieldValue::PrimaryKey(key)) => key.get(),
            _ => 0,
        }
    }

    pub fn set_primary_key(&mut self, id: u64) {
        let index = self.descriptor.primary_key_index();
        // The descriptor located this index by its primary-key kind.
        let result = self
            .inner
            .set_field(index, FieldValue::PrimaryKey(PrimaryKey(id)));
        debug_assert!(
            result.is_ok(),
            "{}: primary key field {} refused its value",
            self.descriptor.type_name(),
            index
        );
    }

    pub fn is_assigned(&self) -> bool {
        self.primary_key() != 0
    }

    /// `{namespace}:{TypeName}:{primary key}`.
    ///
    /// An unassigned key formats as 0; check [`RecordValue::is_assigned`]
    /// before using the result for lookups.
    pub fn storage_key(&self, namespace: &str) -> String {
        storage_key(namespace, self.descriptor.type_name(), self.primary_key())
    }

    pub fn field(&self, index: usize) -> Option<FieldValue> {
        self.inner.field(index)
    }

    /// Overwrite one field.
    ///
    /// # Errors
    ///
    /// An internal error when the value's kind does not match the field: the
    /// callers coerce to the descriptor's kind first, so a refusal here is a
    /// defect.
    pub fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), Error> {
        self.inner.set_field(index, value).map_err(|rejected| {
            let name = self
                .descriptor
                .fields()
                .get(index)
                .map_or("<out of range>", |f| f.name);
            Error::internal(format!(
                "Field '{}' of '{}' refused the {} value {:?}.",
                name,
                self.descriptor.type_name(),
                rejected.kind(),
                rejected
            ))
        })
    }

    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Record>(&mut self) -> Option<&mut T> {
        self.inner.as_any_mut().downcast_mut::<T>()
    }

    /// Unwrap into the concrete record, or give `self` back on a type mismatch.
    pub fn into_record<T: Record>(self) -> Result<T, Self> {
        if !self.inner.as_any().is::<T>() {
            return Err(self);
        }
        match self.inner.into_any().downcast::<T>() {
            Ok(record) => Ok(*record),
            Err(_) => unreachable!("type checked above"),
        }
    }
}

/// `{namespace}:{type_name}:{id}`.
pub fn storage_key(namespace: &str, type_name: &str, id: u64) -> String {
    format!("{}:{}:{}", namespace, type_name, id)
}

/// `{namespace}:{type_name}`, the primary-key counter of a type.
pub fn counter_key(namespace: &str, type_name: &str) -> String {
    format!("{}:{}", namespace, type_name)
}

impl fmt::Debug for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.descriptor.type_name());
        for (index, def) in self.descriptor.fields().iter().enumerate() {
            match self.inner.field(index) {
                Some(value) => s.field(def.name, &value),
                None => s.field(def.name, &"<missing>"),
            };
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    crate::record! {
        #[derive(Debug, PartialEq)]
        struct Widget {
            id: PrimaryKey,
            name: String,
        }
    }

    crate::record! {
        #[derive(Debug)]
        struct Other {
            id: PrimaryKey,
        }
    }

    /// Declares a primary key but refuses every write.
    #[cfg(debug_assertions)]
    #[derive(Default)]
    struct Sealed;

    #[cfg(debug_assertions)]
    impl Fields for Sealed {
        fn field(&self, index: usize) -> Option<FieldValue> {
            (index == 0).then(|| FieldValue::PrimaryKey(PrimaryKey::UNASSIGNED))
        }

        fn set_field(&mut self, _index: usize, value: FieldValue) -> Result<(), FieldValue> {
            Err(value)
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
            self
        }
    }

    #[cfg(debug_assertions)]
    impl Record for Sealed {
        fn shape() -> crate::Shape {
            crate::Shape::Struct {
                name: "Sealed",
                fields: vec![crate::FieldDef {
                    name: "id",
                    kind: crate::FieldKind::PrimaryKey,
                }],
            }
        }
    }

    fn widget_descriptor() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::build::<Widget>().unwrap())
    }

    #[test]
    fn new_value_is_unassigned() {
        let value = RecordValue::new(widget_descriptor());
        assert_eq!(value.primary_key(), 0);
        assert!(!value.is_assigned());
        assert_eq!(value.storage_key("app"), "app:Widget:0");
    }

    #[test]
    fn primary_key_get_set() {
        let mut value = RecordValue::new(widget_descriptor());
        value.set_primary_key(42);
        assert_eq!(value.primary_key(), 42);
        assert!(value.is_assigned());
        assert_eq!(value.storage_key("app"), "app:Widget:42");

        let preset = RecordValue::with_primary_key(widget_descriptor(), 7);
        assert_eq!(preset.downcast_ref::<Widget>().unwrap().id, PrimaryKey(7));
    }

    #[test]
    fn set_field_kind_mismatch_is_internal() {
        let mut value = RecordValue::new(widget_descriptor());
        let err = value.set_field(1, FieldValue::Bool(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn from_record_checks_type() {
        let widget = Widget {
            id: PrimaryKey(3),
            name: "gear".to_string(),
        };
        let value = RecordValue::from_record(widget_descriptor(), widget).unwrap();
        assert_eq!(value.primary_key(), 3);

        let err = RecordValue::from_record(widget_descriptor(), Other::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn into_record_recovers_concrete_type() {
        let mut value = RecordValue::new(widget_descriptor());
        value
            .set_field(1, FieldValue::String("gear".to_string()))
            .unwrap();
        value.downcast_mut::<Widget>().unwrap().id = PrimaryKey(5);

        let value = value.into_record::<Other>().unwrap_err();
        let widget: Widget = value.into_record().unwrap();
        assert_eq!(
            widget,
            Widget {
                id: PrimaryKey(5),
                name: "gear".to_string()
            }
        );
    }

    #[test]
    fn debug_lists_fields() {
        let value = RecordValue::with_primary_key(widget_descriptor(), 2);
        let debug = format!("{:?}", value);
        assert!(debug.starts_with("Widget"));
        assert!(debug.contains("name"));
    }

    #[test]
    fn key_helpers() {
        assert_eq!(storage_key("ns", "Note", 9), "ns:Note:9");
        assert_eq!(counter_key("ns", "Note"), "ns:Note");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Sealed: primary key field 0 refused its value")]
    fn refused_primary_key_write_panics_in_debug() {
        let descriptor = Arc::new(TypeDescriptor::build::<Sealed>().unwrap());
        let mut value = RecordValue::new(descriptor);
        value.set_primary_key(7);
    }
}
