//! Type descriptors: the compiled-once metadata of a registered record type.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::record::{FieldDef, Fields, Record, Shape};
use crate::value::FieldKind;
use crate::Error;

/// Immutable metadata about one record type.
///
/// Built once by [`TypeDescriptor::build`] and shared as
/// `Arc<TypeDescriptor>` by the registry and every record value of the type.
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    path_name: String,
    fields: Vec<FieldDef>,
    by_name: HashMap<&'static str, usize>,
    primary_key: usize,
    factory: fn() -> Box<dyn Fields>,
}

fn new_instance<T: Record>() -> Box<dyn Fields> {
    Box::new(T::default())
}

impl TypeDescriptor {
    /// Inspect `T` and locate its primary-key field.
    ///
    /// # Errors
    ///
    /// A [`Error::Configuration`] when `T` is not a struct, or has zero or
    /// several primary-key fields.
    pub fn build<T: Record>() -> Result<Self, Error> {
        Self::from_shape(T::shape(), TypeId::of::<T>(), new_instance::<T>)
    }

    fn from_shape(
        shape: Shape,
        type_id: TypeId,
        factory: fn() -> Box<dyn Fields>,
    ) -> Result<Self, Error> {
        let (type_name, fields) = match shape {
            Shape::Struct { name, fields } => (name, fields),
            Shape::Opaque { name, description } => {
                return Err(Error::configuration(format!(
                    "A struct type is required, but '{}' is {}.",
                    name, description
                )));
            }
        };

        let mut primary_key = None;
        for (index, field) in fields.iter().enumerate() {
            if field.kind != FieldKind::PrimaryKey {
                continue;
            }
            if primary_key.is_some() {
                return Err(Error::configuration(format!(
                    "Type '{}' has more than one primary key field.",
                    type_name
                )));
            }
            primary_key = Some(index);
        }

        let primary_key = primary_key.ok_or_else(|| {
            Error::configuration(format!(
                "Type '{}' is missing a primary key field.",
                type_name
            ))
        })?;

        let by_name = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name, index))
            .collect();

        Ok(Self {
            type_id,
            type_name,
            path_name: type_name.to_string(),
            fields,
            by_name,
            primary_key,
            factory,
        })
    }

    /// Replace the external path name. Used while installing into a registry.
    pub(crate) fn with_path_name(mut self, path_name: impl Into<String>) -> Self {
        self.path_name = path_name.into();
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The Rust type name, used in storage keys.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The name the type is addressed by in request paths.
    pub fn path_name(&self) -> &str {
        &self.path_name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn primary_key_index(&self) -> usize {
        self.primary_key
    }

    pub fn primary_key_name(&self) -> &'static str {
        self.fields[self.primary_key].name
    }

    pub(crate) fn instantiate(&self) -> Box<dyn Fields> {
        (self.factory)()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("path_name", &self.path_name)
            .field("fields", &self.fields)
            .field("primary_key", &self.primary_key)
            .finish()
    }
}
