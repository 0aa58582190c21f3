//! Record shapes and index-based field access.
//!
//! A record type describes itself once through [`Record::shape`]; afterwards
//! every access goes through [`Fields`] by field position, never by name. The
//! [`record!`](crate::record) macro writes both implementations from a struct
//! definition.

use std::any::Any;

use crate::value::{FieldKind, FieldValue};

/// One declared field of a record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// The shape a type reports when it is registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// A structured record with named, typed fields in declaration order.
    Struct {
        name: &'static str,
        fields: Vec<FieldDef>,
    },
    /// Anything else: a primitive, a pointer-like wrapper, a collection.
    /// Opaque types cannot be registered.
    Opaque {
        name: &'static str,
        description: &'static str,
    },
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Struct { name, .. } | Shape::Opaque { name, .. } => name,
        }
    }
}

/// Type-erased, index-based access to a record's fields.
///
/// Indices follow the order of the fields in the record's [`Shape`].
pub trait Fields: Any + Send + Sync {
    /// Read the field at `index`, or `None` when out of range.
    fn field(&self, index: usize) -> Option<FieldValue>;

    /// Overwrite the field at `index`.
    ///
    /// The value is handed back when its kind does not match the field or the
    /// index is out of range.
    fn set_field(&mut self, index: usize, value: FieldValue) -> Result<(), FieldValue>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// A type that can be registered and stored.
///
/// Implement it with the [`record!`](crate::record) macro.
pub trait Record: Fields + Default + Sized {
    fn shape() -> Shape;
}

/// Declare a record type.
///
/// Expands to the struct itself (with `Default` derived) plus its [`Fields`]
/// and [`Record`] implementations. Every field type must implement
/// [`FieldType`](crate::FieldType); exactly one field should be a
/// [`PrimaryKey`](crate::PrimaryKey) or registration fails. Field identifiers
/// double as wire and storage names.
///
/// # Example
///
/// ```rust
/// use kvorm_core::{record, PrimaryKey, Record, Shape};
///
/// record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Widget {
///         pub id: PrimaryKey,
///         pub name: String,
///         pub count: i64,
///     }
/// }
///
/// match Widget::shape() {
///     Shape::Struct { name, fields } => {
///         assert_eq!(name, "Widget");
///         assert_eq!(fields.len(), 3);
///     }
///     Shape::Opaque { .. } => unreachable!(),
/// }
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::Fields for $name {
            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field(&self, index: usize) -> ::std::option::Option<$crate::FieldValue> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return ::std::option::Option::Some(
                            <$fty as $crate::FieldType>::to_field_value(&self.$field),
                        );
                    }
                    position += 1;
                )*
                ::std::option::Option::None
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn set_field(
                &mut self,
                index: usize,
                value: $crate::FieldValue,
            ) -> ::std::result::Result<(), $crate::FieldValue> {
                let mut position = 0usize;
                $(
                    if index == position {
                        self.$field = <$fty as $crate::FieldType>::from_field_value(value)?;
                        return ::std::result::Result::Ok(());
                    }
                    position += 1;
                )*
                ::std::result::Result::Err(value)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn into_any(
                self: ::std::boxed::Box<Self>,
            ) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }

        impl $crate::Record for $name {
            fn shape() -> $crate::Shape {
                $crate::Shape::Struct {
                    name: ::std::stringify!($name),
                    fields: ::std::vec![
                        $(
                            $crate::FieldDef::new(
                                ::std::stringify!($field),
                                <$fty as $crate::FieldType>::KIND,
                            ),
                        )*
                    ],
                }
            }
        }
    };
}
