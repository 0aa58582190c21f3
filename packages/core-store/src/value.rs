//! Field kinds and dynamically-typed field values.
//!
//! A record field has one of a small closed set of kinds. `FieldValue` is the
//! tagged union the rest of the engine moves values around in, and
//! `FieldType` connects each supported Rust type to its kind.

use std::fmt;

use chrono::{DateTime, Utc};

/// The identifying field of a record.
///
/// Zero means "unassigned": the store mints a positive key the first time the
/// record is saved.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PrimaryKey(pub u64);

impl PrimaryKey {
    /// The unassigned key.
    pub const UNASSIGNED: PrimaryKey = PrimaryKey(0);

    pub fn new(id: u64) -> Self {
        PrimaryKey(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl From<u64> for PrimaryKey {
    fn from(id: u64) -> Self {
        PrimaryKey(id)
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a record field.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum FieldKind {
    /// The record's primary key. Exactly one per record.
    PrimaryKey,
    /// UTF-8 string.
    String,
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 64-bit integer.
    Uint,
    /// 64-bit floating point.
    Float,
    /// Boolean.
    Bool,
    /// UTC timestamp.
    Time,
    /// Byte sequence.
    Bytes,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::PrimaryKey => "primary key",
            FieldKind::String => "string",
            FieldKind::Int => "int",
            FieldKind::Uint => "uint",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::Time => "time",
            FieldKind::Bytes => "bytes",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field value of any supported kind.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    PrimaryKey(PrimaryKey),
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Time(DateTime<Utc>),
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// The zero value of a kind: what a freshly constructed record holds and
    /// what a JSON `null` decodes to.
    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::PrimaryKey => FieldValue::PrimaryKey(PrimaryKey::UNASSIGNED),
            FieldKind::String => FieldValue::String(String::new()),
            FieldKind::Int => FieldValue::Int(0),
            FieldKind::Uint => FieldValue::Uint(0),
            FieldKind::Float => FieldValue::Float(0.0),
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Time => FieldValue::Time(DateTime::<Utc>::default()),
            FieldKind::Bytes => FieldValue::Bytes(Vec::new()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::PrimaryKey(_) => FieldKind::PrimaryKey,
            FieldValue::String(_) => FieldKind::String,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Uint(_) => FieldKind::Uint,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Time(_) => FieldKind::Time,
            FieldValue::Bytes(_) => FieldKind::Bytes,
        }
    }
}

/// A Rust type usable as a record field.
///
/// `from_field_value` hands the value back unchanged when its kind does not
/// match, so callers can report what they tried to store.
pub trait FieldType: Sized {
    const KIND: FieldKind;

    fn to_field_value(&self) -> FieldValue;

    fn from_field_value(value: FieldValue) -> Result<Self, FieldValue>;
}

macro_rules! field_type {
    ($ty:ty, $kind:ident) => {
        impl FieldType for $ty {
            const KIND: FieldKind = FieldKind::$kind;

            fn to_field_value(&self) -> FieldValue {
                FieldValue::$kind(self.clone())
            }

            fn from_field_value(value: FieldValue) -> Result<Self, FieldValue> {
                match value {
                    FieldValue::$kind(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

field_type!(PrimaryKey, PrimaryKey);
field_type!(String, String);
field_type!(i64, Int);
field_type!(u64, Uint);
field_type!(f64, Float);
field_type!(bool, Bool);
field_type!(DateTime<Utc>, Time);
field_type!(Vec<u8>, Bytes);
