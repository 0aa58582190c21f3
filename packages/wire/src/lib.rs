//! JSON wire conversion for kvorm records
//!
//! Records cross the request boundary as flat JSON objects. This crate turns a
//! request body into field assignments on a [`RecordValue`](kvorm_core::RecordValue)
//! and a record back into a JSON object:
//! - `decode`: body bytes -> coerced field values, rejecting unknown fields and
//!   any attempt to set the primary key
//! - `encode`: record -> `serde_json::Value`, with times as RFC 3339 strings and
//!   byte fields as base64
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use kvorm_core::{record, PrimaryKey, RecordValue, TypeDescriptor};
//!
//! record! {
//!     pub struct Widget {
//!         pub id: PrimaryKey,
//!         pub name: String,
//!         pub count: i64,
//!     }
//! }
//!
//! let descriptor = Arc::new(TypeDescriptor::build::<Widget>().unwrap());
//! let mut value = RecordValue::new(descriptor);
//! kvorm_wire::decode(br#"{"name": "gear", "count": 3.0}"#, &mut value).unwrap();
//!
//! let widget = value.downcast_ref::<Widget>().unwrap();
//! assert_eq!(widget.count, 3);
//! assert_eq!(
//!     kvorm_wire::encode(&value),
//!     serde_json::json!({"id": 0, "name": "gear", "count": 3})
//! );
//! ```

mod decode;
mod encode;

pub use decode::{coerce, decode, decode_map};
pub use encode::{encode, to_json_bytes, to_json_value};
