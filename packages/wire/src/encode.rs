//! Record -> JSON.

use serde_json::{Map, Number, Value};

use kvorm_core::codec::{encode_bytes, format_time};
use kvorm_core::{Error, FieldValue, RecordValue};

/// Encode every field of `record`, keyed by field name.
pub fn encode(record: &RecordValue) -> Value {
    let descriptor = record.descriptor();
    let mut object = Map::new();
    for (index, def) in descriptor.fields().iter().enumerate() {
        let value = record.field(index).map(to_json_value).unwrap_or(Value::Null);
        object.insert(def.name.to_string(), value);
    }
    Value::Object(object)
}

/// Convert one field value to JSON.
pub fn to_json_value(value: FieldValue) -> Value {
    match value {
        FieldValue::PrimaryKey(key) => Value::Number(key.get().into()),
        FieldValue::String(s) => Value::String(s),
        FieldValue::Int(i) => Value::Number(i.into()),
        FieldValue::Uint(u) => Value::Number(u.into()),
        // JSON has no NaN or infinity
        FieldValue::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        FieldValue::Bool(b) => Value::Bool(b),
        FieldValue::Time(t) => Value::String(format_time(&t)),
        FieldValue::Bytes(b) => Value::String(encode_bytes(&b)),
    }
}

/// Serialize `record` as a response body: one JSON object and a newline.
pub fn to_json_bytes(record: &RecordValue) -> Result<Vec<u8>, Error> {
    let mut body = serde_json::to_vec(&encode(record)).map_err(|e| {
        Error::internal(format!(
            "Could not serialize {} {}.",
            record.descriptor().type_name(),
            record.primary_key()
        ))
        .with_source(e)
    })?;
    body.push(b'\n');
    Ok(body)
}
