//! Request body -> record fields.

use serde_json::{Map, Number, Value};

use kvorm_core::codec::{check_time_range, decode_bytes, parse_time};
use kvorm_core::{Error, FieldDef, FieldKind, FieldValue, RecordValue};

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Parse `body` as a flat JSON object and assign its fields to `record`.
///
/// Every field is coerced before any is assigned, so a rejected body leaves
/// the record untouched.
///
/// # Errors
///
/// * `BadRequest` - malformed JSON, an unknown field, the primary key, or a
///   value that cannot be coerced to its field's kind.
/// * `Internal` - the record refused a value that was coerced to its kind.
pub fn decode(body: &[u8], record: &mut RecordValue) -> Result<(), Error> {
    let map: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|e| Error::bad_request("Malformed JSON").with_source(e))?;
    decode_map(map, record)
}

/// Assign the fields of an already-parsed JSON object to `record`.
pub fn decode_map(map: Map<String, Value>, record: &mut RecordValue) -> Result<(), Error> {
    let descriptor = std::sync::Arc::clone(record.descriptor());

    let mut assignments = Vec::with_capacity(map.len());
    for (name, value) in map {
        let index = descriptor.field_index(&name).ok_or_else(|| {
            Error::bad_request(format!(
                "Unknown field '{}': the request body specifies a field which cannot be set.",
                name
            ))
        })?;
        if index == descriptor.primary_key_index() {
            return Err(Error::bad_request(format!(
                "You may not set primary key field '{}'.",
                name
            )));
        }
        let coerced = coerce(&descriptor.fields()[index], value)?;
        assignments.push((index, coerced));
    }

    for (index, value) in assignments {
        record.set_field(index, value).map_err(|e| {
            tracing::error!(
                type_name = descriptor.type_name(),
                error = %e,
                "coerced wire value refused by record"
            );
            e
        })?;
    }
    Ok(())
}

/// Coerce one untyped wire value to the kind of `field`.
pub fn coerce(field: &FieldDef, value: Value) -> Result<FieldValue, Error> {
    let mismatch = |value: &Value| {
        Error::bad_request(format!(
            "Field '{}' with type {} cannot take the {} value {}.",
            field.name,
            field.kind,
            wire_kind(value),
            value
        ))
    };

    let coerced = match (field.kind, value) {
        (kind, Value::Null) => FieldValue::zero(kind),

        (FieldKind::PrimaryKey, _) => {
            return Err(Error::internal(format!(
                "Primary key field '{}' reached value coercion.",
                field.name
            )));
        }

        (FieldKind::String, Value::String(s)) => FieldValue::String(s),
        (FieldKind::Bool, Value::Bool(b)) => FieldValue::Bool(b),

        (FieldKind::Int, Value::Number(n)) => FieldValue::Int(number_to_i64(field, &n)?),
        (FieldKind::Uint, Value::Number(n)) => FieldValue::Uint(number_to_u64(field, &n)?),
        (FieldKind::Float, Value::Number(n)) => match n.as_f64() {
            Some(f) => FieldValue::Float(f),
            None => return Err(mismatch(&Value::Number(n))),
        },

        (FieldKind::Time, Value::String(s)) => {
            let malformed = || Error::bad_request(format!("Malformed date: {}.", s));
            let time = parse_time(&s).map_err(|e| malformed().with_source(e))?;
            check_time_range(&time).map_err(|e| malformed().with_source(e))?;
            FieldValue::Time(time)
        }
        (FieldKind::Bytes, Value::String(s)) => match decode_bytes(&s) {
            Ok(b) => FieldValue::Bytes(b),
            Err(e) => {
                return Err(Error::bad_request(format!("Malformed base64: {}.", s)).with_source(e))
            }
        },

        (_, other) => return Err(mismatch(&other)),
    };
    Ok(coerced)
}

fn number_to_i64(field: &FieldDef, n: &Number) -> Result<i64, Error> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if n.is_u64() {
        return Err(out_of_range(field, n));
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.abs() <= MAX_SAFE_INTEGER => Ok(f.trunc() as i64),
        _ => Err(out_of_range(field, n)),
    }
}

fn number_to_u64(field: &FieldDef, n: &Number) -> Result<u64, Error> {
    if let Some(u) = n.as_u64() {
        return Ok(u);
    }
    if n.is_i64() {
        return Err(out_of_range(field, n));
    }
    match n.as_f64().map(f64::trunc) {
        Some(t) if t.is_finite() && t >= 0.0 && t <= MAX_SAFE_INTEGER => Ok(t as u64),
        _ => Err(out_of_range(field, n)),
    }
}

fn out_of_range(field: &FieldDef, n: &Number) -> Error {
    Error::bad_request(format!(
        "Field '{}' with type {} cannot hold the number {} exactly.",
        field.name, field.kind, n
    ))
}

fn wire_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
