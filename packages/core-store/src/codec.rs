//! Text forms of field values.
//!
//! The backing store only holds strings. Time and byte fields have one
//! canonical text form each (RFC 3339 and standard base64), shared by the
//! storage adapter and the wire converter; every other kind uses its natural
//! string form.

use base64::Engine;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};

use crate::value::{FieldKind, FieldValue, PrimaryKey};
use crate::Error;

/// Format a timestamp as RFC 3339 with as many fractional digits as needed.
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse RFC 3339 text, normalizing the offset to UTC.
pub fn parse_time(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|t| t.with_timezone(&Utc))
}

/// Earliest and latest years RFC 3339 can write.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// Reject instants whose UTC year has no RFC 3339 form.
///
/// An offset can push an in-range local time out of range once normalized to
/// UTC, so check after [`parse_time`], not before.
pub fn check_time_range(time: &DateTime<Utc>) -> Result<(), Error> {
    let year = time.year();
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Ok(());
    }
    Err(Error::bad_request(format!(
        "Time {} falls in year {}, outside {:04}-{}.",
        time, year, MIN_YEAR, MAX_YEAR
    )))
}

pub fn encode_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn decode_bytes(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(text)
}

/// Encode a field value for the store.
///
/// # Errors
///
/// A `BadRequest` for a time outside the RFC 3339 years; it could be written
/// but never read back.
pub fn to_store_text(value: &FieldValue) -> Result<String, Error> {
    let text = match value {
        FieldValue::PrimaryKey(key) => key.to_string(),
        FieldValue::String(s) => s.clone(),
        FieldValue::Int(i) => i.to_string(),
        FieldValue::Uint(u) => u.to_string(),
        FieldValue::Float(f) => f.to_string(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Time(t) => {
            check_time_range(t)?;
            format_time(t)
        }
        FieldValue::Bytes(b) => encode_bytes(b),
    };
    Ok(text)
}

/// Decode stored text into a value of `kind`.
///
/// Returns `Ok(None)` when a scalar field does not parse: the field is skipped
/// and the record keeps its zero value there. Time and byte fields were written
/// by [`to_store_text`], so a decode failure on them is an internal error.
pub fn from_store_text(kind: FieldKind, text: &str) -> Result<Option<FieldValue>, Error> {
    let value = match kind {
        FieldKind::String => Some(FieldValue::String(text.to_string())),
        FieldKind::PrimaryKey => {
            parse_decimal::<u64>(text).map(|id| FieldValue::PrimaryKey(PrimaryKey(id)))
        }
        FieldKind::Int => parse_decimal::<i64>(text).map(FieldValue::Int),
        FieldKind::Uint => parse_decimal::<u64>(text).map(FieldValue::Uint),
        FieldKind::Float => text.parse::<f64>().ok().map(FieldValue::Float),
        FieldKind::Bool => parse_bool(text).map(FieldValue::Bool),
        FieldKind::Time => {
            let time = parse_time(text).map_err(|e| {
                Error::internal(format!("Malformed stored date: {}", text)).with_source(e)
            })?;
            Some(FieldValue::Time(time))
        }
        FieldKind::Bytes => {
            let bytes = decode_bytes(text).map_err(|e| {
                Error::internal(format!("Malformed stored bytes: {}", text)).with_source(e)
            })?;
            Some(FieldValue::Bytes(bytes))
        }
    };
    Ok(value)
}

/// Strict base-10: an optional leading `-` for signed types, then digits only.
fn parse_decimal<T: std::str::FromStr>(text: &str) -> Option<T> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "TRUE" | "True" | "t" | "T" | "1" => Some(true),
        "false" | "FALSE" | "False" | "f" | "F" | "0" => Some(false),
        _ => None,
    }
}
