//! Text to typed value coercion, one function per [`TypeTag`].

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::base64::decode_base64_xml;
use crate::budget::{Budget, BudgetEnforcer};
use crate::error::Error;
use crate::tags::TypeTag;
use crate::value::{FileRef, Value};

/// Convert the text of a leaf element into a typed [`Value`].
///
/// `attributes` are the element's attributes with canonical names; they are consulted for
/// `binary` (`encoding`) and `file` (`name`, `content_type`). `node` only appears in
/// errors.
///
/// Empty text under a typed numeric, boolean or date tag is [`Value::Null`]. Unknown tags
/// never fail and yield the text as a string.
///
/// ```rust
/// use xml_mini::{TypeTag, Value, coerce_to_value};
///
/// let v = coerce_to_value("42", &TypeTag::Integer, &[], "id").unwrap();
/// assert_eq!(v, Value::Integer(42));
///
/// let v = coerce_to_value("", &TypeTag::Boolean, &[], "approved").unwrap();
/// assert!(v.is_null());
///
/// assert!(coerce_to_value("forty-two", &TypeTag::Integer, &[], "id").is_err());
/// ```
pub fn coerce_to_value(
    raw: &str,
    tag: &TypeTag,
    attributes: &[(String, String)],
    node: &str,
) -> Result<Value, Error> {
    let mut budget = BudgetEnforcer::new(Budget::default());
    coerce(raw, tag, attributes, node, &mut budget)
}

pub(crate) fn coerce(
    raw: &str,
    tag: &TypeTag,
    attributes: &[(String, String)],
    node: &str,
    #[allow(unused_variables)] budget: &mut BudgetEnforcer,
) -> Result<Value, Error> {
    let fail = || Error::coercion(tag.as_str(), raw, node);
    let trimmed = raw.trim();
    let typed_empty = matches!(
        tag,
        TypeTag::Integer
            | TypeTag::Float
            | TypeTag::Decimal
            | TypeTag::Boolean
            | TypeTag::Date
            | TypeTag::DateTime
    ) && trimmed.is_empty();
    if typed_empty {
        return Ok(Value::Null);
    }

    match tag {
        TypeTag::Integer => parse_int(trimmed).map(Value::Integer).ok_or_else(fail),
        TypeTag::Float => parse_float(trimmed).map(Value::Float).ok_or_else(fail),
        TypeTag::Decimal => parse_decimal(trimmed).map(Value::Decimal).ok_or_else(fail),
        TypeTag::Boolean => Ok(Value::Boolean(parse_bool(trimmed))),
        TypeTag::Date => parse_date(trimmed).map(Value::Date).ok_or_else(fail),
        TypeTag::DateTime => parse_datetime(trimmed).map(Value::DateTime).ok_or_else(fail),
        TypeTag::Binary => decode_binary(raw, attributes)
            .map(Value::Binary)
            .ok_or_else(fail),
        TypeTag::File => {
            let content = decode_binary(raw, attributes).ok_or_else(fail)?;
            Ok(Value::File(FileRef::new(
                attribute(attributes, "name").unwrap_or(FileRef::DEFAULT_FILENAME),
                attribute(attributes, "content_type").unwrap_or(FileRef::DEFAULT_CONTENT_TYPE),
                content,
            )))
        }
        TypeTag::Symbol => Ok(Value::Symbol(raw.to_owned())),
        #[cfg(feature = "yaml")]
        TypeTag::Yaml => crate::yaml::parse_yaml(raw, node, budget),
        #[cfg(not(feature = "yaml"))]
        TypeTag::Yaml => Ok(Value::String(raw.to_owned())),
        TypeTag::Array => Ok(Value::Sequence(Vec::new())),
        TypeTag::String | TypeTag::Other(_) => Ok(Value::String(raw.to_owned())),
    }
}

pub(crate) fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Base-10 signed integer with an optional sign.
pub(crate) fn parse_int(t: &str) -> Option<i64> {
    let digits = t.strip_prefix(['+', '-']).unwrap_or(t);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    t.parse::<i64>().ok()
}

pub(crate) fn parse_float(t: &str) -> Option<f64> {
    match t {
        "NaN" => Some(f64::NAN),
        "INF" | "+INF" | "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-INF" | "-Infinity" => Some(f64::NEG_INFINITY),
        // Rust accepts "inf" and "nan" in any case; XML does not.
        _ if t.bytes().any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) => None,
        _ => t.parse::<f64>().ok(),
    }
}

pub(crate) fn parse_decimal(t: &str) -> Option<Decimal> {
    Decimal::from_str(t)
        .ok()
        .or_else(|| Decimal::from_scientific(t).ok())
}

pub(crate) fn parse_bool(t: &str) -> bool {
    t == "1" || t == "true"
}

pub(crate) fn parse_date(t: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(t, "%Y-%m-%d").ok()
}

/// RFC 3339, `+0000` style offsets, and offset-less values read as UTC.
pub(crate) fn parse_datetime(t: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(t, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn decode_binary(raw: &str, attributes: &[(String, String)]) -> Option<Vec<u8>> {
    match attribute(attributes, "encoding") {
        Some(encoding) if encoding != "base64" => Some(raw.as_bytes().to_vec()),
        _ => decode_base64_xml(raw).ok(),
    }
}
