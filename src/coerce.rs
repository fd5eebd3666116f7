//! Input coercion.
//!
//! A coercing shape runs its strategy before the structural check. A
//! strategy either produces a value of the target type or [`NotCoercible`],
//! in which case the shape raises its ordinary type issue as if coercion had
//! never been attempted.
//!
//! Every strategy first unwraps a boxed primitive or a single-element array
//! (one level only) and then converts the scalar.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::types::{Kind, TypeAtom};
use crate::value::{format_number, Value};

/// Returned by a strategy that has no rule for the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotCoercible;

pub type Coercion = fn(&Value) -> Result<Value, NotCoercible>;

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: i128 = (1 << 53) - 1;

/// Resolves the value a shape's structural check should see.
///
/// Returns the input itself if it already passes `accepts`. Otherwise, when
/// `coercing`, returns the coerced value if it passes `accepts`. `None` means
/// the shape should raise its type issue against the original input.
pub(crate) fn prepare<'a, A>(
    input: &'a Value,
    coercing: bool,
    accepts: A,
    coerce: Coercion,
) -> Option<Cow<'a, Value>>
where
    A: Fn(&Value) -> bool,
{
    if accepts(input) {
        return Some(Cow::Borrowed(input));
    }
    if !coercing {
        return None;
    }
    coerce(input)
        .ok()
        .filter(|value| accepts(value))
        .map(Cow::Owned)
}

fn unwrap_then(value: &Value, scalar: Coercion) -> Result<Value, NotCoercible> {
    match value {
        Value::Boxed(inner) => scalar(inner),
        Value::Array(items) if items.len() == 1 => match &items[0] {
            Value::Boxed(inner) => scalar(inner),
            item => scalar(item),
        },
        other => scalar(other),
    }
}

fn kinds(kinds: &[Kind]) -> Vec<TypeAtom> {
    kinds.iter().copied().map(TypeAtom::Kind).collect()
}

pub fn to_number(value: &Value) -> Result<Value, NotCoercible> {
    unwrap_then(value, |value| {
        let n = match value {
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(NotCoercible);
                }
                trimmed.parse::<f64>().map_err(|_| NotCoercible)?
            }
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::BigInt(i) if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(i) => *i as f64,
            Value::Date(d) => d.timestamp_millis() as f64,
            Value::Null => 0.0,
            _ => return Err(NotCoercible),
        };
        if n.is_finite() {
            Ok(Value::Number(n))
        } else {
            Err(NotCoercible)
        }
    })
}

pub fn number_inputs() -> Vec<TypeAtom> {
    kinds(&[
        Kind::Number,
        Kind::String,
        Kind::Boolean,
        Kind::BigInt,
        Kind::Date,
        Kind::Null,
        Kind::Undefined,
        Kind::Array,
        Kind::Object,
    ])
}

pub fn to_string(value: &Value) -> Result<Value, NotCoercible> {
    unwrap_then(value, |value| match value {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Number(n) if n.is_finite() => Ok(Value::String(format_number(*n))),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        Value::BigInt(i) => Ok(Value::String(i.to_string())),
        _ => Err(NotCoercible),
    })
}

pub fn string_inputs() -> Vec<TypeAtom> {
    kinds(&[
        Kind::String,
        Kind::Number,
        Kind::Boolean,
        Kind::BigInt,
        Kind::Array,
        Kind::Object,
    ])
}

pub fn to_boolean(value: &Value) -> Result<Value, NotCoercible> {
    unwrap_then(value, |value| match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) if s == "true" => Ok(Value::Bool(true)),
        Value::String(s) if s == "false" => Ok(Value::Bool(false)),
        Value::Number(n) if *n == 1.0 => Ok(Value::Bool(true)),
        Value::Number(n) if *n == 0.0 => Ok(Value::Bool(false)),
        Value::Null | Value::Undefined => Ok(Value::Bool(false)),
        _ => Err(NotCoercible),
    })
}

pub fn boolean_inputs() -> Vec<TypeAtom> {
    kinds(&[
        Kind::Boolean,
        Kind::String,
        Kind::Number,
        Kind::Null,
        Kind::Undefined,
        Kind::Array,
        Kind::Object,
    ])
}

pub fn to_bigint(value: &Value) -> Result<Value, NotCoercible> {
    unwrap_then(value, |value| match value {
        Value::BigInt(i) => Ok(Value::BigInt(*i)),
        Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e38 => {
            Ok(Value::BigInt(*n as i128))
        }
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map(Value::BigInt)
            .map_err(|_| NotCoercible),
        Value::Bool(b) => Ok(Value::BigInt(i128::from(*b))),
        _ => Err(NotCoercible),
    })
}

pub fn bigint_inputs() -> Vec<TypeAtom> {
    kinds(&[
        Kind::BigInt,
        Kind::Number,
        Kind::String,
        Kind::Boolean,
        Kind::Array,
        Kind::Object,
    ])
}

pub fn to_date(value: &Value) -> Result<Value, NotCoercible> {
    unwrap_then(value, |value| match value {
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::Number(n) if n.is_finite() => DateTime::from_timestamp_millis(n.trunc() as i64)
            .map(Value::Date)
            .ok_or(NotCoercible),
        Value::String(s) => parse_date(s.trim()).map(Value::Date).ok_or(NotCoercible),
        _ => Err(NotCoercible),
    })
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?))
}

pub fn date_inputs() -> Vec<TypeAtom> {
    kinds(&[
        Kind::Date,
        Kind::Number,
        Kind::String,
        Kind::Array,
        Kind::Object,
    ])
}

/// Sets become their elements, maps become `[key, value]` pairs, anything
/// else is wrapped in a single-element array.
pub fn to_array(value: &Value) -> Result<Value, NotCoercible> {
    Ok(match value {
        Value::Array(items) | Value::Set(items) => Value::Array(items.clone()),
        Value::Map(entries) => Value::Array(
            entries
                .iter()
                .map(|(k, v)| Value::Array(vec![k.clone(), v.clone()]))
                .collect(),
        ),
        other => Value::Array(vec![other.clone()]),
    })
}

/// Arrays become sets of their elements, anything else a single-element set.
pub fn to_set(value: &Value) -> Result<Value, NotCoercible> {
    Ok(match value {
        Value::Set(items) | Value::Array(items) => Value::Set(items.clone()),
        other => Value::Set(vec![other.clone()]),
    })
}

/// Plain objects become string-keyed maps; arrays of `[key, value]` pairs
/// become maps of those pairs.
pub fn to_map(value: &Value) -> Result<Value, NotCoercible> {
    match value {
        Value::Map(entries) => Ok(Value::Map(entries.clone())),
        Value::Object(entries) => Ok(Value::Map(
            entries
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                .collect(),
        )),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(pair) if pair.len() == 2 => Ok((pair[0].clone(), pair[1].clone())),
                _ => Err(NotCoercible),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Map),
        _ => Err(NotCoercible),
    }
}

pub fn map_inputs() -> Vec<TypeAtom> {
    kinds(&[Kind::Map, Kind::Object, Kind::Array])
}
