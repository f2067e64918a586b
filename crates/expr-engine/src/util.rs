//! Coercion and argument helpers shared by operators and function libraries.

use crate::error::EvalError;
use crate::value::{Map, Value};
use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;

// ----------------------------------------------------------------- Coercion

/// Numeric view of a value: numbers, booleans and numeric strings.
pub fn to_number(value: &Value, op: &str) -> Result<f64, EvalError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| EvalError::type_mismatch(op, "number", "non-numeric string")),
        other => Err(EvalError::type_mismatch(op, "number", other.type_name())),
    }
}

/// Like [`to_number`] but the result must be a whole number.
pub fn to_integer(value: &Value, op: &str) -> Result<i64, EvalError> {
    let n = to_number(value, op)?;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
        Ok(n as i64)
    } else {
        Err(EvalError::type_mismatch(op, "integer", "fractional number"))
    }
}

/// Compares two values of the same kind. Mixed kinds are compared numerically
/// when both coerce, otherwise `None`.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => {
            let x = to_number(a, "").ok()?;
            let y = to_number(b, "").ok()?;
            x.partial_cmp(&y)
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Timestamp(_) => 4,
        Value::Array(_) => 5,
        Value::Map(_) => 6,
    }
}

/// Total order used for sorting: by kind first, then by value. Arrays and
/// maps compare element by element (maps in key order), then by length.
pub fn total_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(a, b)| total_cmp(a, b))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Map(x), Value::Map(y)) => x
            .iter()
            .zip(y.iter())
            .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| total_cmp(va, vb)))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

// ----------------------------------------------------------------- Arguments

pub fn arg<'v>(name: &str, args: &'v [Value], i: usize) -> Result<&'v Value, EvalError> {
    args.get(i)
        .ok_or_else(|| EvalError::function(name, format!("missing argument {}", i + 1)))
}

pub fn number_arg(name: &str, args: &[Value], i: usize) -> Result<f64, EvalError> {
    to_number(arg(name, args, i)?, name)
}

pub fn integer_arg(name: &str, args: &[Value], i: usize) -> Result<i64, EvalError> {
    to_integer(arg(name, args, i)?, name)
}

pub fn string_arg<'v>(name: &str, args: &'v [Value], i: usize) -> Result<&'v str, EvalError> {
    match arg(name, args, i)? {
        Value::String(s) => Ok(s),
        other => Err(EvalError::type_mismatch(name, "string", other.type_name())),
    }
}

pub fn bool_arg(name: &str, args: &[Value], i: usize) -> Result<bool, EvalError> {
    match arg(name, args, i)? {
        Value::Bool(b) => Ok(*b),
        other => Err(EvalError::type_mismatch(name, "boolean", other.type_name())),
    }
}

pub fn array_arg<'v>(name: &str, args: &'v [Value], i: usize) -> Result<&'v Vec<Value>, EvalError> {
    match arg(name, args, i)? {
        Value::Array(a) => Ok(a),
        other => Err(EvalError::type_mismatch(name, "array", other.type_name())),
    }
}

pub fn map_arg<'v>(name: &str, args: &'v [Value], i: usize) -> Result<&'v Map, EvalError> {
    match arg(name, args, i)? {
        Value::Map(m) => Ok(m),
        other => Err(EvalError::type_mismatch(name, "map", other.type_name())),
    }
}

/// Accepts a timestamp or an RFC 3339 string.
pub fn timestamp_arg(name: &str, args: &[Value], i: usize) -> Result<DateTime<FixedOffset>, EvalError> {
    match arg(name, args, i)? {
        Value::Timestamp(t) => Ok(*t),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map_err(|e| EvalError::function(name, format!("invalid timestamp {:?}: {}", s, e))),
        other => Err(EvalError::type_mismatch(name, "timestamp", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&Value::from(" 2.5 "), "+"), Ok(2.5));
        assert_eq!(to_number(&Value::Bool(true), "+"), Ok(1.0));
        assert_eq!(
            to_number(&Value::Null, "+"),
            Err(EvalError::type_mismatch("+", "number", "null"))
        );
        assert!(to_number(&Value::from("abc"), "+").is_err());
    }

    #[test]
    fn test_to_integer() {
        assert_eq!(to_integer(&Value::Number(4.0), "&"), Ok(4));
        assert!(to_integer(&Value::Number(4.5), "&").is_err());
        assert!(to_integer(&Value::Number(f64::NAN), "&").is_err());
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(&Value::from(1), &Value::from(2)), Some(Ordering::Less));
        assert_eq!(compare(&Value::from("b"), &Value::from("a")), Some(Ordering::Greater));
        assert_eq!(compare(&Value::from("10"), &Value::from(9)), Some(Ordering::Greater));
        assert_eq!(compare(&Value::from("x"), &Value::from(9)), None);
        assert_eq!(compare(&Value::Number(f64::NAN), &Value::from(1)), None);
    }

    #[test]
    fn test_total_cmp_orders_by_kind() {
        let mut values = vec![Value::from("a"), Value::from(2), Value::Null, Value::from(1)];
        values.sort_by(total_cmp);
        assert_eq!(
            values,
            vec![Value::Null, Value::from(1), Value::from(2), Value::from("a")]
        );
    }

    #[test]
    fn test_total_cmp_compares_map_entries() {
        let map = |pairs: &[(&str, i64)]| {
            Value::Map(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::from(*v)))
                    .collect::<Map>(),
            )
        };
        assert_eq!(total_cmp(&map(&[("a", 1)]), &map(&[("a", 2)])), Ordering::Less);
        assert_eq!(total_cmp(&map(&[("b", 1)]), &map(&[("a", 9)])), Ordering::Greater);
        assert_eq!(total_cmp(&map(&[("a", 1)]), &map(&[("a", 1), ("b", 0)])), Ordering::Less);
        assert_eq!(total_cmp(&map(&[("a", 1)]), &map(&[("a", 1)])), Ordering::Equal);
    }
}
