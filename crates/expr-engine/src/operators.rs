//! Runtime semantics of the built-in operators.

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::EvalError;
use crate::util::{compare, to_integer, to_number};
use crate::value::{format_number, Value};
use regex::Regex;
use std::cmp::Ordering;

pub(crate) fn unary(op: UnaryOp, operand: Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(operand.is_empty())),
        UnaryOp::Neg => Ok(Value::Number(-to_number(&operand, "-")?)),
        UnaryOp::Plus => Ok(Value::Number(to_number(&operand, "+")?)),
        UnaryOp::BitNot => Ok(Value::from(!to_integer(&operand, "~")?)),
    }
}

pub(crate) fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => sub(&left, &right),
        BinaryOp::Mul => arithmetic(op, &left, &right, |a, b| Ok(a * b)),
        BinaryOp::Div => arithmetic(op, &left, &right, |a, b| {
            if b == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }),
        BinaryOp::Rem => arithmetic(op, &left, &right, |a, b| {
            if b == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(a % b)
            }
        }),
        BinaryOp::Pow => arithmetic(op, &left, &right, |a, b| Ok(a.powf(b))),
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::Ne => Ok(Value::Bool(left != right)),
        BinaryOp::Lt => ordering(op, &left, &right, Ordering::is_lt),
        BinaryOp::Le => ordering(op, &left, &right, Ordering::is_le),
        BinaryOp::Gt => ordering(op, &left, &right, Ordering::is_gt),
        BinaryOp::Ge => ordering(op, &left, &right, Ordering::is_ge),
        BinaryOp::In => contains(&right, &left).map(Value::Bool),
        BinaryOp::BitAnd => bitwise(op, &left, &right, |a, b| Ok(a & b)),
        BinaryOp::BitOr => bitwise(op, &left, &right, |a, b| Ok(a | b)),
        BinaryOp::BitXor => bitwise(op, &left, &right, |a, b| Ok(a ^ b)),
        BinaryOp::Shl => bitwise(op, &left, &right, |a, b| Ok(a << shift_amount(b)?)),
        BinaryOp::Shr => bitwise(op, &left, &right, |a, b| Ok(a >> shift_amount(b)?)),
    }
}

fn add(left: Value, right: Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::String(a), b @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
            Ok(Value::String(a + &b.to_string()))
        }
        (a @ (Value::Number(_) | Value::Bool(_)), Value::String(b)) => {
            Ok(Value::String(a.to_string() + &b))
        }
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Ok(Value::Array(a))
        }
        (Value::Map(mut a), Value::Map(b)) => {
            a.extend(b);
            Ok(Value::Map(a))
        }
        (a, b) => arithmetic(BinaryOp::Add, &a, &b, |a, b| Ok(a + b)),
    }
}

fn sub(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Timestamp(a), Value::Timestamp(b)) => {
            let diff = a.signed_duration_since(*b);
            Ok(Value::Number(diff.num_milliseconds() as f64 / 1000.0))
        }
        _ => arithmetic(BinaryOp::Sub, left, right, |a, b| Ok(a - b)),
    }
}

fn arithmetic(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    f: impl FnOnce(f64, f64) -> Result<f64, EvalError>,
) -> Result<Value, EvalError> {
    let a = to_number(left, op.symbol())?;
    let b = to_number(right, op.symbol())?;
    f(a, b).map(Value::Number)
}

fn bitwise(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    f: impl FnOnce(i64, i64) -> Result<i64, EvalError>,
) -> Result<Value, EvalError> {
    let a = to_integer(left, op.symbol())?;
    let b = to_integer(right, op.symbol())?;
    f(a, b).map(Value::from)
}

fn shift_amount(b: i64) -> Result<u32, EvalError> {
    if (0..64).contains(&b) {
        Ok(b as u32)
    } else {
        Err(EvalError::function("shift", format!("shift amount {} out of range", b)))
    }
}

fn ordering(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    pred: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    match compare(left, right) {
        Some(ord) => Ok(Value::Bool(pred(ord))),
        // NaN compares false against everything.
        None if matches!(left, Value::Number(n) if n.is_nan())
            || matches!(right, Value::Number(n) if n.is_nan()) =>
        {
            Ok(Value::Bool(false))
        }
        None => Err(EvalError::type_mismatch(
            op.symbol(),
            left.type_name(),
            right.type_name(),
        )),
    }
}

/// Membership test for `needle in haystack`.
pub(crate) fn contains(haystack: &Value, needle: &Value) -> Result<bool, EvalError> {
    match haystack {
        Value::Array(items) => Ok(items.contains(needle)),
        Value::Map(map) => match needle {
            Value::String(key) => Ok(map.contains_key(key)),
            other => Err(EvalError::type_mismatch("in", "string", other.type_name())),
        },
        Value::String(s) => match needle {
            Value::String(sub) => Ok(s.contains(sub.as_str())),
            Value::Number(n) => Ok(s.contains(format_number(*n).as_str())),
            other => Err(EvalError::type_mismatch("in", "string", other.type_name())),
        },
        other => Err(EvalError::type_mismatch(
            "in",
            "array, map or string",
            other.type_name(),
        )),
    }
}

/// Text a value presents to a regular expression.
pub(crate) fn match_subject(value: &Value, op: &str) -> Result<String, EvalError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(_) | Value::Bool(_) | Value::Timestamp(_) => Ok(value.to_string()),
        other => Err(EvalError::type_mismatch(op, "string", other.type_name())),
    }
}

pub(crate) fn compile_regex(pattern: &str) -> Result<Regex, EvalError> {
    Regex::new(pattern).map_err(|e| EvalError::InvalidRegex {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Map;

    fn bin(op: BinaryOp, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value, EvalError> {
        binary(op, a.into(), b.into())
    }

    #[test]
    fn test_add_variants() {
        assert_eq!(bin(BinaryOp::Add, 1, 2), Ok(Value::from(3)));
        assert_eq!(bin(BinaryOp::Add, "a", 1), Ok(Value::from("a1")));
        assert_eq!(bin(BinaryOp::Add, 1.5, "x"), Ok(Value::from("1.5x")));
        assert_eq!(bin(BinaryOp::Add, true, 1), Ok(Value::from(2)));
        assert_eq!(
            bin(BinaryOp::Add, vec![1], vec![2]),
            Ok(Value::from(vec![1, 2]))
        );
        let a: Map = [("x".to_string(), Value::from(1))].into_iter().collect();
        let b: Map = [("x".to_string(), Value::from(2)), ("y".to_string(), Value::from(3))]
            .into_iter()
            .collect();
        let merged = bin(BinaryOp::Add, a, b).unwrap();
        assert_eq!(merged.as_map().unwrap()["x"], Value::from(2));
        assert_eq!(merged.as_map().unwrap().len(), 2);
        assert!(bin(BinaryOp::Add, Value::Null, 1).is_err());
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(bin(BinaryOp::Div, 1, 0), Err(EvalError::DivisionByZero));
        assert_eq!(bin(BinaryOp::Rem, 1, 0), Err(EvalError::DivisionByZero));
        assert_eq!(bin(BinaryOp::Div, 7, 2), Ok(Value::from(3.5)));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(bin(BinaryOp::Lt, 1, 2), Ok(Value::Bool(true)));
        assert_eq!(bin(BinaryOp::Ge, "b", "a"), Ok(Value::Bool(true)));
        assert_eq!(bin(BinaryOp::Gt, f64::NAN, 1), Ok(Value::Bool(false)));
        assert!(matches!(
            bin(BinaryOp::Lt, vec![1], 2),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(bin(BinaryOp::Eq, vec![1, 2], vec![1, 2]), Ok(Value::Bool(true)));
        assert_eq!(bin(BinaryOp::Eq, 1, "1"), Ok(Value::Bool(false)));
        assert_eq!(bin(BinaryOp::Ne, Value::Null, false), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_in() {
        assert_eq!(bin(BinaryOp::In, 2, vec![1, 2]), Ok(Value::Bool(true)));
        assert_eq!(bin(BinaryOp::In, "ell", "hello"), Ok(Value::Bool(true)));
        let m: Map = [("k".to_string(), Value::Null)].into_iter().collect();
        assert_eq!(bin(BinaryOp::In, "k", m), Ok(Value::Bool(true)));
        assert!(bin(BinaryOp::In, 1, 1).is_err());
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(bin(BinaryOp::BitAnd, 6, 3), Ok(Value::from(2)));
        assert_eq!(bin(BinaryOp::Shl, 1, 4), Ok(Value::from(16)));
        assert!(bin(BinaryOp::Shl, 1, 64).is_err());
        assert!(bin(BinaryOp::BitOr, 1.5, 1).is_err());
        assert_eq!(unary(UnaryOp::BitNot, Value::from(0)), Ok(Value::from(-1)));
    }

    #[test]
    fn test_unary_not_uses_emptiness() {
        assert_eq!(unary(UnaryOp::Not, Value::from("")), Ok(Value::Bool(true)));
        assert_eq!(unary(UnaryOp::Not, Value::from(vec![0])), Ok(Value::Bool(false)));
    }
}
