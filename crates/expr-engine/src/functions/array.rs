use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::language::FunctionLibrary;
use crate::types::Arity;
use crate::util::{array_arg, bool_arg, integer_arg, total_cmp};
use crate::value::Value;

/// `push(arr, items...)` returns a new array; the input is never modified.
fn push_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let mut items = array_arg("push", args, 0)?.clone();
    items.extend_from_slice(&args[1..]);
    Ok(Value::Array(items))
}

/// Last element, or null for an empty array.
fn pop_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(array_arg("pop", args, 0)?.last().cloned().unwrap_or_default())
}

/// First element, or null for an empty array.
fn shift_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(array_arg("shift", args, 0)?.first().cloned().unwrap_or_default())
}

/// `count(arr)` is the length; `count(arr, v...)` counts elements equal to any `v`.
fn count_eval(args: &[Value], ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let items = array_arg("count", args, 0)?;
    let needles = &args[1..];
    if needles.is_empty() {
        return Ok(Value::from(items.len()));
    }
    let mut n = 0usize;
    for item in items {
        ctx.check()?;
        if needles.contains(item) {
            n += 1;
        }
    }
    Ok(Value::from(n))
}

/// True when any of the needles is present.
fn has_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let items = array_arg("has", args, 0)?;
    Ok(Value::Bool(args[1..].iter().any(|v| items.contains(v))))
}

/// True when every needle is present.
fn has_all_eval(args: &[Value], ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let items = array_arg("hasAll", args, 0)?;
    for needle in &args[1..] {
        ctx.check()?;
        if !items.contains(needle) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

/// Index of the first element equal to the needle, or -1.
fn find_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let items = array_arg("find", args, 0)?;
    let needle = &args[1];
    Ok(items
        .iter()
        .position(|v| v == needle)
        .map_or(Value::from(-1), Value::from))
}

/// `sort(arr[, descending = false])`. Mixed kinds order as
/// null < boolean < number < string < timestamp < array < map.
fn sort_eval(args: &[Value], ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let mut items = array_arg("sort", args, 0)?.clone();
    let descending = match args.get(1) {
        Some(_) => bool_arg("sort", args, 1)?,
        None => false,
    };
    ctx.check()?;
    items.sort_by(total_cmp);
    if descending {
        items.reverse();
    }
    Ok(Value::Array(items))
}

/// `slice(arr, start[, end])`; negative positions count from the end and
/// everything is clamped to the array bounds.
fn slice_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let items = array_arg("slice", args, 0)?;
    let len = items.len() as i64;
    let resolve = |i: i64| if i < 0 { (len + i).max(0) } else { i.min(len) };
    let start = resolve(integer_arg("slice", args, 1)?);
    let end = match args.get(2) {
        Some(_) => resolve(integer_arg("slice", args, 2)?),
        None => len,
    };
    if end <= start {
        return Ok(Value::Array(Vec::new()));
    }
    Ok(Value::Array(items[start as usize..end as usize].to_vec()))
}

/// Flattens one level of nesting.
fn flatten_eval(args: &[Value], ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let mut out = Vec::new();
    for item in array_arg("flatten", args, 0)? {
        ctx.check()?;
        match item {
            Value::Array(inner) => out.extend(inner.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    Ok(Value::Array(out))
}

/// Drops repeated elements, keeping first occurrences in order.
fn unique_eval(args: &[Value], ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let mut out: Vec<Value> = Vec::new();
    for item in array_arg("unique", args, 0)? {
        ctx.check()?;
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    Ok(Value::Array(out))
}

pub(super) fn library() -> FunctionLibrary {
    FunctionLibrary::new("array")
        .function("push", Arity::Range(2, None), push_eval)
        .function("pop", Arity::Fixed(1), pop_eval)
        .function("shift", Arity::Fixed(1), shift_eval)
        .function("count", Arity::Range(1, None), count_eval)
        .function("has", Arity::Range(2, None), has_eval)
        .function("hasAll", Arity::Range(2, None), has_all_eval)
        .function("find", Arity::Fixed(2), find_eval)
        .function("sort", Arity::Range(1, Some(2)), sort_eval)
        .function("slice", Arity::Range(2, Some(3)), slice_eval)
        .function("flatten", Arity::Fixed(1), flatten_eval)
        .function("unique", Arity::Fixed(1), unique_eval)
}
