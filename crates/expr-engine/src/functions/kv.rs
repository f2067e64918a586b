use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::language::FunctionLibrary;
use crate::types::Arity;
use crate::util::{arg, map_arg, string_arg};
use crate::value::{Map, Value};
use std::collections::BTreeSet;

/// Key arguments may be given as strings, arrays of strings, or a mix.
fn key_set<'v>(name: &str, args: &'v [Value]) -> Result<BTreeSet<&'v str>, EvalError> {
    let mut keys = BTreeSet::new();
    for value in args {
        match value {
            Value::String(k) => {
                keys.insert(k.as_str());
            }
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(k) => keys.insert(k.as_str()),
                        other => {
                            return Err(EvalError::type_mismatch(name, "string", other.type_name()))
                        }
                    };
                }
            }
            other => return Err(EvalError::type_mismatch(name, "string", other.type_name())),
        }
    }
    Ok(keys)
}

/// `set(map, key, value)` returns a copy with the key set.
fn set_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let mut map = map_arg("set", args, 0)?.clone();
    map.insert(string_arg("set", args, 1)?.to_string(), args[2].clone());
    Ok(Value::Map(map))
}

/// Later maps win on conflicting keys.
fn merge_eval(args: &[Value], ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let mut out = Map::new();
    for i in 0..args.len() {
        ctx.check()?;
        out.extend(map_arg("merge", args, i)?.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    Ok(Value::Map(out))
}

fn keys_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let map = map_arg("keys", args, 0)?;
    Ok(Value::Array(map.keys().map(|k| Value::from(k.as_str())).collect()))
}

/// Values in key order.
fn values_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let map = map_arg("values", args, 0)?;
    Ok(Value::Array(map.values().cloned().collect()))
}

fn omit_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let map = map_arg("omit", args, 0)?;
    let keys = key_set("omit", &args[1..])?;
    Ok(Value::Map(
        map.iter()
            .filter(|(k, _)| !keys.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    ))
}

fn pick_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let map = map_arg("pick", args, 0)?;
    let keys = key_set("pick", &args[1..])?;
    Ok(Value::Map(
        map.iter()
            .filter(|(k, _)| keys.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    ))
}

/// `get(map, key[, default])`: the optional accessor. A missing key yields
/// `default`, or null without one, instead of an error.
fn get_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let map = map_arg("get", args, 0)?;
    let key = string_arg("get", args, 1)?;
    match map.get(key) {
        Some(v) => Ok(v.clone()),
        None => Ok(args.get(2).cloned().unwrap_or_default()),
    }
}

/// True when the map has the key. Non-string keys are never present.
fn has_key_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let map = map_arg("hasKey", args, 0)?;
    Ok(Value::Bool(match arg("hasKey", args, 1)? {
        Value::String(k) => map.contains_key(k),
        _ => false,
    }))
}

pub(super) fn library() -> FunctionLibrary {
    FunctionLibrary::new("kv")
        .function("set", Arity::Fixed(3), set_eval)
        .function("merge", Arity::Range(1, None), merge_eval)
        .function("keys", Arity::Fixed(1), keys_eval)
        .function("values", Arity::Fixed(1), values_eval)
        .function("omit", Arity::Range(2, None), omit_eval)
        .function("pick", Arity::Range(2, None), pick_eval)
        .function("get", Arity::Range(2, Some(3)), get_eval)
        .function("hasKey", Arity::Fixed(2), has_key_eval)
}
