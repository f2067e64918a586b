use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::language::FunctionLibrary;
use crate::types::{Arity, FunctionDefinition};
use crate::util::arg;
use crate::value::Value;

fn len_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let n = match arg("len", args, 0)? {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(a) => a.len(),
        Value::Map(m) => m.len(),
        other => {
            return Err(EvalError::type_mismatch(
                "len",
                "string, array or map",
                other.type_name(),
            ))
        }
    };
    Ok(Value::from(n))
}

fn is_empty_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(arg("isEmpty", args, 0)?.is_empty()))
}

fn is_nil_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(arg("isNil", args, 0)?.is_null()))
}

/// First non-empty argument, or null.
fn coalesce_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(args.iter().find(|v| !v.is_empty()).cloned().unwrap_or_default())
}

fn type_of_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::from(arg("typeOf", args, 0)?.type_name()))
}

fn default_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let value = arg("default", args, 0)?;
    if value.is_empty() {
        Ok(arg("default", args, 1)?.clone())
    } else {
        Ok(value.clone())
    }
}

pub(super) fn library() -> FunctionLibrary {
    FunctionLibrary::new("generic")
        .with(FunctionDefinition::new("len", Arity::Fixed(1), len_eval).alias("length"))
        .function("isEmpty", Arity::Fixed(1), is_empty_eval)
        .function("isNil", Arity::Fixed(1), is_nil_eval)
        .function("coalesce", Arity::Range(1, None), coalesce_eval)
        .function("typeOf", Arity::Fixed(1), type_of_eval)
        .function("default", Arity::Fixed(2), default_eval)
}
