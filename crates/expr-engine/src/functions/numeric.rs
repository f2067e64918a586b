use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::language::FunctionLibrary;
use crate::types::Arity;
use crate::util::{arg, integer_arg, number_arg, to_number};
use crate::value::Value;

/// Flattens `min(1, 2, 3)` and `min([1, 2, 3])` into one list of numbers.
fn numbers(name: &str, args: &[Value]) -> Result<Vec<f64>, EvalError> {
    let items: &[Value] = match args {
        [Value::Array(items)] => items,
        _ => args,
    };
    if items.is_empty() {
        return Err(EvalError::function(name, "no values"));
    }
    items.iter().map(|v| to_number(v, name)).collect()
}

fn min_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let m = numbers("min", args)?.into_iter().fold(f64::INFINITY, f64::min);
    Ok(Value::Number(m))
}

fn max_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let m = numbers("max", args)?
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);
    Ok(Value::Number(m))
}

/// `round(x[, places])`; halves round away from zero.
fn round_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let x = number_arg("round", args, 0)?;
    let places = match args.get(1) {
        Some(_) => integer_arg("round", args, 1)?.clamp(-15, 15) as i32,
        None => 0,
    };
    let scale = 10f64.powi(places);
    Ok(Value::Number((x * scale).round() / scale))
}

fn floor_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg("floor", args, 0)?.floor()))
}

fn ceil_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg("ceil", args, 0)?.ceil()))
}

fn abs_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg("abs", args, 0)?.abs()))
}

fn pow_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let base = number_arg("pow", args, 0)?;
    let exp = number_arg("pow", args, 1)?;
    Ok(Value::Number(base.powf(exp)))
}

fn sqrt_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let x = number_arg("sqrt", args, 0)?;
    if x < 0.0 {
        return Err(EvalError::function("sqrt", "negative argument"));
    }
    Ok(Value::Number(x.sqrt()))
}

/// `log(x[, base])`; natural logarithm without a base.
fn log_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let x = number_arg("log", args, 0)?;
    if x <= 0.0 {
        return Err(EvalError::function("log", "argument must be positive"));
    }
    match args.get(1) {
        None => Ok(Value::Number(x.ln())),
        Some(_) => {
            let base = number_arg("log", args, 1)?;
            if base <= 0.0 || base == 1.0 {
                return Err(EvalError::function("log", format!("invalid base {}", base)));
            }
            Ok(Value::Number(x.log(base)))
        }
    }
}

/// Truncates toward zero. Accepts numeric strings and booleans.
fn int_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let x = to_number(arg("int", args, 0)?, "int")?;
    if !x.is_finite() {
        return Err(EvalError::function("int", format!("cannot convert {} to an integer", x)));
    }
    Ok(Value::Number(x.trunc()))
}

fn float_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(to_number(arg("float", args, 0)?, "float")?))
}

pub(super) fn library() -> FunctionLibrary {
    FunctionLibrary::new("numeric")
        .function("min", Arity::Range(1, None), min_eval)
        .function("max", Arity::Range(1, None), max_eval)
        .function("round", Arity::Range(1, Some(2)), round_eval)
        .function("floor", Arity::Fixed(1), floor_eval)
        .function("ceil", Arity::Fixed(1), ceil_eval)
        .function("abs", Arity::Fixed(1), abs_eval)
        .function("pow", Arity::Fixed(2), pow_eval)
        .function("sqrt", Arity::Fixed(1), sqrt_eval)
        .function("log", Arity::Range(1, Some(2)), log_eval)
        .function("int", Arity::Fixed(1), int_eval)
        .function("float", Arity::Fixed(1), float_eval)
}
