use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::language::FunctionLibrary;
use crate::types::Arity;
use crate::util::{arg, string_arg};
use crate::value::Value;

/// Serializes any value; maps come out with sorted keys.
fn to_json_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    serde_json::to_string(arg("toJSON", args, 0)?)
        .map(Value::String)
        .map_err(|e| EvalError::function("toJSON", e.to_string()))
}

fn parse_json_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    serde_json::from_str::<serde_json::Value>(string_arg("parseJSON", args, 0)?)
        .map(Value::from)
        .map_err(|e| EvalError::function("parseJSON", e.to_string()))
}

pub(super) fn library() -> FunctionLibrary {
    FunctionLibrary::new("json")
        .function("toJSON", Arity::Fixed(1), to_json_eval)
        .function("parseJSON", Arity::Fixed(1), parse_json_eval)
}
