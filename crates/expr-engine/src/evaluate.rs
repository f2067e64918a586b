//! Tree-walking evaluation of a compiled expression.

use crate::ast::{Node, Pattern};
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::operators;
use crate::util::to_integer;
use crate::value::{Map, Value};
use crate::vars::Scope;
use std::borrow::Cow;

/// Evaluates `node` against the scope and context in `ctx`.
///
/// - Variables missing from the scope are an error, not null.
/// - `&&` and `||` short-circuit and always yield a boolean.
/// - `??` falls back only when the left side evaluates to null.
/// - Function arguments are evaluated left to right before the call.
pub(crate) fn evaluate(node: &Node, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    match node {
        Node::Literal(v) => Ok(v.clone()),
        Node::Array(items) => items
            .iter()
            .map(|item| evaluate(item, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Node::Map(entries) => entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), evaluate(v, ctx)?)))
            .collect::<Result<Map, EvalError>>()
            .map(Value::Map),
        Node::Variable(_) | Node::Member(..) | Node::Index(..) => {
            resolve(node, ctx).map(Cow::into_owned)
        }
        Node::Call(def, args) => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            ctx.check()?;
            def.call(&args, ctx)
        }
        Node::Unary(op, operand) => operators::unary(*op, evaluate(operand, ctx)?),
        Node::Binary(op, left, right) => {
            let left = evaluate(left, ctx)?;
            let right = evaluate(right, ctx)?;
            operators::binary(*op, left, right)
        }
        Node::And(left, right) => {
            if evaluate(left, ctx)?.is_empty() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(!evaluate(right, ctx)?.is_empty()))
        }
        Node::Or(left, right) => {
            if !evaluate(left, ctx)?.is_empty() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(!evaluate(right, ctx)?.is_empty()))
        }
        Node::Coalesce(left, right) => match evaluate(left, ctx)? {
            Value::Null => evaluate(right, ctx),
            v => Ok(v),
        },
        Node::Conditional(cond, then, otherwise) => {
            if evaluate(cond, ctx)?.is_empty() {
                evaluate(otherwise, ctx)
            } else {
                evaluate(then, ctx)
            }
        }
        Node::Match {
            negate,
            subject,
            pattern,
        } => {
            let op = if *negate { "!~" } else { "=~" };
            let subject = operators::match_subject(&evaluate(subject, ctx)?, op)?;
            let matched = match pattern {
                Pattern::Static(re) => re.is_match(&subject),
                Pattern::Dynamic(node) => match evaluate(node, ctx)? {
                    Value::String(p) => operators::compile_regex(&p)?.is_match(&subject),
                    other => return Err(EvalError::type_mismatch(op, "string", other.type_name())),
                },
            };
            Ok(Value::Bool(matched != *negate))
        }
    }
}

/// Resolves variable, member and index chains. Values reached through the
/// scope stay borrowed, so only the selected element is cloned.
fn resolve<'a>(node: &Node, ctx: &EvalCtx<'a>) -> Result<Cow<'a, Value>, EvalError> {
    match node {
        Node::Variable(name) => {
            let scope: &'a dyn Scope = ctx.scope;
            scope
                .lookup(name)
                .map(Cow::Borrowed)
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone()))
        }
        Node::Member(target, key) => match resolve(target, ctx)? {
            Cow::Borrowed(value) => member(value, key).map(Cow::Borrowed),
            Cow::Owned(value) => member(&value, key).map(|v| Cow::Owned(v.clone())),
        },
        Node::Index(target, index) => {
            let target = resolve(target, ctx)?;
            let index = evaluate(index, ctx)?;
            match target {
                Cow::Borrowed(value) => element(value, &index),
                Cow::Owned(value) => element(&value, &index).map(|v| Cow::Owned(v.into_owned())),
            }
        }
        other => evaluate(other, ctx).map(Cow::Owned),
    }
}

fn member<'v>(target: &'v Value, key: &str) -> Result<&'v Value, EvalError> {
    match target {
        Value::Map(map) => map
            .get(key)
            .ok_or_else(|| EvalError::UnknownKey(key.to_string())),
        other => Err(EvalError::NotIndexable(other.type_name())),
    }
}

fn element<'v>(target: &'v Value, index: &Value) -> Result<Cow<'v, Value>, EvalError> {
    match (target, index) {
        (Value::Map(map), Value::String(key)) => map
            .get(key.as_str())
            .map(Cow::Borrowed)
            .ok_or_else(|| EvalError::UnknownKey(key.clone())),
        (Value::Map(_), other) => Err(EvalError::type_mismatch("[]", "string", other.type_name())),
        (Value::Array(items), index) => {
            let i = position(index, items.len())?;
            Ok(Cow::Borrowed(&items[i]))
        }
        (Value::String(s), index) => {
            let len = s.chars().count();
            let i = position(index, len)?;
            Ok(Cow::Owned(
                s.chars()
                    .nth(i)
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or_default(),
            ))
        }
        (other, _) => Err(EvalError::NotIndexable(other.type_name())),
    }
}

fn position(index: &Value, len: usize) -> Result<usize, EvalError> {
    let i = match index {
        Value::Number(_) => to_integer(index, "[]")?,
        other => return Err(EvalError::type_mismatch("[]", "integer", other.type_name())),
    };
    if i < 0 || i as u64 >= len as u64 {
        return Err(EvalError::IndexOutOfBounds { index: i, len });
    }
    Ok(i as usize)
}
