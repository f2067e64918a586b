//! Compiled expressions and the `Evaluable` capability.

use crate::ast::Node;
use crate::context::Context;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::evaluate::evaluate;
use crate::value::Value;
use crate::vars::Scope;
use std::fmt;

/// Something that can be evaluated against a scope.
///
/// Implementors are immutable after construction, so one instance may be
/// evaluated from many threads at once.
pub trait Evaluable: Send + Sync {
    /// Evaluates to a value.
    fn eval(&self, ctx: &Context, scope: &dyn Scope) -> Result<Value, EvalError>;

    /// Evaluates and reports whether the result is non-empty.
    ///
    /// Equivalent to `!self.eval(ctx, scope)?.is_empty()`.
    fn test(&self, ctx: &Context, scope: &dyn Scope) -> Result<bool, EvalError> {
        self.eval(ctx, scope).map(|v| !v.is_empty())
    }
}

impl<E: Evaluable + ?Sized> Evaluable for &E {
    fn eval(&self, ctx: &Context, scope: &dyn Scope) -> Result<Value, EvalError> {
        (**self).eval(ctx, scope)
    }

    fn test(&self, ctx: &Context, scope: &dyn Scope) -> Result<bool, EvalError> {
        (**self).test(ctx, scope)
    }
}

impl<E: Evaluable + ?Sized> Evaluable for std::sync::Arc<E> {
    fn eval(&self, ctx: &Context, scope: &dyn Scope) -> Result<Value, EvalError> {
        (**self).eval(ctx, scope)
    }

    fn test(&self, ctx: &Context, scope: &dyn Scope) -> Result<bool, EvalError> {
        (**self).test(ctx, scope)
    }
}

/// The result of parsing one expression.
///
/// Holds its function definitions and literal regexes already resolved, so
/// evaluation never consults the language again.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    root: Node,
}

impl CompiledExpression {
    pub(crate) fn new(source: &str, root: Node) -> Self {
        CompiledExpression {
            source: source.to_string(),
            root,
        }
    }

    /// The text this expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Evaluable for CompiledExpression {
    fn eval(&self, ctx: &Context, scope: &dyn Scope) -> Result<Value, EvalError> {
        ctx.check()?;
        evaluate(&self.root, &EvalCtx::new(ctx, scope))
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
