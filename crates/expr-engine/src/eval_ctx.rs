use crate::context::Context;
use crate::error::EvalError;
use crate::vars::Scope;

/// The execution context passed to every function.
pub struct EvalCtx<'a> {
    /// Cancellation context of the running evaluation.
    pub context: &'a Context,
    /// Scope the expression is evaluated against.
    pub scope: &'a dyn Scope,
}

impl<'a> EvalCtx<'a> {
    pub fn new(context: &'a Context, scope: &'a dyn Scope) -> Self {
        EvalCtx { context, scope }
    }

    /// Long-running functions call this inside their loops.
    pub fn check(&self) -> Result<(), EvalError> {
        self.context.check()
    }
}
