use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::value::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Function arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Skip the arity check.
    Any,
    /// Exactly `n` arguments.
    Fixed(usize),
    /// Between `min` and `max` arguments. `None` for no upper bound.
    Range(usize, Option<usize>),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Any => true,
            Arity::Fixed(f) => n == f,
            Arity::Range(min, max) => n >= min && max.map_or(true, |max| n <= max),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Arity::Any => f.write_str("any number of"),
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Range(min, None) => write!(f, "at least {}", min),
            Arity::Range(min, Some(max)) if min == max => write!(f, "{}", min),
            Arity::Range(min, Some(max)) => write!(f, "{} to {}", min, max),
        }
    }
}

/// The callable behind a function definition.
///
/// Arguments are fully evaluated before the call.
pub type FunctionFn = dyn Fn(&[Value], &EvalCtx<'_>) -> Result<Value, EvalError> + Send + Sync;

/// A named function callable from expressions.
#[derive(Clone)]
pub struct FunctionDefinition {
    name: Cow<'static, str>,
    aliases: Vec<Cow<'static, str>>,
    arity: Arity,
    eval_fn: Arc<FunctionFn>,
}

impl FunctionDefinition {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, arity: Arity, eval_fn: F) -> Self
    where
        F: Fn(&[Value], &EvalCtx<'_>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        FunctionDefinition {
            name: name.into(),
            aliases: Vec::new(),
            arity,
            eval_fn: Arc::new(eval_fn),
        }
    }

    /// Adds another name resolving to the same function.
    pub fn alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(|a| a.as_ref())
    }

    /// The canonical name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name()).chain(self.aliases())
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Invokes the function. Arity is re-checked so direct callers get an
    /// error rather than a panic inside the function body.
    pub fn call(&self, args: &[Value], ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
        if !self.arity.accepts(args.len()) {
            return Err(EvalError::function(
                self.name(),
                format!("expects {} arguments, got {}", self.arity, args.len()),
            ));
        }
        (self.eval_fn)(args, ctx)
    }
}

impl fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Map of function name/alias -> definition.
pub type FunctionMap = HashMap<String, Arc<FunctionDefinition>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_accepts() {
        assert!(Arity::Any.accepts(0));
        assert!(Arity::Fixed(2).accepts(2));
        assert!(!Arity::Fixed(2).accepts(3));
        assert!(Arity::Range(1, None).accepts(10));
        assert!(!Arity::Range(1, None).accepts(0));
        assert!(Arity::Range(1, Some(2)).accepts(2));
        assert!(!Arity::Range(1, Some(2)).accepts(3));
    }

    #[test]
    fn test_arity_display() {
        assert_eq!(Arity::Fixed(1).to_string(), "1");
        assert_eq!(Arity::Range(2, None).to_string(), "at least 2");
        assert_eq!(Arity::Range(2, Some(3)).to_string(), "2 to 3");
    }
}
