//! Function libraries and their composition into a language.

use crate::compiled::{CompiledExpression, Evaluable};
use crate::context::Context;
use crate::error::{EvalError, Error};
use crate::eval_ctx::EvalCtx;
use crate::functions;
use crate::grammar;
use crate::options::ParserOptions;
use crate::types::{Arity, FunctionDefinition, FunctionMap};
use crate::value::Value;
use crate::vars::Scope;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A named set of functions, e.g. the `string` or `time` category.
#[derive(Debug, Clone)]
pub struct FunctionLibrary {
    category: Cow<'static, str>,
    functions: Vec<Arc<FunctionDefinition>>,
}

impl FunctionLibrary {
    pub fn new(category: impl Into<Cow<'static, str>>) -> Self {
        FunctionLibrary {
            category: category.into(),
            functions: Vec::new(),
        }
    }

    /// Adds a definition. A later definition shadows an earlier one with the same name.
    pub fn with(mut self, def: FunctionDefinition) -> Self {
        self.functions.push(Arc::new(def));
        self
    }

    /// Shorthand for `with(FunctionDefinition::new(..))`.
    pub fn function<F>(self, name: impl Into<Cow<'static, str>>, arity: Arity, eval_fn: F) -> Self
    where
        F: Fn(&[Value], &EvalCtx<'_>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.with(FunctionDefinition::new(name, arity, eval_fn))
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Looks a function up by name or alias.
    pub fn get(&self, name: &str) -> Option<&Arc<FunctionDefinition>> {
        self.functions.iter().rev().find(|f| f.names().any(|n| n == name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FunctionDefinition>> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// The grammar plus an ordered list of enabled function libraries.
///
/// Names resolve globally: when two libraries define the same name the one
/// appended later wins. A language never changes after construction and is
/// meant to be shared behind an [`Arc`].
#[derive(Debug, Clone, Default)]
pub struct Language {
    libraries: Vec<Arc<FunctionLibrary>>,
    functions: FunctionMap,
}

impl Language {
    /// Grammar only, no functions.
    pub fn base() -> Self {
        Self::default()
    }

    /// All built-in libraries in their fixed order, then `extra` in the given order.
    pub fn compose(extra: impl IntoIterator<Item = FunctionLibrary>) -> Self {
        Self::with_libraries(functions::all().into_iter().chain(extra))
    }

    /// Exactly the given libraries, in order.
    pub fn with_libraries(libraries: impl IntoIterator<Item = FunctionLibrary>) -> Self {
        let libraries: Vec<Arc<FunctionLibrary>> = libraries.into_iter().map(Arc::new).collect();
        let mut functions = FunctionMap::new();
        let mut origin: HashMap<String, String> = HashMap::new();

        for lib in &libraries {
            for def in lib.iter() {
                for name in def.names() {
                    if let Some(prev) = origin.insert(name.to_string(), lib.category().to_string()) {
                        debug!(
                            function = name,
                            previous = prev.as_str(),
                            library = lib.category(),
                            "function overridden"
                        );
                    }
                    functions.insert(name.to_string(), Arc::clone(def));
                }
            }
        }

        debug!(libraries = libraries.len(), functions = functions.len(), "language composed");
        Language { libraries, functions }
    }

    pub fn function(&self, name: &str) -> Option<&Arc<FunctionDefinition>> {
        self.functions.get(name)
    }

    pub(crate) fn functions(&self) -> &FunctionMap {
        &self.functions
    }

    pub fn libraries(&self) -> impl Iterator<Item = &FunctionLibrary> {
        self.libraries.iter().map(|l| l.as_ref())
    }

    /// Every callable name, aliases included, sorted.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Parses and evaluates `source` once with a background context.
    pub fn evaluate(&self, source: &str, scope: &dyn Scope) -> Result<Value, Error> {
        let root = grammar::parse(source, &self.functions, &ParserOptions::default())?;
        let compiled = CompiledExpression::new(source, root);
        Ok(compiled.eval(&Context::background(), scope)?)
    }
}
