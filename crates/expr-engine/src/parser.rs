//! The compiler front door: text in, [`CompiledExpression`] out.

use crate::compiled::CompiledExpression;
use crate::error::SyntaxError;
use crate::grammar;
use crate::language::{FunctionLibrary, Language};
use crate::options::ParserOptions;
use std::sync::Arc;
use tracing::{debug, trace};

/// An external object carrying expression text and a slot for its compiled form.
///
/// Implemented by host types that want their stored expressions compiled once
/// and cached. See [`Parser::parse_evaluators`].
pub trait Evaluator {
    /// The expression text to compile.
    fn expr(&self) -> &str;

    /// Receives the compiled form.
    fn set_eval(&mut self, eval: CompiledExpression);
}

impl<E: Evaluator + ?Sized> Evaluator for &mut E {
    fn expr(&self) -> &str {
        (**self).expr()
    }

    fn set_eval(&mut self, eval: CompiledExpression) {
        (**self).set_eval(eval)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn expr(&self) -> &str {
        (**self).expr()
    }

    fn set_eval(&mut self, eval: CompiledExpression) {
        (**self).set_eval(eval)
    }
}

/// Compiles expression text against a [`Language`].
///
/// Holds no mutable state, so `parse` may be called from many threads.
#[derive(Debug, Clone)]
pub struct Parser {
    language: Arc<Language>,
    options: ParserOptions,
}

impl Parser {
    pub fn new(language: Arc<Language>) -> Self {
        Parser {
            language,
            options: ParserOptions::default(),
        }
    }

    /// A parser over every built-in library plus `extensions`.
    pub fn with_extensions(extensions: impl IntoIterator<Item = FunctionLibrary>) -> Self {
        Parser::new(Arc::new(Language::compose(extensions)))
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn language(&self) -> &Arc<Language> {
        &self.language
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse(&self, source: &str) -> Result<CompiledExpression, SyntaxError> {
        let root = grammar::parse(source, self.language.functions(), &self.options)?;
        trace!(source, "compiled expression");
        Ok(CompiledExpression::new(source, root))
    }

    /// Compiles each evaluator in order and binds the result back into it.
    ///
    /// Stops at the first failure and returns that error. Evaluators before the
    /// failing one stay bound; the failing one and everything after it are
    /// left untouched. Callers wanting all-or-nothing binding validate first.
    pub fn parse_evaluators<'e, E, I>(&self, evaluators: I) -> Result<(), SyntaxError>
    where
        E: Evaluator + ?Sized + 'e,
        I: IntoIterator<Item = &'e mut E>,
    {
        evaluators
            .into_iter()
            .enumerate()
            .try_for_each(|(index, evaluator)| {
                let compiled = self.parse(evaluator.expr()).map_err(|err| {
                    debug!(index, %err, "evaluator failed to compile; stopping batch");
                    err
                })?;
                evaluator.set_eval(compiled);
                debug!(index, "bound evaluator");
                Ok(())
            })
    }
}

impl Default for Parser {
    /// A parser over every built-in library.
    fn default() -> Self {
        Parser::with_extensions(std::iter::empty())
    }
}
