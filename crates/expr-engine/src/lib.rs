//! Embeddable expression engine: compile once, evaluate many times.
//!
//! # Overview
//!
//! A [`Language`] is composed from [`FunctionLibrary`] sets. A [`Parser`]
//! compiles expression text against a language into a [`CompiledExpression`],
//! which is then evaluated against any [`Scope`] (usually [`Vars`]) under a
//! cancellation [`Context`].
//!
//! # Example
//!
//! ```
//! use expr_engine::{Context, Evaluable, Parser, Value, Vars};
//!
//! let parser = Parser::default();
//! let expr = parser.parse("a > 5 && hasPrefix(name, 'ex')").unwrap();
//!
//! let vars = Vars::new().with("a", 10).with("name", "expr");
//! assert!(expr.test(&Context::background(), &vars).unwrap());
//!
//! let sum = parser.parse("1 + 1").unwrap();
//! assert_eq!(sum.eval(&Context::background(), &Vars::new()).unwrap(), Value::from(2));
//! ```

mod ast;
pub mod compiled;
pub mod context;
pub mod error;
pub mod eval_ctx;
mod evaluate;
pub mod functions;
mod grammar;
pub mod language;
mod lexer;
mod operators;
pub mod options;
pub mod parser;
pub mod types;
pub mod util;
pub mod value;
pub mod vars;

// Re-export the core public API
pub use compiled::{CompiledExpression, Evaluable};
pub use context::Context;
pub use error::{Error, EvalError, SyntaxError};
pub use eval_ctx::EvalCtx;
pub use language::{FunctionLibrary, Language};
pub use options::ParserOptions;
pub use parser::{Evaluator, Parser};
pub use types::{Arity, FunctionDefinition, FunctionFn, FunctionMap};
pub use value::{Map, Value};
pub use vars::{Scope, Vars};
