use thiserror::Error;

/// Raised while compiling expression text.
///
/// `pos` fields are byte offsets into the source string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character {found:?} at {pos}")]
    UnexpectedChar { found: char, pos: usize },

    #[error("unexpected {found} at {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unclosed string starting at {pos}")]
    UnclosedString { pos: usize },

    #[error("invalid escape sequence at {pos}")]
    InvalidEscape { pos: usize },

    #[error("invalid number {text:?} at {pos}")]
    InvalidNumber { text: String, pos: usize },

    #[error("unknown function {name:?} at {pos}")]
    UnknownFunction { name: String, pos: usize },

    #[error("function {name:?} at {pos} expects {expected} arguments, got {found}")]
    Arity {
        name: String,
        expected: String,
        found: usize,
        pos: usize,
    },

    #[error("invalid regular expression {pattern:?}: {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("expression nesting exceeds {limit} levels at {pos}")]
    TooDeep { limit: usize, pos: usize },
}

/// Raised while evaluating a compiled expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("undefined variable {0:?}")]
    UndefinedVariable(String),

    #[error("unknown key {0:?}")]
    UnknownKey(String),

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("cannot index {0}")]
    NotIndexable(&'static str),

    #[error("{op}: expected {expected}, got {found}")]
    TypeMismatch {
        op: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid regular expression {pattern:?}: {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("{name}: {message}")]
    Function { name: String, message: String },

    #[error("evaluation cancelled")]
    Cancelled,

    #[error("evaluation deadline exceeded")]
    DeadlineExceeded,
}

impl EvalError {
    pub fn type_mismatch(op: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        EvalError::TypeMismatch {
            op: op.into(),
            expected,
            found,
        }
    }

    pub fn function(name: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::Function {
            name: name.into(),
            message: message.into(),
        }
    }

    /// True for the two errors produced by an aborted [`Context`](crate::Context).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, EvalError::Cancelled | EvalError::DeadlineExceeded)
    }
}

/// Either stage failing, for the one-shot [`Language::evaluate`](crate::Language::evaluate).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}
