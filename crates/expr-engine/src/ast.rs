//! The compiled expression tree.
//!
//! Function calls hold the resolved definition, so a tree is bound to the
//! language it was compiled with and never looks names up again.

use crate::types::FunctionDefinition;
use crate::value::Value;
use regex::Regex;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }
}

/// Right-hand side of `=~` / `!~`.
#[derive(Debug, Clone)]
pub(crate) enum Pattern {
    /// Literal pattern, compiled once at parse time.
    Static(Regex),
    Dynamic(Box<Node>),
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Literal(Value),
    Array(Vec<Node>),
    Map(Vec<(String, Node)>),
    Variable(String),
    Member(Box<Node>, String),
    Index(Box<Node>, Box<Node>),
    Call(Arc<FunctionDefinition>, Vec<Node>),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Coalesce(Box<Node>, Box<Node>),
    Conditional(Box<Node>, Box<Node>, Box<Node>),
    Match {
        negate: bool,
        subject: Box<Node>,
        pattern: Pattern,
    },
}
