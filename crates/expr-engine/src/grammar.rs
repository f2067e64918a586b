//! Recursive-descent parser turning tokens into a compiled [`Node`] tree.
//!
//! Binary operators use precedence climbing. Levels, lowest first:
//! `?:` < `??` < `||` < `&&` < comparisons (`== != < <= > >= =~ !~ in`)
//! < `|` < `^` < `&` < `<< >>` < `+ -` < `* / %` < `**` < unary < postfix.
//! `?:` and `**` are right-associative, everything else left-associative.

use crate::ast::{BinaryOp, Node, Pattern, UnaryOp};
use crate::error::SyntaxError;
use crate::lexer::{Lexer, Spanned, Token};
use crate::options::ParserOptions;
use crate::types::FunctionMap;
use crate::value::Value;
use regex::Regex;

/// Parses `source`, resolving function names against `functions`.
pub(crate) fn parse(
    source: &str,
    functions: &FunctionMap,
    options: &ParserOptions,
) -> Result<Node, SyntaxError> {
    let tokens = Lexer::tokenize(source)?;
    if tokens.len() == 1 {
        return Err(SyntaxError::Empty);
    }
    let mut grammar = Grammar {
        tokens,
        pos: 0,
        functions,
        max_depth: options.max_depth,
        depth: 0,
    };
    let node = grammar.expression()?;
    if *grammar.peek() != Token::Eof {
        return Err(grammar.unexpected("end of expression"));
    }
    Ok(node)
}

fn binary_precedence(token: &Token) -> Option<(usize, bool)> {
    let prec = match token {
        Token::Coalesce => (2, false),
        Token::Or => (3, false),
        Token::And => (4, false),
        Token::Eq
        | Token::Ne
        | Token::Lt
        | Token::Le
        | Token::Gt
        | Token::Ge
        | Token::Match
        | Token::NotMatch
        | Token::In => (5, false),
        Token::BitOr => (6, false),
        Token::BitXor => (7, false),
        Token::BitAnd => (8, false),
        Token::Shl | Token::Shr => (9, false),
        Token::Plus | Token::Minus => (10, false),
        Token::Star | Token::Slash | Token::Percent => (11, false),
        Token::StarStar => (12, true),
        _ => return None,
    };
    Some(prec)
}

fn binary_op(token: &Token) -> Option<BinaryOp> {
    let op = match token {
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Sub,
        Token::Star => BinaryOp::Mul,
        Token::Slash => BinaryOp::Div,
        Token::Percent => BinaryOp::Rem,
        Token::StarStar => BinaryOp::Pow,
        Token::Eq => BinaryOp::Eq,
        Token::Ne => BinaryOp::Ne,
        Token::Lt => BinaryOp::Lt,
        Token::Le => BinaryOp::Le,
        Token::Gt => BinaryOp::Gt,
        Token::Ge => BinaryOp::Ge,
        Token::In => BinaryOp::In,
        Token::BitAnd => BinaryOp::BitAnd,
        Token::BitOr => BinaryOp::BitOr,
        Token::BitXor => BinaryOp::BitXor,
        Token::Shl => BinaryOp::Shl,
        Token::Shr => BinaryOp::Shr,
        _ => return None,
    };
    Some(op)
}

struct Grammar<'a> {
    tokens: Vec<Spanned>,
    pos: usize,
    functions: &'a FunctionMap,
    max_depth: usize,
    depth: usize,
}

impl<'a> Grammar<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn current_pos(&self) -> usize {
        self.tokens[self.pos].pos
    }

    /// Returns the current token and moves past it. Never moves past `Eof`.
    fn advance(&mut self) -> Spanned {
        let spanned = self.tokens[self.pos].clone();
        if spanned.token != Token::Eof {
            self.pos += 1;
        }
        spanned
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), SyntaxError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        unexpected_token(&self.tokens[self.pos], expected)
    }

    fn check_depth(&self, extra: usize, pos: usize) -> Result<(), SyntaxError> {
        if self.depth + extra > self.max_depth {
            Err(SyntaxError::TooDeep {
                limit: self.max_depth,
                pos,
            })
        } else {
            Ok(())
        }
    }

    /// Runs `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        self.check_depth(1, self.current_pos())?;
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expression(&mut self) -> Result<Node, SyntaxError> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> Result<Node, SyntaxError> {
        let cond = self.binary(0)?;
        if !self.eat(&Token::Question) {
            return Ok(cond);
        }
        let then = self.expression()?;
        self.expect(Token::Colon, "':'")?;
        let otherwise = self.expression()?;
        Ok(Node::Conditional(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn binary(&mut self, min_prec: usize) -> Result<Node, SyntaxError> {
        let mut left = self.unary()?;
        let mut chain = 0;
        while let Some((prec, right_assoc)) = binary_precedence(self.peek()) {
            if prec < min_prec {
                break;
            }
            let op = self.advance();
            let next_min = if right_assoc { prec } else { prec + 1 };
            let right = self.nested(|g| g.binary(next_min))?;
            // Left-associative chains grow the tree without recursing here.
            chain += 1;
            self.check_depth(chain, op.pos)?;
            left = combine(op, left, right)?;
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Node, SyntaxError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            Token::Not => UnaryOp::Not,
            Token::BitNot => UnaryOp::BitNot,
            _ => return self.postfix(),
        };
        self.advance();
        let operand = self.nested(Self::unary)?;
        Ok(match (op, operand) {
            (UnaryOp::Neg, Node::Literal(Value::Number(n))) => Node::Literal(Value::Number(-n)),
            (op, operand) => Node::Unary(op, Box::new(operand)),
        })
    }

    fn postfix(&mut self) -> Result<Node, SyntaxError> {
        let mut node = self.primary()?;
        let mut chain = 0;
        loop {
            let pos = self.current_pos();
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let name = match self.peek() {
                        Token::Ident(name) => name.clone(),
                        _ => return Err(self.unexpected("member name")),
                    };
                    self.advance();
                    node = Node::Member(Box::new(node), name);
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(Token::RBracket, "']'")?;
                    node = Node::Index(Box::new(node), Box::new(index));
                }
                _ => return Ok(node),
            }
            chain += 1;
            self.check_depth(chain, pos)?;
        }
    }

    fn primary(&mut self) -> Result<Node, SyntaxError> {
        let spanned = self.advance();
        let node = match spanned.token {
            Token::Number(n) => Node::Literal(Value::Number(n)),
            Token::Str(s) => Node::Literal(Value::String(s)),
            Token::True => Node::Literal(Value::Bool(true)),
            Token::False => Node::Literal(Value::Bool(false)),
            Token::Null => Node::Literal(Value::Null),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen, "')'")?;
                inner
            }
            Token::LBracket => {
                Node::Array(self.list(Token::RBracket, "']'", Self::expression)?)
            }
            Token::LBrace => Node::Map(self.list(Token::RBrace, "'}'", Self::entry)?),
            Token::Ident(name) => {
                if *self.peek() == Token::LParen {
                    self.call(name, spanned.pos)?
                } else {
                    Node::Variable(name)
                }
            }
            _ => return Err(unexpected_token(&spanned, "expression")),
        };
        Ok(node)
    }

    fn entry(&mut self) -> Result<(String, Node), SyntaxError> {
        let key = match self.peek() {
            Token::Ident(k) | Token::Str(k) => k.clone(),
            _ => return Err(self.unexpected("map key")),
        };
        self.advance();
        self.expect(Token::Colon, "':'")?;
        Ok((key, self.expression()?))
    }

    fn call(&mut self, name: String, pos: usize) -> Result<Node, SyntaxError> {
        let def = self
            .functions
            .get(&name)
            .cloned()
            .ok_or_else(|| SyntaxError::UnknownFunction {
                name: name.clone(),
                pos,
            })?;
        self.expect(Token::LParen, "'('")?;
        let args = self.list(Token::RParen, "')'", Self::expression)?;
        if !def.arity().accepts(args.len()) {
            return Err(SyntaxError::Arity {
                name,
                expected: def.arity().to_string(),
                found: args.len(),
                pos,
            });
        }
        Ok(Node::Call(def, args))
    }

    /// Comma separated items up to `close`; a trailing comma is allowed.
    fn list<T>(
        &mut self,
        close: Token,
        expected_close: &'static str,
        mut item: impl FnMut(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<Vec<T>, SyntaxError> {
        let mut items = Vec::new();
        loop {
            if self.eat(&close) {
                return Ok(items);
            }
            items.push(item(self)?);
            if !self.eat(&Token::Comma) {
                self.expect(close.clone(), expected_close)?;
                return Ok(items);
            }
        }
    }
}

fn unexpected_token(spanned: &Spanned, expected: &'static str) -> SyntaxError {
    match spanned.token {
        Token::Eof => SyntaxError::UnexpectedEnd { expected },
        ref other => SyntaxError::UnexpectedToken {
            found: other.to_string(),
            pos: spanned.pos,
        },
    }
}

fn combine(op: Spanned, left: Node, right: Node) -> Result<Node, SyntaxError> {
    let (left, right) = (Box::new(left), Box::new(right));
    let node = match op.token {
        Token::Coalesce => Node::Coalesce(left, right),
        Token::Or => Node::Or(left, right),
        Token::And => Node::And(left, right),
        Token::Match | Token::NotMatch => Node::Match {
            negate: op.token == Token::NotMatch,
            subject: left,
            pattern: match *right {
                Node::Literal(Value::String(pattern)) => {
                    let regex = Regex::new(&pattern).map_err(|e| SyntaxError::InvalidRegex {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    })?;
                    Pattern::Static(regex)
                }
                other => Pattern::Dynamic(Box::new(other)),
            },
        },
        ref token => match binary_op(token) {
            Some(op) => Node::Binary(op, left, right),
            None => return Err(unexpected_token(&op, "operator")),
        },
    };
    Ok(node)
}
