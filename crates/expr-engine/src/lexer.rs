//! Tokenizer for expression text.

use crate::error::SyntaxError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),

    // Keywords
    True,
    False,
    Null,
    In,

    // Delimiters & punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Question,

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Match,
    NotMatch,
    And,
    Or,
    Not,
    Coalesce,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Shl,
    Shr,

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Str(s) => write!(f, "string {:?}", s),
            Token::Ident(s) => write!(f, "identifier {:?}", s),
            Token::True => f.write_str("'true'"),
            Token::False => f.write_str("'false'"),
            Token::Null => f.write_str("'null'"),
            Token::In => f.write_str("'in'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::Comma => f.write_str("','"),
            Token::Colon => f.write_str("':'"),
            Token::Dot => f.write_str("'.'"),
            Token::Question => f.write_str("'?'"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::StarStar => f.write_str("'**'"),
            Token::Slash => f.write_str("'/'"),
            Token::Percent => f.write_str("'%'"),
            Token::Eq => f.write_str("'=='"),
            Token::Ne => f.write_str("'!='"),
            Token::Lt => f.write_str("'<'"),
            Token::Le => f.write_str("'<='"),
            Token::Gt => f.write_str("'>'"),
            Token::Ge => f.write_str("'>='"),
            Token::Match => f.write_str("'=~'"),
            Token::NotMatch => f.write_str("'!~'"),
            Token::And => f.write_str("'&&'"),
            Token::Or => f.write_str("'||'"),
            Token::Not => f.write_str("'!'"),
            Token::Coalesce => f.write_str("'??'"),
            Token::BitAnd => f.write_str("'&'"),
            Token::BitOr => f.write_str("'|'"),
            Token::BitXor => f.write_str("'^'"),
            Token::BitNot => f.write_str("'~'"),
            Token::Shl => f.write_str("'<<'"),
            Token::Shr => f.write_str("'>>'"),
            Token::Eof => f.write_str("end of expression"),
        }
    }
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub pos: usize,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Splits `input` into tokens, always ending with [`Token::Eof`].
    pub fn tokenize(input: &'a str) -> Result<Vec<Spanned>, SyntaxError> {
        let mut lexer = Lexer { input, pos: 0 };
        let mut tokens = Vec::new();
        loop {
            lexer.skip_whitespace();
            let pos = lexer.pos;
            let token = lexer.next_token()?;
            let done = token == Token::Eof;
            tokens.push(Spanned { token, pos });
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        let start = self.pos;
        let c = match self.advance() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '.' => Token::Dot,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::BitXor,
            '~' => Token::BitNot,
            '*' => {
                if self.eat('*') {
                    Token::StarStar
                } else {
                    Token::Star
                }
            }
            '?' => {
                if self.eat('?') {
                    Token::Coalesce
                } else {
                    Token::Question
                }
            }
            '=' => {
                if self.eat('=') {
                    Token::Eq
                } else if self.eat('~') {
                    Token::Match
                } else {
                    return Err(SyntaxError::UnexpectedChar { found: '=', pos: start });
                }
            }
            '!' => {
                if self.eat('=') {
                    Token::Ne
                } else if self.eat('~') {
                    Token::NotMatch
                } else {
                    Token::Not
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::Le
                } else if self.eat('<') {
                    Token::Shl
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge
                } else if self.eat('>') {
                    Token::Shr
                } else {
                    Token::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    Token::And
                } else {
                    Token::BitAnd
                }
            }
            '|' => {
                if self.eat('|') {
                    Token::Or
                } else {
                    Token::BitOr
                }
            }
            '"' | '\'' => Token::Str(self.string(c, start)?),
            '`' => Token::Str(self.raw_string(start)?),
            '0'..='9' => Token::Number(self.number(start)?),
            c if c == '_' || c.is_ascii_alphabetic() => {
                while matches!(self.peek(), Some(c) if c == '_' || c.is_ascii_alphanumeric()) {
                    self.advance();
                }
                match &self.input[start..self.pos] {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" | "nil" => Token::Null,
                    "in" => Token::In,
                    ident => Token::Ident(ident.to_string()),
                }
            }
            other => return Err(SyntaxError::UnexpectedChar { found: other, pos: start }),
        };
        Ok(token)
    }

    fn number(&mut self, start: usize) -> Result<f64, SyntaxError> {
        let invalid = |lexer: &Self| SyntaxError::InvalidNumber {
            text: lexer.input[start..lexer.pos].to_string(),
            pos: start,
        };

        if &self.input[start..self.pos] == "0" && matches!(self.peek(), Some('x' | 'X')) {
            self.advance();
            let digits = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.advance();
            }
            return u64::from_str_radix(&self.input[digits..self.pos], 16)
                .map(|n| n as f64)
                .map_err(|_| invalid(self));
        }

        self.digits();
        // A dot only belongs to the number when a digit follows, so `a[0].b` still works.
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            self.advance();
            self.digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                return Err(invalid(self));
            }
            self.digits();
        }
        if matches!(self.peek(), Some(c) if c == '_' || c.is_ascii_alphabetic()) {
            self.advance();
            return Err(invalid(self));
        }

        self.input[start..self.pos].parse::<f64>().map_err(|_| invalid(self))
    }

    fn digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn string(&mut self, quote: char, start: usize) -> Result<String, SyntaxError> {
        let mut out = String::new();
        loop {
            let c = self.advance().ok_or(SyntaxError::UnclosedString { pos: start })?;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escape_pos = self.pos - 1;
            let escaped = self.advance().ok_or(SyntaxError::UnclosedString { pos: start })?;
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                '\\' | '"' | '\'' | '/' => out.push(escaped),
                'u' => out.push(self.unicode_escape(escape_pos)?),
                _ => return Err(SyntaxError::InvalidEscape { pos: escape_pos }),
            }
        }
    }

    /// `\u{1F600}` or `\u00e9`.
    fn unicode_escape(&mut self, escape_pos: usize) -> Result<char, SyntaxError> {
        let invalid = SyntaxError::InvalidEscape { pos: escape_pos };
        let hex = if self.eat('{') {
            let from = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.advance();
            }
            let hex = &self.input[from..self.pos];
            if !self.eat('}') {
                return Err(invalid);
            }
            hex
        } else {
            let from = self.pos;
            for _ in 0..4 {
                match self.peek() {
                    Some(c) if c.is_ascii_hexdigit() => {
                        self.advance();
                    }
                    _ => return Err(invalid),
                }
            }
            &self.input[from..self.pos]
        };
        u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(invalid)
    }

    fn raw_string(&mut self, start: usize) -> Result<String, SyntaxError> {
        let from = self.pos;
        loop {
            match self.advance() {
                Some('`') => return Ok(self.input[from..self.pos - 1].to_string()),
                Some(_) => {}
                None => return Err(SyntaxError::UnclosedString { pos: start }),
            }
        }
    }
}
