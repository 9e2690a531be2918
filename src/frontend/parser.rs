//! Recursive-descent parser.
//!
//! Grammar, loosest binding first; every binary operator is
//! left-associative, including `^`, and unary sign binds tighter
//! than `^`:
//!
//! ```text
//! expr    := term (('+'|'-') term)*
//! term    := power (('*'|'/') power)*
//! power   := unary ('^' unary)*
//! unary   := ('+'|'-') primary | primary
//! primary := Number | '(' expr ')'
//! ```
//!
//! Unary sign is desugared through a zero literal, so `-x` parses as
//! `0 - x` and `-2 ^ 2` as `(0 - 2) ^ 2`.

use std::fmt;

use super::lexer::Token;
use crate::ast::{BinOp, Node};

/// Why an expression was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownToken(String),
    UnexpectedToken(String),
    UnexpectedEnd,
    UnmatchedParentheses,
    TrailingInput,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownToken(t) => write!(f, "unknown token '{}'", t),
            ParseError::UnexpectedToken(t) => write!(f, "unexpected token '{}'", t),
            ParseError::UnexpectedEnd => write!(f, "unexpected end of expression"),
            ParseError::UnmatchedParentheses => write!(f, "unmatched parentheses"),
            ParseError::TrailingInput => write!(f, "there's an excess part of expression"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Token-stream cursor driving the descent.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Parse a full token sequence into an AST.
    pub fn parse(tokens: Vec<Token>) -> Result<Node, ParseError> {
        let mut parser = Parser { tokens, pos: 0 };
        let node = parser.expr()?;

        if !parser.check(&Token::End) {
            return Err(ParseError::TrailingInput);
        }

        Ok(node)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::End)
    }

    fn check(&self, token: &Token) -> bool {
        self.current() == token
    }

    fn accept(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Node, ParseError> {
        let mut node = self.term()?;

        loop {
            if self.accept(&Token::Plus) {
                node = Node::binary(BinOp::Add, node, self.term()?);
            } else if self.accept(&Token::Minus) {
                node = Node::binary(BinOp::Sub, node, self.term()?);
            } else {
                break;
            }
        }

        Ok(node)
    }

    fn term(&mut self) -> Result<Node, ParseError> {
        let mut node = self.power()?;

        loop {
            if self.accept(&Token::Star) {
                node = Node::binary(BinOp::Mul, node, self.power()?);
            } else if self.accept(&Token::Slash) {
                node = Node::binary(BinOp::Div, node, self.power()?);
            } else {
                break;
            }
        }

        Ok(node)
    }

    fn power(&mut self) -> Result<Node, ParseError> {
        let mut node = self.unary()?;

        // Folded left to right: a ^ b ^ c is (a ^ b) ^ c.
        while self.accept(&Token::Caret) {
            node = Node::binary(BinOp::Pow, node, self.unary()?);
        }

        Ok(node)
    }

    fn unary(&mut self) -> Result<Node, ParseError> {
        if self.accept(&Token::Plus) {
            Ok(Node::binary(BinOp::Add, Node::Value(0.0), self.primary()?))
        } else if self.accept(&Token::Minus) {
            Ok(Node::binary(BinOp::Sub, Node::Value(0.0), self.primary()?))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        match self.current().clone() {
            Token::Number(text) => {
                self.pos += 1;
                let value: f64 = text
                    .parse()
                    .map_err(|_| ParseError::UnknownToken(text.clone()))?;
                Ok(Node::Value(value))
            }
            Token::LParen => {
                self.pos += 1;
                let node = self.expr()?;
                if !self.accept(&Token::RParen) {
                    return Err(ParseError::UnmatchedParentheses);
                }
                Ok(node)
            }
            Token::Ident(text) => Err(ParseError::UnknownToken(text)),
            Token::End => Err(ParseError::UnexpectedEnd),
            other => Err(ParseError::UnexpectedToken(other.text().to_string())),
        }
    }
}
