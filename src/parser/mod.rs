// Author: Dustin Pilgrim
// License: MIT

use crate::ast::{Document, Expr};
use crate::config::Syntax;
use crate::lexer::{Lexer, Token};
use crate::GeeError;

mod document;
mod expr;

/// Expression trees deeper than this are rejected at parse time. Both
/// nesting and operator chains such as `a + b + c` count.
pub const MAX_EXPR_DEPTH: usize = 64;

/// Blocks nested deeper than this are rejected at parse time.
pub const MAX_BLOCK_DEPTH: usize = 256;

/// Parse template source into a [`Document`].
pub fn parse_template(source: &str, syntax: &Syntax) -> Result<Document, GeeError> {
    document::parse_template(source, syntax)
}

/// Recursive-descent parser over the content of one tag.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peek: Option<Token>,
    peek_pos: (usize, usize),
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, GeeError> {
        Self::at(input, 1, 1)
    }

    pub fn at(input: &'a str, line: usize, column: usize) -> Result<Self, GeeError> {
        let mut lexer = Lexer::at(input, line, column);
        let peek = Some(lexer.next_token()?);
        let peek_pos = lexer.token_start();
        Ok(Self { lexer, peek, peek_pos, depth: 0 })
    }

    pub(crate) fn bump(&mut self) -> Result<Token, GeeError> {
        let curr = self.peek.take().ok_or_else(|| {
            GeeError::syntax("Unexpected end of tag", self.peek_pos.0, self.peek_pos.1, 201)
        })?;
        self.peek = Some(self.lexer.next_token()?);
        self.peek_pos = self.lexer.token_start();
        Ok(curr)
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.peek.as_ref()
    }

    pub(crate) fn expect(&mut self, expected: Token) -> Result<Token, GeeError> {
        if self.peek() != Some(&expected) {
            return Err(self
                .error(format!("Expected {:?}, got {:?}", expected, self.peek().unwrap_or(&Token::Eof)), 202)
                .with_hint("Check your syntax"));
        }
        self.bump()
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> Result<String, GeeError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.bump()?;
                Ok(name)
            }
            other => Err(self.error(format!("Expected {}, got {:?}", what, other.unwrap_or(&Token::Eof)), 203)),
        }
    }

    /// The tag must be fully consumed.
    pub(crate) fn finish(&mut self) -> Result<(), GeeError> {
        match self.peek() {
            Some(Token::Eof) | None => Ok(()),
            Some(tok) => Err(self.error(format!("Unexpected {:?} after expression", tok), 204)),
        }
    }

    /// Go one level deeper, failing past [`MAX_EXPR_DEPTH`].
    pub(crate) fn deepen(&mut self) -> Result<(), GeeError> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err(self.error("Expression nested too deeply", 205));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `f`, then drop any depth it added with [`Parser::deepen`].
    pub(crate) fn chained<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, GeeError>,
    ) -> Result<T, GeeError> {
        let depth = self.depth;
        let result = f(self);
        self.depth = depth;
        result
    }

    /// Run `f` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, GeeError>,
    ) -> Result<T, GeeError> {
        self.chained(|parser| {
            parser.deepen()?;
            f(parser)
        })
    }

    /// Position of the token currently in `peek`.
    pub(crate) fn position(&self) -> (usize, usize) {
        self.peek_pos
    }

    pub(crate) fn error(&self, message: impl Into<String>, code: u32) -> GeeError {
        GeeError::syntax(message, self.peek_pos.0, self.peek_pos.1, code)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, GeeError> {
        expr::parse_expression(self)
    }
}

#[cfg(test)]
mod tests;
