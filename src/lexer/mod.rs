// Author: Dustin Pilgrim
// License: MIT

use std::str::Chars;
use crate::GeeError;

mod chunks;
mod scanner;
mod tokenizer;

pub use chunks::{split_template, Chunk};
pub(crate) use chunks::advance;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- literals ---
    Ident(String),
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,

    // --- structure ---
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,

    // --- operators ---
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    Bang,
    AndAnd,

    // --- keywords ---
    If,
    Elif,
    Else,
    For,
    In,
    Empty,
    Set,
    To,
    End,
    And,
    Or,
    Not,

    Eof,
}

/// Tokenizer over the content of a single tag.
///
/// Positions are 1-based and relative to the whole template, so the lexer
/// is started at the line/column where the tag content begins.
pub struct Lexer<'a> {
    input: Chars<'a>,
    peek: Option<char>,
    line: usize,
    column: usize,
    start: (usize, usize),
    after_dot: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::at(input, 1, 1)
    }

    /// Start lexing `input` whose first character sits at `line:column`.
    pub fn at(input: &'a str, line: usize, column: usize) -> Self {
        let mut lexer = Lexer {
            input: input.chars(),
            peek: None,
            line,
            column: column.saturating_sub(1),
            start: (line, column),
            after_dot: false,
        };
        lexer.peek = lexer.input.next();
        lexer
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Position where the most recent token started.
    pub fn token_start(&self) -> (usize, usize) {
        self.start
    }

    pub fn next_token(&mut self) -> Result<Token, GeeError> {
        let token = tokenizer::next_token(self)?;
        self.after_dot = token == Token::Dot;
        Ok(token)
    }
}
