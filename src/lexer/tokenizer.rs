use super::*;
use super::scanner::{bump, peek_second, position, skip_whitespace};

pub(super) fn next_token(lexer: &mut Lexer) -> Result<Token, GeeError> {
    skip_whitespace(lexer);
    lexer.start = position(lexer);

    match lexer.peek {
        Some('.') => tokenize_symbol(lexer, Token::Dot),
        Some(',') => tokenize_symbol(lexer, Token::Comma),
        Some('(') => tokenize_symbol(lexer, Token::LParen),
        Some(')') => tokenize_symbol(lexer, Token::RParen),
        Some('[') => tokenize_symbol(lexer, Token::LBracket),
        Some(']') => tokenize_symbol(lexer, Token::RBracket),
        Some('+') => tokenize_symbol(lexer, Token::Plus),
        Some('-') => tokenize_symbol(lexer, Token::Minus),
        Some('*') => tokenize_symbol(lexer, Token::Star),
        Some('/') => tokenize_symbol(lexer, Token::Slash),
        Some('%') => tokenize_symbol(lexer, Token::Percent),
        Some('=') => tokenize_pair(lexer, '=', Token::EqEq, Token::Assign),
        Some('!') => tokenize_pair(lexer, '=', Token::NotEq, Token::Bang),
        Some('<') => tokenize_pair(lexer, '=', Token::Le, Token::Lt),
        Some('>') => tokenize_pair(lexer, '=', Token::Ge, Token::Gt),
        Some('&') if peek_second(lexer) == Some('&') => {
            bump(lexer);
            tokenize_symbol(lexer, Token::AndAnd)
        }
        Some('"') | Some('\'') => tokenize_string(lexer),
        Some(c) if c.is_ascii_digit() => tokenize_number(lexer),
        Some(c) if c.is_alphabetic() || c == '_' => tokenize_identifier_or_keyword(lexer),
        Some(ch) => tokenize_unexpected_char(lexer, ch),
        None => Ok(Token::Eof),
    }
}

fn tokenize_symbol(lexer: &mut Lexer, token: Token) -> Result<Token, GeeError> {
    bump(lexer);
    Ok(token)
}

/// Two-character operator when `second` follows, otherwise the single one.
fn tokenize_pair(lexer: &mut Lexer, second: char, double: Token, single: Token) -> Result<Token, GeeError> {
    bump(lexer);
    if lexer.peek == Some(second) {
        bump(lexer);
        Ok(double)
    } else {
        Ok(single)
    }
}

fn tokenize_string(lexer: &mut Lexer) -> Result<Token, GeeError> {
    let (line, column) = lexer.start;
    let quote = bump(lexer).unwrap_or('"');
    let mut content = String::new();

    loop {
        match bump(lexer) {
            Some(ch) if ch == quote => return Ok(Token::String(content)),
            Some('\\') => {
                let escaped = match bump(lexer) {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some(other) => other,
                    None => break,
                };
                content.push(escaped);
            }
            Some(ch) => content.push(ch),
            None => break,
        }
    }

    Err(GeeError::syntax(format!("Unclosed string starting with {}", quote), line, column, 103)
        .with_hint("String literal not closed"))
}

fn tokenize_number(lexer: &mut Lexer) -> Result<Token, GeeError> {
    let (line, column) = lexer.start;
    let mut num = String::new();
    while let Some(ch) = lexer.peek {
        if ch.is_ascii_digit() {
            num.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    // `rows.0.name` indexes; only a digit after the dot makes a float
    let fractional = !lexer.after_dot
        && lexer.peek == Some('.')
        && peek_second(lexer).is_some_and(|c| c.is_ascii_digit());

    if fractional {
        num.push('.');
        bump(lexer);
        while let Some(ch) = lexer.peek {
            if ch.is_ascii_digit() {
                num.push(ch);
                bump(lexer);
            } else {
                break;
            }
        }
        return num.parse::<f64>().map(Token::Float).map_err(|_| {
            GeeError::syntax(format!("Invalid number '{}'", num), line, column, 102)
        });
    }

    num.parse::<i64>().map(Token::Integer).map_err(|_| {
        GeeError::syntax(format!("Integer literal '{}' out of range", num), line, column, 102)
    })
}

fn tokenize_identifier_or_keyword(lexer: &mut Lexer) -> Result<Token, GeeError> {
    let mut ident = String::new();
    while let Some(ch) = lexer.peek {
        if ch.is_alphanumeric() || ch == '_' {
            ident.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    // property names after a dot are never keywords: `fk.to`, `t.empty`
    if lexer.after_dot {
        return Ok(Token::Ident(ident));
    }

    Ok(match ident.as_str() {
        "true" => Token::Bool(true),
        "false" => Token::Bool(false),
        "null" => Token::Null,
        "if" => Token::If,
        "elif" => Token::Elif,
        "else" => Token::Else,
        "for" => Token::For,
        "in" => Token::In,
        "empty" => Token::Empty,
        "set" => Token::Set,
        "to" => Token::To,
        "end" => Token::End,
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        _ => Token::Ident(ident),
    })
}

fn tokenize_unexpected_char(lexer: &mut Lexer, ch: char) -> Result<Token, GeeError> {
    let (line, column) = lexer.start;
    bump(lexer);
    Err(GeeError::syntax(format!("Unexpected character '{}'", ch), line, column, 104)
        .with_hint("Unexpected character in expression"))
}
