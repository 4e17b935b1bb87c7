use super::*;
use crate::ast::{BinaryOp, UnaryOp};
use crate::functions::Builtin;
use crate::value::Value;

pub(super) fn parse_expression(parser: &mut Parser) -> Result<Expr, GeeError> {
    parse_or(parser)
}

// The chain loops below build left-deep trees, so every link counts as
// one level of depth.

fn parse_or(parser: &mut Parser) -> Result<Expr, GeeError> {
    parser.chained(|parser| {
        let mut lhs = parse_and(parser)?;
        while let Some(Token::Or) = parser.peek() {
            parser.bump()?;
            parser.deepen()?;
            let rhs = parse_and(parser)?;
            lhs = Expr::binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    })
}

fn parse_and(parser: &mut Parser) -> Result<Expr, GeeError> {
    parser.chained(|parser| {
        let mut lhs = parse_not(parser)?;
        while let Some(Token::And | Token::AndAnd) = parser.peek() {
            parser.bump()?;
            parser.deepen()?;
            let rhs = parse_not(parser)?;
            lhs = Expr::binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    })
}

fn parse_not(parser: &mut Parser) -> Result<Expr, GeeError> {
    if let Some(Token::Not | Token::Bang) = parser.peek() {
        parser.bump()?;
        let operand = parser.nested(parse_not)?;
        return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
    }
    parse_comparison(parser)
}

fn parse_comparison(parser: &mut Parser) -> Result<Expr, GeeError> {
    let lhs = parse_additive(parser)?;
    let op = match parser.peek() {
        Some(Token::EqEq) => BinaryOp::Eq,
        Some(Token::NotEq) => BinaryOp::NotEq,
        Some(Token::Lt) => BinaryOp::Lt,
        Some(Token::Le) => BinaryOp::Le,
        Some(Token::Gt) => BinaryOp::Gt,
        Some(Token::Ge) => BinaryOp::Ge,
        _ => return Ok(lhs),
    };
    parser.bump()?;
    let rhs = parse_additive(parser)?;
    Ok(Expr::binary(op, lhs, rhs))
}

fn parse_additive(parser: &mut Parser) -> Result<Expr, GeeError> {
    parser.chained(|parser| {
        let mut lhs = parse_multiplicative(parser)?;
        loop {
            let op = match parser.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            parser.bump()?;
            parser.deepen()?;
            let rhs = parse_multiplicative(parser)?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    })
}

fn parse_multiplicative(parser: &mut Parser) -> Result<Expr, GeeError> {
    parser.chained(|parser| {
        let mut lhs = parse_unary(parser)?;
        loop {
            let op = match parser.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            parser.bump()?;
            parser.deepen()?;
            let rhs = parse_unary(parser)?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    })
}

fn parse_unary(parser: &mut Parser) -> Result<Expr, GeeError> {
    if let Some(Token::Minus) = parser.peek() {
        parser.bump()?;
        let operand = parser.nested(parse_unary)?;
        return Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand)));
    }
    parse_postfix(parser)
}

fn parse_postfix(parser: &mut Parser) -> Result<Expr, GeeError> {
    parser.chained(|parser| {
        let mut expr = parse_primary(parser)?;
        loop {
            match parser.peek() {
                Some(Token::Dot) => {
                    parser.bump()?;
                    parser.deepen()?;
                    let key = match parser.peek() {
                        Some(Token::Ident(name)) => Value::String(name.clone()),
                        Some(Token::Integer(n)) => Value::Integer(*n),
                        _ => return Err(parser.error("Expected property name or index after '.'", 210)),
                    };
                    parser.bump()?;
                    expr = Expr::access(expr, Expr::Literal(key));
                }
                Some(Token::LBracket) => {
                    parser.bump()?;
                    parser.deepen()?;
                    let key = parse_expression(parser)?;
                    parser.expect(Token::RBracket)?;
                    expr = Expr::access(expr, key);
                }
                _ => return Ok(expr),
            }
        }
    })
}

fn parse_primary(parser: &mut Parser) -> Result<Expr, GeeError> {
    let literal = match parser.peek() {
        Some(Token::String(s)) => Some(Value::String(s.clone())),
        Some(Token::Integer(n)) => Some(Value::Integer(*n)),
        Some(Token::Float(f)) => Some(Value::Float(*f)),
        Some(Token::Bool(b)) => Some(Value::Bool(*b)),
        Some(Token::Null) => Some(Value::Null),
        _ => None,
    };
    if let Some(value) = literal {
        parser.bump()?;
        return Ok(Expr::Literal(value));
    }

    match parser.peek() {
        Some(Token::Ident(_)) => parse_name_or_call(parser),
        Some(Token::LParen) => {
            parser.bump()?;
            let inner = parser.nested(parse_expression)?;
            parser.expect(Token::RParen)?;
            Ok(inner)
        }
        Some(Token::LBracket) => {
            parser.bump()?;
            let items = parser.nested(|p| parse_list(p, Token::RBracket))?;
            Ok(Expr::Array(items))
        }
        Some(Token::Eof) | None => Err(parser.error("Expected an expression", 206)),
        Some(tok) => Err(parser
            .error(format!("Unexpected {:?} in expression", tok), 207)
            .with_hint("Keywords like 'end' or 'else' cannot be used as values")),
    }
}

fn parse_name_or_call(parser: &mut Parser) -> Result<Expr, GeeError> {
    let (line, column) = parser.position();
    let name = parser.expect_ident("a name")?;

    if parser.peek() != Some(&Token::LParen) {
        return Ok(Expr::Var(name));
    }

    let builtin = Builtin::lookup(&name).ok_or_else(|| {
        GeeError::syntax(format!("Unknown function '{}'", name), line, column, 208)
            .with_hint(format!("Available: {}", Builtin::names().join(", ")))
    })?;

    parser.bump()?;
    let args = parser.nested(|p| parse_list(p, Token::RParen))?;

    if !builtin.accepts(args.len()) {
        let (min, max) = builtin.arity();
        let expected = match max {
            Some(max) if max == min => format!("{}", min),
            Some(max) => format!("{} to {}", min, max),
            None => format!("at least {}", min),
        };
        return Err(GeeError::syntax(
            format!("Function '{}' takes {} argument(s), got {}", builtin.name(), expected, args.len()),
            line,
            column,
            209,
        ));
    }

    Ok(Expr::Call(builtin, args))
}

/// Comma separated expressions up to `close`, which is consumed.
/// A trailing comma is allowed.
fn parse_list(parser: &mut Parser, close: Token) -> Result<Vec<Expr>, GeeError> {
    let mut items = Vec::new();
    loop {
        if parser.peek() == Some(&close) {
            parser.bump()?;
            return Ok(items);
        }
        items.push(parse_expression(parser)?);
        match parser.peek() {
            Some(Token::Comma) => {
                parser.bump()?;
            }
            Some(tok) if *tok == close => {}
            _ => return Err(parser.error(format!("Expected ',' or {:?}", close), 211)),
        }
    }
}
