use super::*;
use crate::ast::{Block, Node};
use crate::lexer::{advance, split_template, Chunk};

type Pos = (usize, usize);

/// What a single tag turned out to be once classified.
enum Tag {
    Comment,
    Expr(Expr),
    Open(Opening, Pos),
    Continue(Branch, Pos),
    End(Pos),
}

enum Opening {
    If(Expr),
    For { key: Option<String>, value: String, source: Expr },
    Set { name: String, value: Expr },
}

enum Branch {
    /// `{{ || }}`: else inside an `if`, empty inside a `for`.
    Bare,
    Else,
    Elif(Expr),
    Empty,
}

/// Why a body stopped collecting nodes.
enum Stop {
    Eof,
    End(Pos),
    Continue(Branch, Pos),
}

struct Cursor<'s> {
    chunks: std::vec::IntoIter<Chunk>,
    syntax: &'s Syntax,
    /// Blocks currently open around the next chunk.
    depth: usize,
}

pub(super) fn parse_template(source: &str, syntax: &Syntax) -> Result<Document, GeeError> {
    let chunks = split_template(source, syntax)?;
    let mut cursor = Cursor { chunks: chunks.into_iter(), syntax, depth: 0 };

    let (nodes, stop) = parse_body(&mut cursor)?;
    match stop {
        Stop::Eof => Ok(Document { nodes }),
        Stop::End((line, column)) => Err(GeeError::syntax("'end' without an open block", line, column, 220)),
        Stop::Continue(_, (line, column)) => Err(GeeError::syntax(
            format!("'{}' outside of an 'if' or 'for' block", syntax.cont),
            line,
            column,
            221,
        )
        .with_hint("Continuations belong between a block's opening tag and its 'end'")),
    }
}

fn parse_body(cursor: &mut Cursor) -> Result<(Vec<Node>, Stop), GeeError> {
    let mut nodes = Vec::new();

    while let Some(chunk) = cursor.chunks.next() {
        let (content, line, column) = match chunk {
            Chunk::Text(text) => {
                nodes.push(Node::Literal(text));
                continue;
            }
            Chunk::Tag { content, line, column } => (content, line, column),
        };

        match classify(&content, (line, column), cursor.syntax)? {
            Tag::Comment => {}
            Tag::Expr(expr) => nodes.push(Node::Expression(expr)),
            Tag::Open(opening, (line, column)) => {
                if cursor.depth >= MAX_BLOCK_DEPTH {
                    return Err(GeeError::syntax("Blocks nested too deeply", line, column, 230)
                        .with_hint(format!("At most {} blocks may be open at once", MAX_BLOCK_DEPTH)));
                }
                cursor.depth += 1;
                let block = parse_block(cursor, opening, (line, column))?;
                cursor.depth -= 1;
                nodes.push(Node::Block(block));
            }
            Tag::Continue(branch, pos) => return Ok((nodes, Stop::Continue(branch, pos))),
            Tag::End(pos) => return Ok((nodes, Stop::End(pos))),
        }
    }

    Ok((nodes, Stop::Eof))
}

fn parse_block(cursor: &mut Cursor, opening: Opening, open_pos: Pos) -> Result<Block, GeeError> {
    match opening {
        Opening::If(condition) => parse_if(cursor, condition, open_pos),
        Opening::For { key, value, source } => {
            let (body, stop) = parse_body(cursor)?;
            let empty = match stop {
                Stop::End(_) => Vec::new(),
                Stop::Continue(Branch::Bare | Branch::Empty | Branch::Else, _) => {
                    parse_last_branch(cursor, open_pos, "for")?
                }
                Stop::Continue(Branch::Elif(_), (line, column)) => {
                    return Err(GeeError::syntax("'elif' is only valid inside an 'if' block", line, column, 224));
                }
                Stop::Eof => return Err(unterminated(cursor.syntax, "for", open_pos)),
            };
            Ok(Block::For { key, value, source, body, empty })
        }
        Opening::Set { name, value } => {
            let (body, stop) = parse_body(cursor)?;
            match stop {
                Stop::End(_) => Ok(Block::Set { name, value, body }),
                Stop::Continue(_, (line, column)) => {
                    Err(GeeError::syntax("'set' blocks take no continuation", line, column, 225))
                }
                Stop::Eof => Err(unterminated(cursor.syntax, "set", open_pos)),
            }
        }
    }
}

fn parse_if(cursor: &mut Cursor, condition: Expr, open_pos: Pos) -> Result<Block, GeeError> {
    let mut branches = Vec::new();
    let mut condition = condition;

    loop {
        let (body, stop) = parse_body(cursor)?;
        match stop {
            Stop::End(_) => {
                branches.push((condition, body));
                return Ok(Block::If { branches, otherwise: Vec::new() });
            }
            Stop::Continue(Branch::Elif(next), _) => {
                branches.push((condition, body));
                condition = next;
            }
            Stop::Continue(Branch::Else | Branch::Bare, _) => {
                branches.push((condition, body));
                let otherwise = parse_last_branch(cursor, open_pos, "if")?;
                return Ok(Block::If { branches, otherwise });
            }
            Stop::Continue(Branch::Empty, (line, column)) => {
                return Err(GeeError::syntax("'empty' is only valid inside a 'for' block", line, column, 223));
            }
            Stop::Eof => return Err(unterminated(cursor.syntax, "if", open_pos)),
        }
    }
}

/// Body of an `else`/`empty` branch; nothing may follow it but `end`.
fn parse_last_branch(cursor: &mut Cursor, open_pos: Pos, kind: &str) -> Result<Vec<Node>, GeeError> {
    let (body, stop) = parse_body(cursor)?;
    match stop {
        Stop::End(_) => Ok(body),
        Stop::Continue(_, (line, column)) => Err(GeeError::syntax(
            format!("Continuation after the final branch of '{}'", kind),
            line,
            column,
            222,
        )),
        Stop::Eof => Err(unterminated(cursor.syntax, kind, open_pos)),
    }
}

fn unterminated(syntax: &Syntax, kind: &str, (line, column): Pos) -> GeeError {
    GeeError::syntax(format!("Unterminated '{}' block", kind), line, column, 226)
        .with_hint(format!("Close the block with '{} end {}'", syntax.begin, syntax.end))
}

fn classify(content: &str, pos: Pos, syntax: &Syntax) -> Result<Tag, GeeError> {
    let body = content.trim_start();
    let pos = advance(pos, &content[..content.len() - body.len()]);
    let body = body.trim_end();

    if body.starts_with('#') {
        return Ok(Tag::Comment);
    }
    if body.is_empty() {
        return Err(GeeError::syntax("Empty tag", pos.0, pos.1, 227));
    }

    if let Some(rest) = body.strip_prefix(syntax.cont.as_str()) {
        let after = advance(pos, &syntax.cont);
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            return Ok(Tag::Continue(Branch::Bare, pos));
        }
        let at = advance(after, &rest[..rest.len() - trimmed.len()]);
        let mut parser = Parser::at(trimmed, at.0, at.1)?;
        return Ok(Tag::Continue(parse_branch(&mut parser)?, pos));
    }

    // `{{ for t in tables || }}` reads the same as without the marker
    let body = if opens_block(body) {
        body.strip_suffix(syntax.cont.as_str()).map(str::trim_end).unwrap_or(body)
    } else {
        body
    };

    let mut parser = Parser::at(body, pos.0, pos.1)?;
    match parser.peek() {
        Some(Token::If) => {
            parser.bump()?;
            let condition = parser.parse_expression()?;
            parser.finish()?;
            Ok(Tag::Open(Opening::If(condition), pos))
        }
        Some(Token::For) => Ok(Tag::Open(parse_for_header(&mut parser)?, pos)),
        Some(Token::Set) => Ok(Tag::Open(parse_set_header(&mut parser)?, pos)),
        Some(Token::Else | Token::Elif | Token::Empty) => Ok(Tag::Continue(parse_branch(&mut parser)?, pos)),
        Some(Token::End) => {
            parser.bump()?;
            parser.finish()?;
            Ok(Tag::End(pos))
        }
        _ => {
            let expr = parser.parse_expression()?;
            parser.finish()?;
            Ok(Tag::Expr(expr))
        }
    }
}

fn opens_block(body: &str) -> bool {
    let word = body
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or("");
    matches!(word, "if" | "for" | "set")
}

fn parse_branch(parser: &mut Parser) -> Result<Branch, GeeError> {
    let branch = match parser.peek() {
        Some(Token::Else) => {
            parser.bump()?;
            Branch::Else
        }
        Some(Token::Empty) => {
            parser.bump()?;
            Branch::Empty
        }
        Some(Token::Elif) => {
            parser.bump()?;
            Branch::Elif(parser.parse_expression()?)
        }
        _ => {
            return Err(parser
                .error("Expected 'else', 'elif' or 'empty' in a continuation", 228)
                .with_hint("A bare continuation marker also starts the else/empty branch"));
        }
    };
    parser.finish()?;
    Ok(branch)
}

fn parse_for_header(parser: &mut Parser) -> Result<Opening, GeeError> {
    parser.bump()?;
    let first = parser.expect_ident("a loop variable")?;

    let (key, value) = if parser.peek() == Some(&Token::Comma) {
        parser.bump()?;
        (Some(first), parser.expect_ident("a value variable")?)
    } else {
        (None, first)
    };

    parser.expect(Token::In)?;
    let source = parser.parse_expression()?;
    parser.finish()?;
    Ok(Opening::For { key, value, source })
}

fn parse_set_header(parser: &mut Parser) -> Result<Opening, GeeError> {
    parser.bump()?;
    let name = parser.expect_ident("a variable name")?;

    match parser.peek() {
        Some(Token::To | Token::Assign) => {
            parser.bump()?;
        }
        _ => {
            return Err(parser
                .error(format!("Expected 'to' or '=' after '{}'", name), 229)
                .with_hint("Write 'set name to value'"));
        }
    }

    let value = parser.parse_expression()?;
    parser.finish()?;
    Ok(Opening::Set { name, value })
}
