use super::*;
use crate::config::Syntax;

/// A piece of template source: literal text or the content of one tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    Text(String),
    /// `line`/`column` locate the first character of `content`.
    Tag { content: String, line: usize, column: usize },
}

/// Cut template source into literal text and tag contents.
///
/// The end delimiter is not recognized inside a quoted string, so
/// `{{ "}}" }}` is a single tag.
pub fn split_template(source: &str, syntax: &Syntax) -> Result<Vec<Chunk>, GeeError> {
    let mut chunks = Vec::new();
    let mut rest = source;
    let mut pos = (1, 1);

    while let Some(open) = rest.find(&syntax.begin) {
        if open > 0 {
            chunks.push(Chunk::Text(rest[..open].to_string()));
        }
        let tag_pos = advance(pos, &rest[..open]);
        let content_pos = advance(tag_pos, &syntax.begin);
        let after = &rest[open + syntax.begin.len()..];

        let close = find_close(after, &syntax.end).ok_or_else(|| {
            GeeError::syntax("Unterminated tag", tag_pos.0, tag_pos.1, 101)
                .with_hint(format!("Close the tag with '{}'", syntax.end))
        })?;

        chunks.push(Chunk::Tag {
            content: after[..close].to_string(),
            line: content_pos.0,
            column: content_pos.1,
        });

        let consumed = open + syntax.begin.len() + close + syntax.end.len();
        pos = advance(pos, &rest[..consumed]);
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        chunks.push(Chunk::Text(rest.to_string()));
    }

    Ok(chunks)
}

/// Move a 1-based (line, column) position past `text`.
pub(crate) fn advance(pos: (usize, usize), text: &str) -> (usize, usize) {
    text.chars().fold(pos, |(line, column), ch| {
        if ch == '\n' { (line + 1, 1) } else { (line, column + 1) }
    })
}

fn find_close(text: &str, end: &str) -> Option<usize> {
    if !text.trim_start().starts_with('#') {
        if let Some(i) = find_close_outside_quotes(text, end) {
            return Some(i);
        }
    }
    // comments, and tags with a stray quote the lexer will report properly
    text.find(end)
}

fn find_close_outside_quotes(text: &str, end: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
            }
            None => {
                if text[i..].starts_with(end) {
                    return Some(i);
                }
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                }
            }
        }
    }
    None
}
