// Author: Dustin Pilgrim
// License: MIT

use crate::ast::{Block, Document, Node};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::resolver::eval;
use crate::store::Store;
use crate::GeeError;

/// Renders parsed documents against a store.
///
/// Rendering never changes the document or the store. The only failure is
/// block nesting past `max_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    max_depth: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Renderer {
    pub fn new(max_depth: usize) -> Self {
        Renderer { max_depth }
    }

    pub fn render(&self, document: &Document, store: &Store) -> Result<String, GeeError> {
        let mut out = String::new();
        self.render_nodes(&document.nodes, store, 0, &mut out)?;
        Ok(out)
    }

    fn render_nodes(&self, nodes: &[Node], store: &Store, depth: usize, out: &mut String) -> Result<(), GeeError> {
        for node in nodes {
            match node {
                Node::Literal(text) => out.push_str(text),
                Node::Expression(expr) => out.push_str(&eval(expr, store).to_text()),
                Node::Block(block) => self.render_block(block, store, depth + 1, out)?,
            }
        }
        Ok(())
    }

    fn render_block(&self, block: &Block, store: &Store, depth: usize, out: &mut String) -> Result<(), GeeError> {
        if depth > self.max_depth {
            return Err(GeeError::RenderDepthExceeded { limit: self.max_depth });
        }

        match block {
            Block::If { branches, otherwise } => {
                let body = branches
                    .iter()
                    .find(|(condition, _)| eval(condition, store).is_truthy())
                    .map_or(otherwise, |(_, body)| body);
                self.render_nodes(body, &store.scope(), depth, out)
            }
            Block::For { key, value, source, body, empty } => {
                let source = eval(source, store);
                let entries = source.entries();
                if entries.is_empty() {
                    return self.render_nodes(empty, &store.scope(), depth, out);
                }

                for (entry_key, entry_value) in entries {
                    let mut scope = store.scope();
                    if let Some(key) = key {
                        scope.set(key.as_str(), entry_key);
                    }
                    scope.set(value.as_str(), entry_value.clone());
                    self.render_nodes(body, &scope, depth, out)?;
                }
                Ok(())
            }
            Block::Set { name, value, body } => {
                let mut scope = store.scope();
                scope.set(name.as_str(), eval(value, store).into_owned());
                self.render_nodes(body, &scope, depth, out)
            }
        }
    }
}
