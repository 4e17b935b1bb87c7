// Author: Dustin Pilgrim
// License: MIT

use indexmap::IndexMap;

use crate::value::Value;

/// Name resolution environment a template renders against.
///
/// A store is a chain of scopes. Lookups walk from the innermost scope
/// outward; a child scope borrows its parent, so it can shadow names but
/// never change them, and it cannot outlive the block that made it.
#[derive(Debug, Default)]
pub struct Store<'p> {
    vars: IndexMap<String, Value>,
    parent: Option<&'p Store<'p>>,
}

impl Store<'static> {
    pub fn new() -> Self {
        Store { vars: IndexMap::new(), parent: None }
    }
}

impl<'p> Store<'p> {
    /// Open a child scope layered on this one.
    pub fn scope(&self) -> Store<'_> {
        Store { vars: IndexMap::new(), parent: Some(self) }
    }

    /// Bind a name in this scope. Rebinding in the same scope replaces.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.vars.get(name) {
            Some(v) => Some(v),
            None => self.parent.and_then(|p| p.get(name)),
        }
    }

    /// Like [`Store::get`], but an unknown name is `Null`.
    pub fn resolve(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or_default()
    }
}
