// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

/// JSON-shaped data shared by the data file, script metadata and templates.
///
/// Map keys are themselves values; lookups go by equality. Floats compare
/// by bit pattern here so that `Value` can be a map key. Numeric equality
/// as templates see it (`1 == 1.0`) lives in the resolver.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(IndexMap<Value, Value>),
}

pub(crate) static NULL: Value = Value::Null;

impl Value {
    /// Null, false, zero and empty containers are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Map(m) => !m.is_empty(),
        }
    }

    /// Text form used when a value is written into a template's output.
    ///
    /// Containers use the compact JSON form from [`crate::export`].
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bytes(_) | Value::Array(_) | Value::Map(_) => crate::export::to_debug_text(self),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self { Some(s) } else { None }
    }

    pub fn as_map(&self) -> Option<&IndexMap<Value, Value>> {
        if let Value::Map(m) = self { Some(m) } else { None }
    }

    /// Property or index lookup. Missing keys and out-of-range indices are `None`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match (self, key) {
            (Value::Map(map), _) => map.get(key).or_else(|| match key {
                // `row.0` should still reach a JSON object key "0"
                Value::Integer(n) => map.get(&Value::String(n.to_string())),
                _ => None,
            }),
            (Value::Array(items), Value::Integer(n)) => usize::try_from(*n).ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    pub fn get_key(&self, name: &str) -> Option<&Value> {
        self.get(&Value::String(name.to_string()))
    }

    /// Elements an iteration block walks over, as (key, value) pairs.
    ///
    /// Arrays yield their index as key. Anything else yields nothing.
    pub fn entries(&self) -> Vec<(Value, &Value)> {
        match self {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (Value::Integer(i as i64), v))
                .collect(),
            Value::Map(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            _ => Vec::new(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Array(a) => a.hash(state),
            // map equality ignores order, so only the size goes in
            Value::Map(m) => m.len().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl<V: Into<Value>> FromIterator<(&'static str, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (&'static str, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (Value::from(k), v.into())).collect())
    }
}
