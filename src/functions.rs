// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::Value;

/// Functions a template may call. Names and arity are checked when the
/// template is parsed; calling one never fails at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Len,
    Upper,
    Lower,
    Cat,
    Join,
    Has,
    Default,
    Keys,
    Values,
    First,
    Last,
    Slice,
    Replace,
    Match,
    Type,
    Str,
}

static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    HashMap::from([
        ("len", Builtin::Len),
        ("upper", Builtin::Upper),
        ("lower", Builtin::Lower),
        ("cat", Builtin::Cat),
        ("join", Builtin::Join),
        ("has", Builtin::Has),
        ("default", Builtin::Default),
        ("keys", Builtin::Keys),
        ("values", Builtin::Values),
        ("first", Builtin::First),
        ("last", Builtin::Last),
        ("slice", Builtin::Slice),
        ("replace", Builtin::Replace),
        ("match", Builtin::Match),
        ("type", Builtin::Type),
        ("str", Builtin::Str),
    ])
});

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        BUILTINS.get(name).copied()
    }

    /// Every builtin name, sorted.
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<_> = BUILTINS.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn name(self) -> &'static str {
        BUILTINS
            .iter()
            .find(|(_, b)| **b == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    /// Accepted argument count as (min, max); `None` means variadic.
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            Builtin::Len | Builtin::Upper | Builtin::Lower => (1, Some(1)),
            Builtin::Keys | Builtin::Values | Builtin::First | Builtin::Last => (1, Some(1)),
            Builtin::Type | Builtin::Str => (1, Some(1)),
            Builtin::Cat => (1, None),
            Builtin::Join => (1, Some(2)),
            Builtin::Has | Builtin::Default | Builtin::Match => (2, Some(2)),
            Builtin::Slice => (2, Some(3)),
            Builtin::Replace => (3, Some(3)),
        }
    }

    pub fn accepts(self, count: usize) -> bool {
        let (min, max) = self.arity();
        count >= min && max.is_none_or(|m| count <= m)
    }

    pub fn call(self, args: &[Value]) -> Value {
        let arg = |i: usize| args.get(i).unwrap_or(&crate::value::NULL);

        match self {
            Builtin::Len => Value::Integer(match arg(0) {
                Value::String(s) => s.chars().count() as i64,
                Value::Bytes(b) => b.len() as i64,
                Value::Array(a) => a.len() as i64,
                Value::Map(m) => m.len() as i64,
                _ => 0,
            }),
            Builtin::Upper => Value::String(arg(0).to_text().to_uppercase()),
            Builtin::Lower => Value::String(arg(0).to_text().to_lowercase()),
            Builtin::Cat => cat(args),
            Builtin::Join => {
                let sep = args.get(1).map(Value::to_text).unwrap_or_default();
                match arg(0) {
                    Value::Array(items) => Value::String(
                        items.iter().map(Value::to_text).collect::<Vec<_>>().join(&sep),
                    ),
                    Value::Map(m) => Value::String(
                        m.values().map(Value::to_text).collect::<Vec<_>>().join(&sep),
                    ),
                    other => Value::String(other.to_text()),
                }
            }
            Builtin::Has => Value::Bool(match arg(0) {
                Value::Map(m) => m.contains_key(arg(1)) || arg(0).get(arg(1)).is_some(),
                Value::Array(a) => a.contains(arg(1)),
                Value::String(s) => s.contains(&arg(1).to_text()),
                _ => false,
            }),
            Builtin::Default => {
                if arg(0).is_truthy() {
                    arg(0).clone()
                } else {
                    arg(1).clone()
                }
            }
            Builtin::Keys => match arg(0) {
                Value::Map(m) => Value::Array(m.keys().cloned().collect()),
                Value::Array(a) => Value::Array((0..a.len() as i64).map(Value::Integer).collect()),
                _ => Value::Array(Vec::new()),
            },
            Builtin::Values => match arg(0) {
                Value::Map(m) => Value::Array(m.values().cloned().collect()),
                Value::Array(a) => Value::Array(a.clone()),
                _ => Value::Array(Vec::new()),
            },
            Builtin::First => arg(0).entries().first().map(|(_, v)| (*v).clone()).unwrap_or_default(),
            Builtin::Last => arg(0).entries().last().map(|(_, v)| (*v).clone()).unwrap_or_default(),
            Builtin::Slice => slice(arg(0), arg(1), args.get(2)),
            Builtin::Replace => Value::String(
                arg(0).to_text().replace(&arg(1).to_text(), &arg(2).to_text()),
            ),
            Builtin::Match => Value::Bool(
                Regex::new(&arg(1).to_text())
                    .map(|re| re.is_match(&arg(0).to_text()))
                    .unwrap_or(false),
            ),
            Builtin::Type => Value::from(arg(0).type_name()),
            Builtin::Str => Value::String(arg(0).to_text()),
        }
    }
}

/// Arrays concatenate into an array; anything else joins as text.
fn cat(args: &[Value]) -> Value {
    if args.iter().all(|a| matches!(a, Value::Array(_))) {
        let mut out = Vec::new();
        for a in args {
            if let Value::Array(items) = a {
                out.extend(items.iter().cloned());
            }
        }
        Value::Array(out)
    } else {
        Value::String(args.iter().map(Value::to_text).collect())
    }
}

fn slice(subject: &Value, start: &Value, count: Option<&Value>) -> Value {
    let len = match subject {
        Value::String(s) => s.chars().count(),
        Value::Array(a) => a.len(),
        _ => return Value::Null,
    };
    let start = match start {
        Value::Integer(n) if *n >= 0 => (*n as usize).min(len),
        _ => return Value::Null,
    };
    let end = match count {
        None => len,
        Some(Value::Integer(n)) if *n >= 0 => start.saturating_add(*n as usize).min(len),
        Some(_) => return Value::Null,
    };

    match subject {
        Value::String(s) => Value::String(s.chars().skip(start).take(end - start).collect()),
        Value::Array(a) => Value::Array(a[start..end].to_vec()),
        _ => Value::Null,
    }
}
