// Author: Dustin Pilgrim
// License: MIT

//! JSON → [`Value`] conversion.
//!
//! Conversion is total: every JSON node maps to exactly one value with the
//! same shape. Scalar kinds JSON cannot tag on its own (dates, GUIDs, URIs,
//! time-spans, byte blobs) come in through the `From` impls below and are
//! normalized to their canonical text form, except byte blobs which become
//! an array of byte-sized integers.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone};
use indexmap::IndexMap;
use log::debug;

use crate::store::Store;
use crate::utils::format_time_span;
use crate::value::Value;
use crate::GeeError;

pub fn from_json(node: &serde_json::Value) -> Value {
    match node {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                // u64 above i64::MAX lands here too
                Value::Float(f)
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), from_json(v)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

impl From<serde_json::Value> for Value {
    fn from(node: serde_json::Value) -> Self {
        from_json(&node)
    }
}

/// Byte payloads become a list of integers in 0..=255.
pub fn from_blob(bytes: &[u8]) -> Value {
    Value::Array(bytes.iter().map(|b| Value::Integer(i64::from(*b))).collect())
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value
where
    Tz::Offset: std::fmt::Display,
{
    fn from(dt: DateTime<Tz>) -> Self {
        Value::String(dt.to_rfc3339())
    }
}

impl From<uuid::Uuid> for Value {
    fn from(id: uuid::Uuid) -> Self {
        Value::String(id.hyphenated().to_string())
    }
}

impl From<url::Url> for Value {
    fn from(url: url::Url) -> Self {
        Value::String(url.into())
    }
}

impl From<Duration> for Value {
    fn from(span: Duration) -> Self {
        Value::String(format_time_span(span, false))
    }
}

/// Signed time-span; a negative span gets a leading `-`.
impl From<TimeDelta> for Value {
    fn from(delta: TimeDelta) -> Self {
        let span = delta.abs().to_std().unwrap_or_default();
        Value::String(format_time_span(span, delta < TimeDelta::zero()))
    }
}

/// Build the global store from a parsed data document.
///
/// The document root must be an object; each of its keys becomes a name in
/// the store.
pub fn globals_from_json(node: &serde_json::Value) -> Result<Store<'static>, GeeError> {
    let serde_json::Value::Object(entries) = node else {
        return Err(GeeError::Conversion {
            message: format!("Expected a JSON object at the root of the data file, got {}", json_kind(node)),
            hint: Some("Wrap the data in an object, e.g. {\"database\": ...}".into()),
            code: Some(401),
        });
    };

    let mut store = Store::new();
    for (key, value) in entries {
        store.set(key.clone(), from_json(value));
    }
    debug!("global store built with {} root name(s)", entries.len());
    Ok(store)
}

fn json_kind(node: &serde_json::Value) -> &'static str {
    match node {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_scalars_keep_their_kind() {
        assert_eq!(from_json(&json!(null)), Value::Null);
        assert_eq!(from_json(&json!(true)), Value::Bool(true));
        assert_eq!(from_json(&json!(-3)), Value::Integer(-3));
        assert_eq!(from_json(&json!(1.5)), Value::Float(1.5));
        assert_eq!(from_json(&json!(u64::MAX)), Value::Float(u64::MAX as f64));
        assert_eq!(from_json(&json!("abc")), Value::from("abc"));
    }

    #[test]
    fn test_object_order_is_preserved() {
        let v = from_json(&json!({"zeta": 1, "alpha": 2, "mid": 3}));
        let keys: Vec<String> = v.as_map().unwrap().keys().map(|k| k.to_text()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_extended_kinds() {
        let dt = Utc.with_ymd_and_hms(2020, 5, 17, 8, 30, 0).unwrap();
        assert_eq!(Value::from(dt), Value::from("2020-05-17T08:30:00+00:00"));

        let id = uuid::Uuid::parse_str("936DA01F-9ABD-4D9D-80C7-02AF85C822A8").unwrap();
        assert_eq!(Value::from(id), Value::from("936da01f-9abd-4d9d-80c7-02af85c822a8"));

        let url = url::Url::parse("https://example.com/db?x=1").unwrap();
        assert_eq!(Value::from(url), Value::from("https://example.com/db?x=1"));

        assert_eq!(Value::from(Duration::from_secs(90_061)), Value::from("1.01:01:01"));
        assert_eq!(Value::from(TimeDelta::seconds(-90)), Value::from("-00:01:30"));
        assert_eq!(Value::from(TimeDelta::milliseconds(1_500)), Value::from("00:00:01.5000000"));
        assert_eq!(Value::from(TimeDelta::zero()), Value::from("00:00:00"));
        assert_eq!(
            from_blob(&[0, 127, 255]),
            Value::Array(vec![Value::Integer(0), Value::Integer(127), Value::Integer(255)])
        );
    }

    #[test]
    fn test_globals_require_object_root() {
        let store = globals_from_json(&json!({"x": "A", "n": 2})).unwrap();
        assert_eq!(store.resolve("x"), Value::from("A"));
        assert_eq!(store.resolve("n"), Value::Integer(2));

        let err = globals_from_json(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, GeeError::Conversion { .. }));
    }

    fn arb_json() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            (-1.0e9f64..1.0e9).prop_map(|f| json!(f)),
            "[a-z0-9 ]{0,8}".prop_map(serde_json::Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                    .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn same_shape(json: &serde_json::Value, value: &Value) -> bool {
        match (json, value) {
            (serde_json::Value::Null, Value::Null) => true,
            (serde_json::Value::Bool(a), Value::Bool(b)) => a == b,
            (serde_json::Value::Number(n), Value::Integer(i)) => n.as_i64() == Some(*i),
            (serde_json::Value::Number(n), Value::Float(f)) => n.as_f64() == Some(*f),
            (serde_json::Value::String(a), Value::String(b)) => a == b,
            (serde_json::Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_shape(x, y))
            }
            (serde_json::Value::Object(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((k1, v1), (k2, v2))| {
                        k2.as_str() == Some(k1.as_str()) && same_shape(v1, v2)
                    })
            }
            _ => false,
        }
    }

    proptest! {
        #[test]
        fn conversion_is_total_and_shape_preserving(json in arb_json()) {
            let value = from_json(&json);
            prop_assert!(same_shape(&json, &value));
        }
    }
}
