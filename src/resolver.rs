// Author: Dustin Pilgrim
// License: MIT

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::store::Store;
use crate::value::{Value, NULL};

/// Evaluate an expression against a store.
///
/// Evaluation is total: unknown names, missing keys, out-of-range indices
/// and operations on mismatched kinds all produce `Null`. Plain reads are
/// borrowed from the store; anything computed is owned.
pub fn eval<'a>(expr: &Expr, store: &'a Store<'_>) -> Cow<'a, Value> {
    match expr {
        Expr::Literal(value) => Cow::Owned(value.clone()),
        Expr::Var(name) => Cow::Borrowed(store.get(name).unwrap_or(&NULL)),
        Expr::Access { target, key } => {
            let key = eval(key, store);
            match eval(target, store) {
                Cow::Borrowed(target) => Cow::Borrowed(target.get(&key).unwrap_or(&NULL)),
                Cow::Owned(target) => Cow::Owned(target.get(&key).cloned().unwrap_or_default()),
            }
        }
        Expr::Call(builtin, args) => {
            let args: Vec<Value> = args.iter().map(|a| eval(a, store).into_owned()).collect();
            Cow::Owned(builtin.call(&args))
        }
        Expr::Array(items) => Cow::Owned(Value::Array(
            items.iter().map(|item| eval(item, store).into_owned()).collect(),
        )),
        Expr::Unary(op, operand) => {
            let operand = eval(operand, store);
            Cow::Owned(match op {
                UnaryOp::Not => Value::Bool(!operand.is_truthy()),
                UnaryOp::Neg => negate(&operand),
            })
        }
        Expr::Binary(BinaryOp::Or, lhs, rhs) => {
            Cow::Owned(Value::Bool(eval(lhs, store).is_truthy() || eval(rhs, store).is_truthy()))
        }
        Expr::Binary(BinaryOp::And, lhs, rhs) => {
            Cow::Owned(Value::Bool(eval(lhs, store).is_truthy() && eval(rhs, store).is_truthy()))
        }
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, store);
            let rhs = eval(rhs, store);
            Cow::Owned(binary(*op, &lhs, &rhs))
        }
    }
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    match op {
        BinaryOp::Eq => Value::Bool(values_equal(lhs, rhs)),
        BinaryOp::NotEq => Value::Bool(!values_equal(lhs, rhs)),
        BinaryOp::Lt => Value::Bool(compare(lhs, rhs) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(compare(lhs, rhs), Some(Ordering::Less | Ordering::Equal))),
        BinaryOp::Gt => Value::Bool(compare(lhs, rhs) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(compare(lhs, rhs), Some(Ordering::Greater | Ordering::Equal))),
        BinaryOp::Add => add(lhs, rhs),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => arithmetic(op, lhs, rhs),
        // short-circuiting operators are handled in `eval`
        BinaryOp::Or => Value::Bool(lhs.is_truthy() || rhs.is_truthy()),
        BinaryOp::And => Value::Bool(lhs.is_truthy() && rhs.is_truthy()),
    }
}

/// Numbers compare by value across integer and float, everything else structurally.
pub fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (as_number(lhs), as_number(rhs)) {
        (Some(Number::Int(a)), Some(Number::Int(b))) => a == b,
        (Some(a), Some(b)) => a.to_f64() == b.to_f64(),
        _ => lhs == rhs,
    }
}

/// Ordering is only defined between two numbers or two strings.
pub fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (as_number(lhs)?, as_number(rhs)?) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        },
    }
}

fn add(lhs: &Value, rhs: &Value) -> Value {
    match (lhs, rhs) {
        (Value::String(_), _) | (_, Value::String(_)) => Value::String(lhs.to_text() + rhs.to_text().as_str()),
        (Value::Array(a), Value::Array(b)) => Value::Array(a.iter().chain(b).cloned().collect()),
        _ => arithmetic(BinaryOp::Add, lhs, rhs),
    }
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    let (Some(a), Some(b)) = (as_number(lhs), as_number(rhs)) else {
        return Value::Null;
    };

    if let (Number::Int(a), Number::Int(b)) = (a, b) {
        let result = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div => a.checked_div(b),
            BinaryOp::Rem => a.checked_rem(b),
            _ => None,
        };
        return result.map_or(Value::Null, Value::Integer);
    }

    let (a, b) = (a.to_f64(), b.to_f64());
    match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div => Value::Float(a / b),
        BinaryOp::Rem => Value::Float(a % b),
        _ => Value::Null,
    }
}

fn negate(value: &Value) -> Value {
    match value {
        Value::Integer(n) => n.checked_neg().map_or(Value::Null, Value::Integer),
        Value::Float(f) => Value::Float(-f),
        _ => Value::Null,
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn to_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Integer(n) => Some(Number::Int(*n)),
        Value::Float(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn run(input: &str, store: &Store) -> Value {
        let mut parser = Parser::new(input).expect("Failed to create parser");
        let expr = parser.parse_expression().expect("Failed to parse expression");
        eval(&expr, store).into_owned()
    }

    fn sample_store() -> Store<'static> {
        let mut store = Store::new();
        store.set(
            "db",
            serde_json::from_str::<serde_json::Value>(
                r#"{"name": "shop", "tables": [{"name": "A", "rows": 3}, {"name": "B", "rows": 0}], "0": "zero"}"#,
            )
            .expect("Failed to parse JSON")
            .into(),
        );
        store.set("n", Value::Integer(7));
        store
    }

    #[test]
    fn test_access_chains() {
        let store = sample_store();
        assert_eq!(run("db.name", &store), Value::from("shop"));
        assert_eq!(run("db.tables.1.name", &store), Value::from("B"));
        assert_eq!(run("db[\"tables\"][0].rows", &store), Value::Integer(3));
        assert_eq!(run("db.0", &store), Value::from("zero"));
    }

    #[test]
    fn test_missing_values_are_null() {
        let store = sample_store();
        assert_eq!(run("nope", &store), Value::Null);
        assert_eq!(run("db.tables.9.name", &store), Value::Null);
        assert_eq!(run("db.tables[-1]", &store), Value::Null);
        assert_eq!(run("n.field", &store), Value::Null);
    }

    #[test]
    fn test_access_on_computed_values() {
        let store = sample_store();
        assert_eq!(run("[10, 20, 30][1]", &store), Value::Integer(20));
        assert_eq!(run("keys(db)[0]", &store), Value::from("name"));
    }

    #[test]
    fn test_arithmetic() {
        let store = sample_store();
        assert_eq!(run("n * 2 + 1", &store), Value::Integer(15));
        assert_eq!(run("n / 2", &store), Value::Integer(3));
        assert_eq!(run("n % 4", &store), Value::Integer(3));
        assert_eq!(run("n / 2.0", &store), Value::Float(3.5));
        assert_eq!(run("-n", &store), Value::Integer(-7));
        assert_eq!(run("n / 0", &store), Value::Null);
        assert_eq!(run("9223372036854775807 + 1", &store), Value::Null);
        assert_eq!(run("true + 1", &store), Value::Null);
    }

    #[test]
    fn test_string_concatenation() {
        let store = sample_store();
        assert_eq!(run("'T_' + db.name + n", &store), Value::from("T_shop7"));
        assert_eq!(run("[1] + [2]", &store), Value::Array(vec![1.into(), 2.into()]));
    }

    #[test]
    fn test_comparisons() {
        let store = sample_store();
        assert_eq!(run("n == 7.0", &store), Value::Bool(true));
        assert_eq!(run("n != 7", &store), Value::Bool(false));
        assert_eq!(run("'a' < 'b'", &store), Value::Bool(true));
        assert_eq!(run("n >= 7 and n <= 7", &store), Value::Bool(true));
        assert_eq!(run("'7' == n", &store), Value::Bool(false));
        assert_eq!(run("'a' < 1", &store), Value::Bool(false));
        assert_eq!(run("[1, 2] == [1, 2]", &store), Value::Bool(true));
    }

    #[test]
    fn test_logic() {
        let store = sample_store();
        assert_eq!(run("db.tables.1.rows or n", &store), Value::Bool(true));
        assert_eq!(run("not db.tables.1.rows", &store), Value::Bool(true));
        assert_eq!(run("!'' && n", &store), Value::Bool(true));
        assert_eq!(run("nope and n", &store), Value::Bool(false));
    }

    #[test]
    fn test_builtin_calls() {
        let store = sample_store();
        assert_eq!(run("upper(db.name)", &store), Value::from("SHOP"));
        assert_eq!(run("len(db.tables)", &store), Value::Integer(2));
    }
}
