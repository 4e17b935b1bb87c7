use crate::functions::Builtin;
use crate::value::Value;

/// A parsed template. Immutable once built; render it as often as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(String),
    Expression(Expr),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// `if` / `elif` branches in order, then the `else` body (possibly empty).
    If {
        branches: Vec<(Expr, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
    For {
        key: Option<String>,
        value: String,
        source: Expr,
        body: Vec<Node>,
        empty: Vec<Node>,
    },
    Set {
        name: String,
        value: Expr,
        body: Vec<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Var(String),
    Access { target: Box<Expr>, key: Box<Expr> },
    Call(Builtin, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Array(Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Expr {
    pub fn access(target: Expr, key: Expr) -> Expr {
        Expr::Access { target: Box::new(target), key: Box::new(key) }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }
}
