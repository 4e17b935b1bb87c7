#[cfg(test)]
use super::*;
#[cfg(test)]
use crate::ast::{BinaryOp, Block, Node, UnaryOp};
use crate::functions::Builtin;
use crate::value::Value;

fn parse(input: &str) -> Document {
    parse_template(input, &Syntax::default()).expect("Failed to parse template")
}

fn parse_err(input: &str) -> (usize, usize, Option<u32>) {
    match parse_template(input, &Syntax::default()) {
        Err(GeeError::TemplateSyntax { line, column, code, .. }) => (line, column, code),
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

fn expr(input: &str) -> Expr {
    let mut parser = Parser::new(input).expect("Failed to create parser");
    let expr = parser.parse_expression().expect("Failed to parse expression");
    parser.finish().expect("Trailing tokens");
    expr
}

fn var(name: &str) -> Expr {
    Expr::Var(name.into())
}

fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

#[test]
fn test_literal_and_expression() {
    let doc = parse("Hello {{ name }}!");
    assert_eq!(
        doc.nodes,
        vec![
            Node::Literal("Hello ".into()),
            Node::Expression(var("name")),
            Node::Literal("!".into()),
        ]
    );
}

#[test]
fn test_comment_produces_nothing() {
    let doc = parse("a{{# ignored }}b");
    assert_eq!(doc.nodes, vec![Node::Literal("a".into()), Node::Literal("b".into())]);
}

#[test]
fn test_member_access_chain() {
    assert_eq!(
        expr("fk.columns[0].name"),
        Expr::access(Expr::access(Expr::access(var("fk"), lit("columns")), lit(0)), lit("name"))
    );
    assert_eq!(expr("rows.1"), Expr::access(var("rows"), lit(1)));
}

#[test]
fn test_precedence() {
    // a or b and not c == 1 + 2 * 3
    let expected = Expr::binary(
        BinaryOp::Or,
        var("a"),
        Expr::binary(
            BinaryOp::And,
            var("b"),
            Expr::Unary(
                UnaryOp::Not,
                Box::new(Expr::binary(
                    BinaryOp::Eq,
                    var("c"),
                    Expr::binary(BinaryOp::Add, lit(1), Expr::binary(BinaryOp::Mul, lit(2), lit(3))),
                )),
            ),
        ),
    );
    assert_eq!(expr("a or b and not c == 1 + 2 * 3"), expected);
    assert_eq!(expr("a or b && !c == 1 + 2 * 3"), expected);
}

#[test]
fn test_unary_minus_and_parens() {
    assert_eq!(
        expr("-(1 - 2)"),
        Expr::Unary(UnaryOp::Neg, Box::new(Expr::binary(BinaryOp::Sub, lit(1), lit(2))))
    );
}

#[test]
fn test_calls_and_arrays() {
    assert_eq!(
        expr("join([\"a\", \"b\",], \", \")"),
        Expr::Call(
            Builtin::Join,
            vec![Expr::Array(vec![lit("a"), lit("b")]), lit(", ")]
        )
    );
    assert_eq!(expr("len(x)"), Expr::Call(Builtin::Len, vec![var("x")]));
}

#[test]
fn test_unknown_function_and_bad_arity() {
    assert_eq!(parse_err("{{ frob(x) }}"), (1, 4, Some(208)));
    assert_eq!(parse_err("{{ len(a, b) }}"), (1, 4, Some(209)));
}

#[test]
fn test_if_elif_else() {
    let doc = parse("{{ if a }}A{{ || elif b }}B{{ || else }}C{{ end }}");
    assert_eq!(
        doc.nodes,
        vec![Node::Block(Block::If {
            branches: vec![
                (var("a"), vec![Node::Literal("A".into())]),
                (var("b"), vec![Node::Literal("B".into())]),
            ],
            otherwise: vec![Node::Literal("C".into())],
        })]
    );
}

#[test]
fn test_bare_continuation_and_keyword_forms() {
    let bare = parse("{{ if a }}A{{ || }}C{{ end }}");
    let keyword = parse("{{ if a }}A{{ else }}C{{ end }}");
    assert_eq!(bare, keyword);
}

#[test]
fn test_for_with_trailing_marker_and_empty() {
    let doc = parse("{{ for t in tables || }}{{ t.name }},{{ || empty }}none{{ end }}");
    assert_eq!(
        doc.nodes,
        vec![Node::Block(Block::For {
            key: None,
            value: "t".into(),
            source: var("tables"),
            body: vec![
                Node::Expression(Expr::access(var("t"), lit("name"))),
                Node::Literal(",".into()),
            ],
            empty: vec![Node::Literal("none".into())],
        })]
    );
}

#[test]
fn test_for_key_value() {
    let doc = parse("{{ for k, v in map }}{{ k }}{{ end }}");
    match &doc.nodes[0] {
        Node::Block(Block::For { key, value, .. }) => {
            assert_eq!(key.as_deref(), Some("k"));
            assert_eq!(value, "v");
        }
        other => panic!("expected a for block, got {:?}", other),
    }
}

#[test]
fn test_set_block() {
    let doc = parse("{{ set n to 1 + 1 }}{{ n }}{{ end }}{{ set m = 'x' }}{{ end }}");
    assert_eq!(
        doc.nodes[0],
        Node::Block(Block::Set {
            name: "n".into(),
            value: Expr::binary(BinaryOp::Add, lit(1), lit(1)),
            body: vec![Node::Expression(var("n"))],
        })
    );
    assert!(matches!(doc.nodes[1], Node::Block(Block::Set { .. })));
}

#[test]
fn test_nested_blocks() {
    let doc = parse("{{ for t in ts }}{{ if t.ok }}y{{ end }}{{ end }}");
    match &doc.nodes[0] {
        Node::Block(Block::For { body, .. }) => assert!(matches!(body[0], Node::Block(Block::If { .. }))),
        other => panic!("expected a for block, got {:?}", other),
    }
}

#[test]
fn test_unterminated_block_points_at_opening_tag() {
    assert_eq!(parse_err("x\n{{ if a }}A"), (2, 4, Some(226)));
}

#[test]
fn test_stray_end_and_continuation() {
    assert_eq!(parse_err("a {{ end }}"), (1, 6, Some(220)));
    assert_eq!(parse_err("{{ || }}"), (1, 4, Some(221)));
}

#[test]
fn test_misplaced_branches() {
    assert_eq!(parse_err("{{ if a }}{{ || empty }}{{ end }}").2, Some(223));
    assert_eq!(parse_err("{{ for x in a }}{{ || elif b }}{{ end }}").2, Some(224));
    assert_eq!(parse_err("{{ if a }}{{ || }}{{ || }}{{ end }}").2, Some(222));
    assert_eq!(parse_err("{{ set a to 1 }}{{ || }}{{ end }}").2, Some(225));
}

#[test]
fn test_bad_headers() {
    assert_eq!(parse_err("{{ set a 1 }}{{ end }}").2, Some(229));
    assert_eq!(parse_err("{{ for in xs }}{{ end }}").2, Some(203));
    assert_eq!(parse_err("{{ for x of xs }}{{ end }}").2, Some(202));
    assert_eq!(parse_err("{{   }}").2, Some(227));
}

#[test]
fn test_trailing_tokens_rejected() {
    assert_eq!(parse_err("{{ a b }}"), (1, 6, Some(204)));
}

#[test]
fn test_expression_depth_limit() {
    let deep = format!("{{{{ {}1{} }}}}", "(".repeat(MAX_EXPR_DEPTH + 1), ")".repeat(MAX_EXPR_DEPTH + 1));
    assert_eq!(parse_err(&deep).2, Some(205));
    let ok = format!("{{{{ {}1{} }}}}", "(".repeat(10), ")".repeat(10));
    assert_eq!(parse(&ok).nodes, vec![Node::Expression(lit(1))]);
}

#[test]
fn test_long_operator_chains_hit_depth_limit() {
    let sum = format!("{{{{ {}1 }}}}", "1+".repeat(100_000));
    assert_eq!(parse_err(&sum).2, Some(205));

    let path = format!("{{{{ a{} }}}}", ".b".repeat(100_000));
    assert_eq!(parse_err(&path).2, Some(205));

    let both = format!("{{{{ a{} }}}}", " and a".repeat(100_000));
    assert_eq!(parse_err(&both).2, Some(205));

    let short = format!("{{{{ {}1 }}}}", "1+".repeat(10));
    assert!(parse_template(&short, &Syntax::default()).is_ok());
}

#[test]
fn test_block_depth_limit() {
    let deep = format!("{}{}", "{{ if 1 }}".repeat(100_000), "{{ end }}".repeat(100_000));
    let (line, column, code) = parse_err(&deep);
    assert_eq!(code, Some(230));
    assert_eq!((line, column), (1, MAX_BLOCK_DEPTH * 10 + 4));

    let nested = format!("{}x{}", "{{ if 1 }}".repeat(50), "{{ end }}".repeat(50));
    assert!(parse_template(&nested, &Syntax::default()).is_ok());
}

#[test]
fn test_custom_syntax() {
    let syntax = Syntax::new("<%", "|", "%>").unwrap();
    let doc = parse_template("<% if a %>A<% | %>B<% end %>", &syntax).expect("Failed to parse");
    assert!(matches!(doc.nodes[0], Node::Block(Block::If { .. })));
}
