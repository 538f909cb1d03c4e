use jexl_lang::{Expr, Grammar, Lexer, ParseError, ParseOptions, Parser, Pool, Value};

fn parse_in(grammar: &Grammar, input: &str, options: ParseOptions) -> Result<Expr, ParseError> {
    let tokens = Lexer::new(input, grammar).tokenize().unwrap();
    Parser::with_options(grammar, options).parse(tokens)
}

fn parse(input: &str) -> Result<Expr, ParseError> {
    parse_in(&Grammar::new(), input, ParseOptions::default())
}

fn lit(value: impl Into<Value>) -> Expr {
    Expr::literal(value)
}

fn ident(name: &str) -> Expr {
    Expr::ident(name)
}

fn rel(name: &str) -> Expr {
    Expr::Identifier {
        name: name.to_string(),
        from: None,
        relative: true,
    }
}

fn prop(from: Expr, name: &str) -> Expr {
    Expr::Identifier {
        name: name.to_string(),
        from: Some(Box::new(from)),
        relative: false,
    }
}

fn bin(operator: &str, left: Expr, right: Expr) -> Expr {
    Expr::BinaryExpression {
        operator: operator.to_string(),
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn call(name: &str, args: Vec<Expr>, pool: Pool) -> Expr {
    Expr::FunctionCall {
        name: name.to_string(),
        args,
        pool,
    }
}

fn filter(subject: Expr, expr: Expr, relative: bool) -> Expr {
    Expr::FilterExpression {
        subject: Box::new(subject),
        expr: Box::new(expr),
        relative,
    }
}

fn conditional(test: Expr, consequent: Option<Expr>, alternate: Expr) -> Expr {
    Expr::ConditionalExpression {
        test: Box::new(test),
        consequent: consequent.map(Box::new),
        alternate: Box::new(alternate),
    }
}

// ============================================================================
// Operands
// ============================================================================

#[test]
fn test_literal() {
    assert_eq!(parse("42").unwrap(), lit(42i64));
    assert_eq!(parse("'hi'").unwrap(), lit("hi"));
    assert_eq!(parse("undefined").unwrap(), lit(Value::Undefined));
}

#[test]
fn test_identifier_chain() {
    assert_eq!(parse("a.b.c").unwrap(), prop(prop(ident("a"), "b"), "c"));
}

#[test]
fn test_whitespace_is_insignificant() {
    assert_eq!(parse("a\n+\tb . c").unwrap(), parse("a+b.c").unwrap());
}

#[test]
fn test_parsing_is_deterministic() {
    let source = "users[.age > min].name|upper ? {a: [1, 2]} : f(x, y)";
    assert_eq!(parse(source).unwrap(), parse(source).unwrap());
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(
        parse("2+3*4").unwrap(),
        bin("+", lit(2i64), bin("*", lit(3i64), lit(4i64)))
    );
    assert_eq!(
        parse("2*3+4").unwrap(),
        bin("+", bin("*", lit(2i64), lit(3i64)), lit(4i64))
    );
}

#[test]
fn test_comparison_is_root() {
    assert_eq!(
        parse("2+3*4==5/6-7").unwrap(),
        bin(
            "==",
            bin("+", lit(2i64), bin("*", lit(3i64), lit(4i64))),
            bin("-", bin("/", lit(5i64), lit(6i64)), lit(7i64))
        )
    );
}

#[test]
fn test_equal_precedence_groups_left() {
    assert_eq!(
        parse("10-2-3").unwrap(),
        bin("-", bin("-", lit(10i64), lit(2i64)), lit(3i64))
    );
    assert_eq!(
        parse("a && b || c").unwrap(),
        bin("||", bin("&&", ident("a"), ident("b")), ident("c"))
    );
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(
        parse("(2+3)*4").unwrap(),
        bin("*", bin("+", lit(2i64), lit(3i64)), lit(4i64))
    );
}

#[test]
fn test_unary_binds_tightest() {
    let not_a = Expr::UnaryExpression {
        operator: "!".to_string(),
        right: Box::new(prop(ident("a"), "b")),
    };
    assert_eq!(parse("!a.b && c").unwrap(), bin("&&", not_a, ident("c")));
}

#[test]
fn test_double_negation() {
    let expected = Expr::UnaryExpression {
        operator: "!".to_string(),
        right: Box::new(Expr::UnaryExpression {
            operator: "!".to_string(),
            right: Box::new(ident("a")),
        }),
    };
    assert_eq!(parse("!!a").unwrap(), expected);
}

#[test]
fn test_custom_operator_precedence() {
    let mut grammar = Grammar::new();
    grammar.add_binary_op("**", 70, |_, _| Ok(Value::Null));
    let options = ParseOptions::default();
    assert_eq!(
        parse_in(&grammar, "2 * 2 ** 3", options).unwrap(),
        bin("*", lit(2i64), bin("**", lit(2i64), lit(3i64)))
    );
    assert_eq!(
        parse_in(&grammar, "2 ** 3 ** 2", options).unwrap(),
        bin("**", bin("**", lit(2i64), lit(3i64)), lit(2i64))
    );
}

#[test]
fn test_custom_low_precedence_operator() {
    let mut grammar = Grammar::new();
    grammar.add_binary_op("=>", 1, |_, b| Ok(b.clone()));
    assert_eq!(
        parse_in(&grammar, "a || b => c", ParseOptions::default()).unwrap(),
        bin("=>", bin("||", ident("a"), ident("b")), ident("c"))
    );
}

#[test]
fn test_custom_unary_operator() {
    let mut grammar = Grammar::new();
    grammar.add_unary_op("~", |v| Ok(v.clone()));
    let expected = bin(
        "+",
        Expr::UnaryExpression {
            operator: "~".to_string(),
            right: Box::new(ident("a")),
        },
        lit(1i64),
    );
    assert_eq!(parse_in(&grammar, "~a + 1", ParseOptions::default()).unwrap(), expected);
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_ternary_wraps_whole_test() {
    assert_eq!(
        parse("x > 1 ? 'y' : 'n'").unwrap(),
        conditional(bin(">", ident("x"), lit(1i64)), Some(lit("y")), lit("n"))
    );
}

#[test]
fn test_elvis() {
    assert_eq!(
        parse("a ?: b").unwrap(),
        conditional(ident("a"), None, ident("b"))
    );
}

#[test]
fn test_nested_ternary_in_alternate() {
    assert_eq!(
        parse("a ? b : c ? d : e").unwrap(),
        conditional(
            ident("a"),
            Some(ident("b")),
            conditional(ident("c"), Some(ident("d")), ident("e"))
        )
    );
}

#[test]
fn test_nested_ternary_in_consequent() {
    assert_eq!(
        parse("a ? b ? c : d : e").unwrap(),
        conditional(
            ident("a"),
            Some(conditional(ident("b"), Some(ident("c")), ident("d"))),
            ident("e")
        )
    );
}

#[test]
fn test_ternary_inside_array() {
    assert_eq!(
        parse("[a ? 1 : 2, 3]").unwrap(),
        Expr::ArrayLiteral(vec![
            conditional(ident("a"), Some(lit(1i64)), lit(2i64)),
            lit(3i64)
        ])
    );
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_relative_filter() {
    assert_eq!(
        parse("a[.b > 1]").unwrap(),
        filter(ident("a"), bin(">", rel("b"), lit(1i64)), true)
    );
}

#[test]
fn test_index_filter() {
    assert_eq!(parse("a[1]").unwrap(), filter(ident("a"), lit(1i64), false));
    assert_eq!(parse("a[b]").unwrap(), filter(ident("a"), ident("b"), false));
}

#[test]
fn test_relative_chain_in_filter() {
    assert_eq!(
        parse("a[.b.c]").unwrap(),
        filter(ident("a"), prop(rel("b"), "c"), true)
    );
}

#[test]
fn test_nested_filter_owns_relative_identifiers() {
    let inner = filter(ident("b"), rel("c"), true);
    assert_eq!(parse("a[b[.c]]").unwrap(), filter(ident("a"), inner, false));
}

#[test]
fn test_relative_subject_of_nested_filter() {
    let inner = filter(rel("b"), bin("==", rel("c"), lit(1i64)), true);
    assert_eq!(parse("a[.b[.c == 1]]").unwrap(), filter(ident("a"), inner, true));
}

#[test]
fn test_traversal_after_filter() {
    assert_eq!(
        parse("a[0].b").unwrap(),
        prop(filter(ident("a"), lit(0i64), false), "b")
    );
}

#[test]
fn test_chained_filters() {
    assert_eq!(
        parse("a[0][1]").unwrap(),
        filter(filter(ident("a"), lit(0i64), false), lit(1i64), false)
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_array_literal() {
    assert_eq!(
        parse("[1, a, 'x']").unwrap(),
        Expr::ArrayLiteral(vec![lit(1i64), ident("a"), lit("x")])
    );
    assert_eq!(parse("[]").unwrap(), Expr::ArrayLiteral(vec![]));
}

#[test]
fn test_array_literal_can_be_indexed() {
    assert_eq!(
        parse("[1, 2][0]").unwrap(),
        filter(Expr::ArrayLiteral(vec![lit(1i64), lit(2i64)]), lit(0i64), false)
    );
}

#[test]
fn test_object_literal() {
    assert_eq!(
        parse("{a: 1, 'b c': x + 1}").unwrap(),
        Expr::ObjectLiteral(vec![
            ("a".to_string(), lit(1i64)),
            ("b c".to_string(), bin("+", ident("x"), lit(1i64))),
        ])
    );
    assert_eq!(parse("{}").unwrap(), Expr::ObjectLiteral(vec![]));
}

#[test]
fn test_object_trailing_comma() {
    assert_eq!(
        parse("{a: 1,}").unwrap(),
        Expr::ObjectLiteral(vec![("a".to_string(), lit(1i64))])
    );
}

#[test]
fn test_object_literal_property() {
    assert_eq!(
        parse("{a: {b: 1}}.a.b").unwrap(),
        prop(
            prop(
                Expr::ObjectLiteral(vec![(
                    "a".to_string(),
                    Expr::ObjectLiteral(vec![("b".to_string(), lit(1i64))])
                )]),
                "a"
            ),
            "b"
        )
    );
}

// ============================================================================
// Calls and transforms
// ============================================================================

#[test]
fn test_function_call() {
    assert_eq!(
        parse("f(1, a)").unwrap(),
        call("f", vec![lit(1i64), ident("a")], Pool::Functions)
    );
    assert_eq!(parse("f()").unwrap(), call("f", vec![], Pool::Functions));
}

#[test]
fn test_nested_calls() {
    assert_eq!(
        parse("f(g(1), [2])").unwrap(),
        call(
            "f",
            vec![
                call("g", vec![lit(1i64)], Pool::Functions),
                Expr::ArrayLiteral(vec![lit(2i64)])
            ],
            Pool::Functions
        )
    );
}

#[test]
fn test_transform() {
    assert_eq!(
        parse("x|t").unwrap(),
        call("t", vec![ident("x")], Pool::Transforms)
    );
    assert_eq!(
        parse("x|t(1, 2)").unwrap(),
        call("t", vec![ident("x"), lit(1i64), lit(2i64)], Pool::Transforms)
    );
    assert_eq!(
        parse("x|t()").unwrap(),
        call("t", vec![ident("x")], Pool::Transforms)
    );
}

#[test]
fn test_pipes_fold_left() {
    assert_eq!(
        parse("5|double|addOne").unwrap(),
        call(
            "addOne",
            vec![call("double", vec![lit(5i64)], Pool::Transforms)],
            Pool::Transforms
        )
    );
}

#[test]
fn test_pipe_binds_tighter_than_operators() {
    assert_eq!(
        parse("a + b|t").unwrap(),
        bin("+", ident("a"), call("t", vec![ident("b")], Pool::Transforms))
    );
}

#[test]
fn test_transform_result_can_be_filtered() {
    assert_eq!(
        parse("x|t[0]").unwrap(),
        filter(call("t", vec![ident("x")], Pool::Transforms), lit(0i64), false)
    );
}

// ============================================================================
// Namespaces
// ============================================================================

#[test]
fn test_namespaced_function() {
    assert_eq!(
        parse("Math.max(a, 1)").unwrap(),
        call("Math.max", vec![ident("a"), lit(1i64)], Pool::Functions)
    );
    assert_eq!(
        parse("Utils.String.upper(s)").unwrap(),
        call("Utils.String.upper", vec![ident("s")], Pool::Functions)
    );
}

#[test]
fn test_dotted_run_without_call_is_traversal() {
    assert_eq!(parse("Math.max").unwrap(), prop(ident("Math"), "max"));
}

#[test]
fn test_traversal_after_namespaced_call() {
    assert_eq!(
        parse("Math.max(a).b").unwrap(),
        prop(call("Math.max", vec![ident("a")], Pool::Functions), "b")
    );
}

#[test]
fn test_namespaced_functions_disabled() {
    let options = ParseOptions {
        namespaced_functions: false,
        ..ParseOptions::default()
    };
    let grammar = Grammar::new();
    assert!(matches!(
        parse_in(&grammar, "Math.max(a)", options),
        Err(ParseError::InvalidCall { .. })
    ));
    assert_eq!(
        parse_in(&grammar, "max(a)", options).unwrap(),
        call("max", vec![ident("a")], Pool::Functions)
    );
}

#[test]
fn test_relative_call_is_rejected() {
    assert!(matches!(parse("a[.f(1)]"), Err(ParseError::InvalidCall { .. })));
}

#[test]
fn test_call_on_filter_is_rejected() {
    assert!(matches!(parse("a[0](1)"), Err(ParseError::InvalidCall { .. })));
}

#[test]
fn test_namespaced_transform() {
    assert_eq!(
        parse("x|str.upper").unwrap(),
        call("str.upper", vec![ident("x")], Pool::Transforms)
    );
    assert_eq!(
        parse("x|a.b.c(1)").unwrap(),
        call("a.b.c", vec![ident("x"), lit(1i64)], Pool::Transforms)
    );
}

#[test]
fn test_namespaced_transforms_disabled() {
    let options = ParseOptions {
        namespaced_transforms: false,
        ..ParseOptions::default()
    };
    assert_eq!(
        parse_in(&Grammar::new(), "x|split.length", options).unwrap(),
        prop(call("split", vec![ident("x")], Pool::Transforms), "length")
    );
}

#[test]
fn test_traversal_after_transform_args() {
    assert_eq!(
        parse("x|t(1).length").unwrap(),
        prop(call("t", vec![ident("x"), lit(1i64)], Pool::Transforms), "length")
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_empty_expression() {
    assert_eq!(parse(""), Err(ParseError::EmptyExpression));
}

#[test]
fn test_unexpected_token() {
    assert_eq!(
        parse("1 2"),
        Err(ParseError::UnexpectedToken {
            token: "2".to_string(),
            kind: jexl_lang::TokenKind::Literal,
            expr: "1 2".to_string(),
        })
    );
    assert!(matches!(parse("1)"), Err(ParseError::UnexpectedToken { .. })));
    assert!(matches!(parse("a.1"), Err(ParseError::UnexpectedToken { .. })));
    assert!(matches!(parse("{1: 2}"), Err(ParseError::UnexpectedToken { .. })));
}

#[test]
fn test_unexpected_token_message() {
    assert_eq!(
        parse("a b").unwrap_err().to_string(),
        "Token b (identifier) unexpected in expression: a b"
    );
}

#[test]
fn test_minus_without_operand_is_rejected() {
    assert!(matches!(
        parse("-x"),
        Err(ParseError::UnexpectedToken { token, .. }) if token == "-"
    ));
}

#[test]
fn test_unexpected_end() {
    for source in ["1 +", "a.", "(1", "a ? b", "a ? b :", "[1, 2", "{a", "f(1", "x|"] {
        assert!(
            matches!(parse(source), Err(ParseError::UnexpectedEnd { .. })),
            "{:?} -> {:?}",
            source,
            parse(source)
        );
    }
}

#[test]
fn test_empty_sub_expressions() {
    for source in ["()", "a[]", "{a:}", "[1,]", "f(1,)", "[,1]"] {
        assert!(
            matches!(parse(source), Err(ParseError::EmptySubExpression { .. })),
            "{:?} -> {:?}",
            source,
            parse(source)
        );
    }
}

#[test]
fn test_incomplete_operand_before_end_token() {
    assert!(matches!(parse("[1 +]"), Err(ParseError::UnexpectedToken { .. })));
    assert!(matches!(parse("f(a.)"), Err(ParseError::UnexpectedToken { .. })));
}

#[test]
fn test_removed_operator_no_longer_parses() {
    let mut grammar = Grammar::new();
    grammar.add_binary_op("**", 70, |_, _| Ok(Value::Null));
    assert!(parse_in(&grammar, "2 ** 3", ParseOptions::default()).is_ok());
    grammar.remove_op("**");
    // `**` now lexes as two multiplications
    let tokens = Lexer::new("2 ** 3", &grammar).tokenize().unwrap();
    assert!(Parser::new(&grammar).parse(tokens).is_err());
}
