use jexl_lang::{Grammar, LexError, Lexer, Token, TokenKind, Value};

fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let grammar = Grammar::new();
    Lexer::new(input, &grammar).tokenize()
}

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
}

fn values(input: &str) -> Vec<Value> {
    tokenize(input).unwrap().into_iter().map(|t| t.value).collect()
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_integer_literal() {
    assert_eq!(values("42"), vec![Value::Integer(42)]);
}

#[test]
fn test_float_literal() {
    assert_eq!(values("3.14"), vec![Value::Float(3.14)]);
}

#[test]
fn test_number_with_single_decimal_point_only() {
    // The second dot is a traversal dot
    assert_eq!(
        kinds("1.5.a"),
        vec![TokenKind::Literal, TokenKind::Dot, TokenKind::Identifier]
    );
}

#[test]
fn test_large_integer_falls_back_to_float() {
    assert_eq!(values("99999999999999999999"), vec![Value::Float(1e20)]);
}

#[test]
fn test_double_quoted_string() {
    assert_eq!(values(r#""hello world""#), vec![Value::from("hello world")]);
}

#[test]
fn test_single_quoted_string() {
    assert_eq!(values("'hello'"), vec![Value::from("hello")]);
}

#[test]
fn test_escaped_quotes() {
    assert_eq!(values(r#""say \"hi\"""#), vec![Value::from(r#"say "hi""#)]);
    assert_eq!(values(r"'it\'s'"), vec![Value::from("it's")]);
    assert_eq!(values(r#""back\\slash""#), vec![Value::from(r"back\slash")]);
}

#[test]
fn test_other_quote_needs_no_escape() {
    assert_eq!(values(r#""it's""#), vec![Value::from("it's")]);
}

#[test]
fn test_keyword_literals() {
    assert_eq!(
        values("true false null undefined"),
        vec![Value::Boolean(true), Value::Boolean(false), Value::Null, Value::Undefined]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    assert_eq!(kinds("trueish nullable"), vec![TokenKind::Identifier, TokenKind::Identifier]);
}

// ============================================================================
// Identifiers and word operators
// ============================================================================

#[test]
fn test_identifiers() {
    let tokens = tokenize("$price _id héllo_wörld x2").unwrap();
    let names: Vec<_> = tokens.iter().map(|t| t.text()).collect();
    assert_eq!(names, vec!["$price", "_id", "héllo_wörld", "x2"]);
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Identifier));
}

#[test]
fn test_in_is_an_operator() {
    let tokens = tokenize("a in b").unwrap();
    assert_eq!(tokens[1].kind, TokenKind::BinaryOp);
    assert_eq!(tokens[1].text(), "in");
}

#[test]
fn test_word_starting_with_in_is_identifier() {
    assert_eq!(kinds("inside"), vec![TokenKind::Identifier]);
}

#[test]
fn test_identifiers_with_combining_marks() {
    // The vowel sign in नाम is a spacing mark, not a letter
    let tokens = tokenize("नाम == שָׁלוֹם").unwrap();
    let names: Vec<_> = tokens.iter().map(|t| t.text()).collect();
    assert_eq!(names, vec!["नाम", "==", "שָׁלוֹם"]);
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
}

#[test]
fn test_letter_number_identifier() {
    let tokens = tokenize("Ⅰ + Ⅻ").unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0].text(), "Ⅰ");
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
}

#[test]
fn test_lone_combining_mark_is_rejected() {
    assert!(matches!(
        tokenize("\u{0301}"),
        Err(LexError::UnexpectedCharacter { position: 0, .. })
    ));
}

#[test]
fn test_word_operator_after_dot_is_property() {
    assert_eq!(
        kinds("a.in in b"),
        vec![TokenKind::Identifier, TokenKind::Dot, TokenKind::Identifier, TokenKind::BinaryOp, TokenKind::Identifier]
    );
}

// ============================================================================
// Operators and punctuation
// ============================================================================

#[test]
fn test_punctuation() {
    use TokenKind::*;
    assert_eq!(
        kinds("a.b[0]|t(1, {k: [2]}) ? c : d"),
        vec![
            Identifier, Dot, Identifier, OpenBracket, Literal, CloseBracket, Pipe, Identifier, OpenParen,
            Literal, Comma, OpenCurl, Identifier, Colon, OpenBracket, Literal, CloseBracket, CloseCurl,
            CloseParen, Question, Identifier, Colon, Identifier
        ]
    );
}

#[test]
fn test_longest_operator_wins() {
    let tokens = tokenize("a // b >= c == d").unwrap();
    let ops: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::BinaryOp)
        .map(|t| t.text())
        .collect();
    assert_eq!(ops, vec!["//", ">=", "=="]);
}

#[test]
fn test_logical_not_is_unary() {
    assert_eq!(kinds("!a"), vec![TokenKind::UnaryOp, TokenKind::Identifier]);
}

#[test]
fn test_custom_operator_is_recognized() {
    let mut grammar = Grammar::new();
    grammar.add_binary_op("**", 70, |_, _| Ok(Value::Null));
    let tokens = Lexer::new("2**3", &grammar).tokenize().unwrap();
    assert_eq!(tokens[1].kind, TokenKind::BinaryOp);
    assert_eq!(tokens[1].text(), "**");
}

#[test]
fn test_custom_word_operator() {
    let mut grammar = Grammar::new();
    grammar.add_binary_op("intersects", 20, |_, _| Ok(Value::Null));
    let tokens = Lexer::new("a intersects b", &grammar).tokenize().unwrap();
    assert_eq!(tokens[1].kind, TokenKind::BinaryOp);
}

#[test]
fn test_removed_operator_is_unknown() {
    let mut grammar = Grammar::new();
    grammar.remove_op("%");
    let err = Lexer::new("5 % 2", &grammar).tokenize().unwrap_err();
    assert_eq!(err, LexError::UnexpectedCharacter { ch: '%', position: 2 });
}

// ============================================================================
// Signs
// ============================================================================

#[test]
fn test_leading_negative_number() {
    assert_eq!(values("-5"), vec![Value::Integer(-5)]);
    assert_eq!(values("+2.5"), vec![Value::Float(2.5)]);
}

#[test]
fn test_minus_after_operand_is_binary() {
    assert_eq!(
        kinds("a -5"),
        vec![TokenKind::Identifier, TokenKind::BinaryOp, TokenKind::Literal]
    );
    assert_eq!(values("10-2")[2], Value::Integer(2));
}

#[test]
fn test_sign_in_operand_position() {
    assert_eq!(values("x * -2")[2], Value::Integer(-2));
    assert_eq!(values("[-1, +2]")[1], Value::Integer(-1));
    assert_eq!(values("[-1, +2]")[3], Value::Integer(2));
    assert_eq!(values("a ? -1 : -2")[2], Value::Integer(-1));
    assert_eq!(values("a ? -1 : -2")[4], Value::Integer(-2));
}

#[test]
fn test_sign_after_closing_bracket_is_binary() {
    assert_eq!(kinds("(a)-1")[3], TokenKind::BinaryOp);
    assert_eq!(kinds("a[0]-1")[4], TokenKind::BinaryOp);
}

#[test]
fn test_double_sign_is_ambiguous() {
    assert_eq!(
        tokenize("2++2").unwrap_err(),
        LexError::AmbiguousSign { text: "++".to_string(), position: 1 }
    );
    assert!(matches!(tokenize("2+-2"), Err(LexError::AmbiguousSign { .. })));
}

#[test]
fn test_spaced_signs_are_fine() {
    assert_eq!(values("2 + -2")[2], Value::Integer(-2));
}

// ============================================================================
// Whitespace and errors
// ============================================================================

#[test]
fn test_raw_keeps_trailing_whitespace() {
    let tokens = tokenize("a  ==\n b").unwrap();
    let raw: Vec<_> = tokens.iter().map(|t| t.raw.as_str()).collect();
    assert_eq!(raw, vec!["a  ", "==\n ", "b"]);
}

#[test]
fn test_raw_concatenates_to_input() {
    let input = "  users[.age > 18] | pluck('name') ";
    let tokens = tokenize(input).unwrap();
    let joined: String = tokens.iter().map(|t| t.raw.as_str()).collect();
    assert_eq!(joined, input.trim_start());
}

#[test]
fn test_empty_input() {
    assert!(tokenize("").unwrap().is_empty());
    assert!(tokenize(" \t\n").unwrap().is_empty());
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        tokenize(r#"a + "oops"#).unwrap_err(),
        LexError::UnterminatedString { position: 4 }
    );
}

#[test]
fn test_unexpected_character() {
    assert_eq!(
        tokenize("a # b").unwrap_err(),
        LexError::UnexpectedCharacter { ch: '#', position: 2 }
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        tokenize("a @").unwrap_err().to_string(),
        "Unexpected character '@' at position 2"
    );
}
