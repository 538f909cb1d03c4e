use std::fmt;

use crate::value::Value;

/// Token categories produced by the lexer.
///
/// Operator and punctuation spellings come from the grammar, so the kind is
/// all the parser looks at; the concrete symbol travels in [`Token::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// String, number, boolean, `null` or `undefined`
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// -1.5
    /// undefined
    /// ```
    Literal,

    /// Name to resolve against a context, or a function/transform name
    ///
    /// Must start with a letter, `_` or `$`, followed by letters, digits,
    /// `_` or `$`.
    ///
    /// # Examples
    /// ```text
    /// user
    /// $total
    /// _internal
    /// ```
    Identifier,

    /// Operator taking a left and a right operand
    ///
    /// # Examples
    /// ```text
    /// +  -  *  /  //  %  ^  ==  !=  <  <=  >  >=  &&  ||  in
    /// ```
    BinaryOp,

    /// Operator prefixing a single operand
    ///
    /// # Examples
    /// ```text
    /// !enabled
    /// ```
    UnaryOp,

    /// Property traversal, or a relative identifier inside a filter
    ///
    /// # Examples
    /// ```text
    /// user.name
    /// items[.price > 10]
    /// ```
    Dot,

    /// Transform pipeline
    ///
    /// # Examples
    /// ```text
    /// name|upper
    /// value|round(2)
    /// ```
    Pipe,

    /// Separates arguments, array elements and object entries
    Comma,

    /// Object key separator and ternary alternate marker
    Colon,

    /// Ternary test marker
    Question,

    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenCurl,
    CloseCurl,
}

impl TokenKind {
    /// Whether an operand is expected after a token of this kind.
    ///
    /// Drives the unary/binary reading of `+` and `-`.
    pub fn expects_operand(self) -> bool {
        matches!(
            self,
            TokenKind::BinaryOp
                | TokenKind::UnaryOp
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Question
                | TokenKind::OpenParen
                | TokenKind::OpenBracket
                | TokenKind::OpenCurl
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Literal => "literal",
            TokenKind::Identifier => "identifier",
            TokenKind::BinaryOp => "binaryOp",
            TokenKind::UnaryOp => "unaryOp",
            TokenKind::Dot => "dot",
            TokenKind::Pipe => "pipe",
            TokenKind::Comma => "comma",
            TokenKind::Colon => "colon",
            TokenKind::Question => "question",
            TokenKind::OpenParen => "openParen",
            TokenKind::CloseParen => "closeParen",
            TokenKind::OpenBracket => "openBracket",
            TokenKind::CloseBracket => "closeBracket",
            TokenKind::OpenCurl => "openCurl",
            TokenKind::CloseCurl => "closeCurl",
        };
        f.write_str(name)
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,

    /// Exact source text consumed, trailing whitespace included
    pub raw: String,

    /// Literal value for `Literal` tokens; the name or symbol as a string
    /// for every other kind
    pub value: Value,
}

impl Token {
    pub fn new(kind: TokenKind, raw: impl Into<String>, value: Value) -> Self {
        Token {
            kind,
            raw: raw.into(),
            value,
        }
    }

    /// Name or symbol carried by a non-literal token.
    pub fn text(&self) -> &str {
        match (&self.kind, &self.value) {
            (TokenKind::Literal, _) => self.raw.trim(),
            (_, Value::String(s)) => s,
            _ => self.raw.trim(),
        }
    }
}
