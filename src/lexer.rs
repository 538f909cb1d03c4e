use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::{
    ast::{Token, TokenKind},
    grammar::{Element, Grammar},
    value::Value,
};

static DOUBLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?:\\.|[^"\\])*""#).expect("valid string pattern"));
static SINGLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^'(?:\\.|[^'\\])*'").expect("valid string pattern"));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)?").expect("valid number pattern"));
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{Alphabetic}_$][\p{Alphabetic}\p{M}\p{N}_$]*").expect("valid identifier pattern")
});

/// Errors raised while splitting source text into tokens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("Unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Ambiguous sign sequence '{text}' at position {position}; separate the operators with whitespace")]
    AmbiguousSign { text: String, position: usize },

    #[error("Invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },
}

/// Splits an expression into tokens, recognizing operators through the
/// grammar it was created with.
pub struct Lexer<'a> {
    input: &'a str,
    grammar: &'a Grammar,
    /// Byte offset of the next unread character
    position: usize,
    last_kind: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, grammar: &'a Grammar) -> Self {
        Lexer {
            input,
            grammar,
            position: 0,
            last_kind: None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.position = self.input.len() - trimmed.len();
    }

    /// Tokenizes the whole input.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        self.skip_whitespace();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Reads the next token, or `None` at end of input.
    ///
    /// Whitespace following the token is appended to its `raw` text.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let start = self.position;
        let Some(ch) = self.current_char() else {
            return Ok(None);
        };

        let (kind, value) = match ch {
            '"' | '\'' => (TokenKind::Literal, self.read_string(ch)?),
            c if c.is_ascii_digit() => (TokenKind::Literal, self.read_number(false)?),
            '+' | '-' if self.expects_operand() && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.position += 1;
                (TokenKind::Literal, self.read_number(ch == '-')?)
            }
            _ if IDENTIFIER.is_match(self.rest()) => self.read_word()?,
            _ => self.read_symbol()?,
        };

        let end = self.position;
        self.skip_whitespace();
        let token = Token::new(kind, &self.input[start..self.position], value);
        log::trace!("token {} `{}` at {}..{}", kind, token.raw, start, end);
        self.last_kind = Some(kind);
        Ok(Some(token))
    }

    fn expects_operand(&self) -> bool {
        self.last_kind.is_none_or(TokenKind::expects_operand)
    }

    fn read_string(&mut self, quote: char) -> Result<Value, LexError> {
        let pattern = if quote == '"' { &DOUBLE_QUOTED } else { &SINGLE_QUOTED };
        let Some(m) = pattern.find(self.rest()) else {
            return Err(LexError::UnterminatedString {
                position: self.position,
            });
        };
        let body = &m.as_str()[1..m.len() - 1];
        self.position += m.len();

        let mut result = String::with_capacity(body.len());
        let mut chars = body.chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                result.push(ch);
                continue;
            }
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some(c) if c == quote || c == '\\' => result.push(c),
                Some(c) => {
                    result.push('\\');
                    result.push(c);
                }
                None => result.push('\\'),
            }
        }
        Ok(Value::String(result))
    }

    fn read_number(&mut self, negative: bool) -> Result<Value, LexError> {
        let start = self.position;
        let Some(m) = NUMBER.find(self.rest()) else {
            return Err(LexError::InvalidNumber {
                text: self.rest().chars().take(1).collect(),
                position: start,
            });
        };
        let text = m.as_str();
        self.position += m.len();
        let invalid = || LexError::InvalidNumber {
            text: text.to_string(),
            position: start,
        };

        if text.contains('.') {
            let n = text.parse::<f64>().map_err(|_| invalid())?;
            Ok(Value::Float(if negative { -n } else { n }))
        } else {
            let signed = if negative { format!("-{}", text) } else { text.to_string() };
            match signed.parse::<i64>() {
                Ok(n) => Ok(Value::Integer(n)),
                // Too large for an integer; keep it as a float
                Err(_) => signed.parse::<f64>().map(Value::Float).map_err(|_| invalid()),
            }
        }
    }

    fn read_word(&mut self) -> Result<(TokenKind, Value), LexError> {
        let Some(m) = IDENTIFIER.find(self.rest()).filter(|m| !m.is_empty()) else {
            return Err(LexError::UnexpectedCharacter {
                ch: self.current_char().unwrap_or_default(),
                position: self.position,
            });
        };
        let word = m.as_str();
        self.position += word.len();

        // After a dot every word is a property name, even one spelled like `in`
        let after_dot = self.last_kind == Some(TokenKind::Dot);
        Ok(match word {
            "true" => (TokenKind::Literal, Value::Boolean(true)),
            "false" => (TokenKind::Literal, Value::Boolean(false)),
            "null" => (TokenKind::Literal, Value::Null),
            "undefined" => (TokenKind::Literal, Value::Undefined),
            _ if after_dot => (TokenKind::Identifier, Value::String(word.to_string())),
            _ => match self.grammar.element(word) {
                Some(element @ (Element::Binary(_) | Element::Unary(_))) => {
                    (element.token_kind(), Value::String(word.to_string()))
                }
                _ => (TokenKind::Identifier, Value::String(word.to_string())),
            },
        })
    }

    fn read_symbol(&mut self) -> Result<(TokenKind, Value), LexError> {
        let rest = self.rest();
        let matched = self
            .grammar
            .symbols()
            .iter()
            .find(|symbol| rest.starts_with(symbol.as_str()));

        let (Some(symbol), Some(element)) = (
            matched,
            matched.and_then(|symbol| self.grammar.element(symbol)),
        ) else {
            return Err(LexError::UnexpectedCharacter {
                ch: self.current_char().unwrap_or_default(),
                position: self.position,
            });
        };

        if (symbol == "+" || symbol == "-")
            && let Some(next @ ('+' | '-')) = rest[1..].chars().next()
        {
            return Err(LexError::AmbiguousSign {
                text: format!("{}{}", symbol, next),
                position: self.position,
            });
        }

        self.position += symbol.len();
        Ok((element.token_kind(), Value::String(symbol.clone())))
    }
}
