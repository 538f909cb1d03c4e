//! Token-driven state machine that builds the syntax tree.
//!
//! The parser consumes one token at a time. Plain states accept a token,
//! run a handler and move on; delegating states (parentheses, brackets,
//! argument lists, object values, both halves of a ternary) feed tokens to a
//! nested parser until one of its end tokens shows up.
//!
//! Binary operators are grouped by precedence climbing over the open right
//! spine of the tree: the stack of operators still waiting for their right
//! operand. A new operator closes every spine entry of greater or equal
//! precedence, which makes equal precedence group to the left.

pub mod states;

use thiserror::Error;

use crate::{
    ast::{Expr, Pool, Token, TokenKind},
    grammar::Grammar,
    value::Value,
};
pub use states::{EndState, State};

/// Errors raised while building the syntax tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Token {token} ({kind}) unexpected in expression: {expr}")]
    UnexpectedToken {
        token: String,
        kind: TokenKind,
        expr: String,
    },

    #[error("Unexpected end of expression: {expr}")]
    UnexpectedEnd { expr: String },

    #[error("Missing value before {token} in expression: {expr}")]
    EmptySubExpression { token: String, expr: String },

    #[error("Unknown operator '{symbol}' in expression: {expr}")]
    UnknownOperator { symbol: String, expr: String },

    #[error("Only named functions can be called in expression: {expr}")]
    InvalidCall { expr: String },

    #[error("Empty expression")]
    EmptyExpression,

    #[error("Cannot add token {token} to a completed parser")]
    AlreadyComplete { token: String },
}

/// Rules for reading dotted names as namespaced callables.
///
/// A dotted run like `Math.max` is normally a property traversal. These
/// switches decide when it names a single registered callable instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// `a.b.c(args)` calls the function registered as `"a.b.c"`. When off,
    /// calling a dotted chain is a parse error.
    pub namespaced_functions: bool,

    /// `x|a.b.c` pipes through the transform registered as `"a.b.c"`. When
    /// off, the dot after a transform name traverses its result.
    pub namespaced_transforms: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            namespaced_functions: true,
            namespaced_transforms: true,
        }
    }
}

/// Spine entry waiting for its right operand.
#[derive(Debug)]
enum Open {
    Binary {
        operator: String,
        precedence: u32,
        left: Expr,
    },
    Unary {
        operator: String,
        precedence: u32,
    },
}

impl Open {
    fn precedence(&self) -> u32 {
        match self {
            Open::Binary { precedence, .. } | Open::Unary { precedence, .. } => *precedence,
        }
    }

    fn close(self, right: Expr) -> Expr {
        match self {
            Open::Binary { operator, left, .. } => Expr::BinaryExpression {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
            Open::Unary { operator, .. } => Expr::UnaryExpression {
                operator,
                right: Box::new(right),
            },
        }
    }
}

/// How the next identifier attaches after a `.`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextIdent {
    Plain,
    /// Continues the chain ending at the cursor
    Encapsulate,
    /// Resolves against the element a filter is visiting
    Relative,
}

#[derive(Debug)]
struct Ternary {
    test: Expr,
    consequent: Option<Expr>,
}

pub struct Parser<'g> {
    grammar: &'g Grammar,
    options: ParseOptions,
    state: State,
    started: bool,
    spine: Vec<Open>,
    /// Completed operand at the bottom of the spine
    cursor: Option<Expr>,
    ternary: Option<Ternary>,
    next_ident: NextIdent,
    pending_key: Option<String>,
    /// Source text consumed so far, for error messages
    expr: String,
    end_states: Vec<EndState>,
    sub: Option<Box<Parser<'g>>>,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_options(grammar, ParseOptions::default())
    }

    pub fn with_options(grammar: &'g Grammar, options: ParseOptions) -> Self {
        Self::nested(grammar, options, String::new(), Vec::new())
    }

    fn nested(grammar: &'g Grammar, options: ParseOptions, expr: String, end_states: Vec<EndState>) -> Self {
        Parser {
            grammar,
            options,
            state: State::ExpectOperand,
            started: false,
            spine: Vec::new(),
            cursor: None,
            ternary: None,
            next_ident: NextIdent::Plain,
            pending_key: None,
            expr,
            end_states,
            sub: None,
        }
    }

    /// Parses a complete token stream into a single tree.
    pub fn parse(mut self, tokens: Vec<Token>) -> Result<Expr, ParseError> {
        self.add_tokens(tokens)?;
        self.complete()?.ok_or(ParseError::EmptyExpression)
    }

    pub fn add_tokens(&mut self, tokens: impl IntoIterator<Item = Token>) -> Result<(), ParseError> {
        for token in tokens {
            // Only nested parsers have end tokens
            if let Some((kind, _)) = self.add_token(token)? {
                return Err(ParseError::UnexpectedToken {
                    token: kind.to_string(),
                    kind,
                    expr: self.expr.clone(),
                });
            }
        }
        Ok(())
    }

    /// Feeds one token. Returns the end state when the token closes this
    /// (nested) parser.
    pub fn add_token(&mut self, token: Token) -> Result<Option<EndState>, ParseError> {
        if self.state == State::Complete {
            return Err(ParseError::AlreadyComplete {
                token: token.raw.trim().to_string(),
            });
        }
        let start_expr = self.expr.clone();
        self.expr.push_str(&token.raw);
        log::trace!("parser {:?} <- {} `{}`", self.state, token.kind, token.raw.trim());

        if self.state.delegates() {
            let closer = token.raw.trim().to_string();
            let mut sub = match self.sub.take() {
                Some(sub) => sub,
                None => Box::new(self.start_sub(start_expr)),
            };
            match sub.add_token(token)? {
                None => self.sub = Some(sub),
                Some(stop) => {
                    // The stop token belongs to our owner when we lent it our end tokens
                    let inherited = self.state.end_states().is_none();
                    let ast = sub.complete()?;
                    self.end_sub(ast, Some((stop.0, closer.as_str())))?;
                    if inherited {
                        self.state = State::ExpectBinOp;
                        return Ok(Some(stop));
                    }
                    self.state = stop.1;
                }
            }
            self.started = true;
        } else if let Some(next) = self.state.next(token.kind) {
            self.state = self.handle(token, next)?;
            self.started = true;
        } else if let Some(stop) = self.end_states.iter().find(|(kind, _)| *kind == token.kind) {
            if self.started && !self.state.is_completable() {
                return Err(self.unexpected(&token));
            }
            return Ok(Some(*stop));
        } else {
            return Err(self.unexpected(&token));
        }
        Ok(None)
    }

    /// Finishes parsing; `None` when no token was ever added.
    pub fn complete(&mut self) -> Result<Option<Expr>, ParseError> {
        if !self.started {
            self.state = State::Complete;
            return Ok(None);
        }
        if !self.state.is_completable() {
            return Err(ParseError::UnexpectedEnd {
                expr: self.expr.clone(),
            });
        }
        if self.state.delegates() {
            let Some(mut sub) = self.sub.take() else {
                return Err(ParseError::UnexpectedEnd {
                    expr: self.expr.clone(),
                });
            };
            let ast = sub.complete()?;
            self.end_sub(ast, None)?;
        }
        self.state = State::Complete;
        self.take_tree().map(Some)
    }

    fn start_sub(&self, expr: String) -> Parser<'g> {
        let end_states = match self.state.end_states() {
            Some(ends) => ends.to_vec(),
            None => self.end_states.clone(),
        };
        Parser::nested(self.grammar, self.options, expr, end_states)
    }

    fn handle(&mut self, token: Token, next: State) -> Result<State, ParseError> {
        use State as S;
        use TokenKind as T;
        match (self.state, token.kind) {
            (S::ExpectOperand, T::Literal) => self.place(Expr::Literal(token.value)),
            (S::ExpectOperand, T::OpenCurl) => self.place(Expr::ObjectLiteral(Vec::new())),
            (S::ExpectOperand, T::OpenBracket) => self.place(Expr::ArrayLiteral(Vec::new())),
            (S::ExpectOperand | S::Traverse, T::Identifier) => self.identifier(token.text())?,
            (S::ExpectOperand, T::UnaryOp) => self.unary_op(&token)?,
            (_, T::BinaryOp) => self.binary_op(&token)?,
            (S::PostTransform, T::Dot) if self.options.namespaced_transforms => {
                return Ok(S::TransformName);
            }
            (_, T::Dot) => self.dot(),
            (S::ExpectTransform, T::Identifier) => self.transform(token.text())?,
            (S::TransformName, T::Identifier) => self.extend_transform_name(token.text()),
            (S::Identifier, T::OpenParen) => self.function_call()?,
            (S::ExpectObjKey, T::Identifier) => self.pending_key = Some(token.text().to_string()),
            (S::ExpectObjKey, T::Literal) => match &token.value {
                Value::String(key) => self.pending_key = Some(key.clone()),
                _ => return Err(self.unexpected(&token)),
            },
            (_, T::Question) => self.ternary_start()?,
            _ => {}
        }
        Ok(next)
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            token: token.raw.trim().to_string(),
            kind: token.kind,
            expr: self.expr.clone(),
        }
    }

    fn place(&mut self, node: Expr) {
        self.cursor = Some(node);
    }

    fn take_cursor(&mut self) -> Result<Expr, ParseError> {
        self.cursor.take().ok_or_else(|| ParseError::UnexpectedEnd {
            expr: self.expr.clone(),
        })
    }

    /// Closes the whole spine around the cursor.
    fn take_tree(&mut self) -> Result<Expr, ParseError> {
        let mut node = self.take_cursor()?;
        while let Some(open) = self.spine.pop() {
            node = open.close(node);
        }
        Ok(node)
    }

    fn identifier(&mut self, name: &str) -> Result<(), ParseError> {
        let node = match self.next_ident {
            NextIdent::Encapsulate => Expr::Identifier {
                name: name.to_string(),
                from: Some(Box::new(self.take_cursor()?)),
                relative: false,
            },
            NextIdent::Relative => Expr::Identifier {
                name: name.to_string(),
                from: None,
                relative: true,
            },
            NextIdent::Plain => Expr::ident(name),
        };
        self.next_ident = NextIdent::Plain;
        self.place(node);
        Ok(())
    }

    fn dot(&mut self) {
        self.next_ident = if self.cursor.is_some() {
            NextIdent::Encapsulate
        } else {
            NextIdent::Relative
        };
    }

    fn binary_op(&mut self, token: &Token) -> Result<(), ParseError> {
        let symbol = token.text();
        let precedence = self
            .grammar
            .binary(symbol)
            .map(|op| op.precedence)
            .ok_or_else(|| ParseError::UnknownOperator {
                symbol: symbol.to_string(),
                expr: self.expr.clone(),
            })?;

        let mut left = self.take_cursor()?;
        while let Some(open) = self.spine.pop_if(|open| open.precedence() >= precedence) {
            left = open.close(left);
        }
        self.spine.push(Open::Binary {
            operator: symbol.to_string(),
            precedence,
            left,
        });
        Ok(())
    }

    fn unary_op(&mut self, token: &Token) -> Result<(), ParseError> {
        let symbol = token.text();
        let precedence = self
            .grammar
            .unary(symbol)
            .map(|op| op.precedence)
            .ok_or_else(|| ParseError::UnknownOperator {
                symbol: symbol.to_string(),
                expr: self.expr.clone(),
            })?;
        self.spine.push(Open::Unary {
            operator: symbol.to_string(),
            precedence,
        });
        Ok(())
    }

    fn ternary_start(&mut self) -> Result<(), ParseError> {
        let test = self.take_tree()?;
        self.ternary = Some(Ternary {
            test,
            consequent: None,
        });
        Ok(())
    }

    fn transform(&mut self, name: &str) -> Result<(), ParseError> {
        let subject = self.take_cursor()?;
        self.place(Expr::FunctionCall {
            name: name.to_string(),
            args: vec![subject],
            pool: Pool::Transforms,
        });
        Ok(())
    }

    fn extend_transform_name(&mut self, segment: &str) {
        if let Some(Expr::FunctionCall { name, .. }) = self.cursor.as_mut() {
            name.push('.');
            name.push_str(segment);
            log::debug!("reading `{}` as a namespaced transform rather than a traversal", name);
        }
    }

    fn function_call(&mut self) -> Result<(), ParseError> {
        let callee = self.take_cursor()?;
        let name = self.callee_name(callee)?;
        self.place(Expr::FunctionCall {
            name,
            args: Vec::new(),
            pool: Pool::Functions,
        });
        Ok(())
    }

    // Flattens `a.b.c` into "a.b.c"; anything else cannot be called.
    fn callee_name(&self, callee: Expr) -> Result<String, ParseError> {
        let invalid = || ParseError::InvalidCall {
            expr: self.expr.clone(),
        };
        let mut segments = Vec::new();
        let mut node = callee;
        loop {
            match node {
                Expr::Identifier {
                    name,
                    from,
                    relative: false,
                } => {
                    segments.push(name);
                    match from {
                        None => break,
                        Some(_) if !self.options.namespaced_functions => return Err(invalid()),
                        Some(parent) => node = *parent,
                    }
                }
                _ => return Err(invalid()),
            }
        }
        segments.reverse();
        Ok(segments.join("."))
    }

    /// Hands the result of a nested parser to the delegating state.
    fn end_sub(&mut self, ast: Option<Expr>, closer: Option<(TokenKind, &str)>) -> Result<(), ParseError> {
        let closing_list = matches!(
            closer,
            Some((TokenKind::CloseParen | TokenKind::CloseBracket, _))
        );
        let require = |ast: Option<Expr>, expr: &str| {
            ast.ok_or_else(|| ParseError::EmptySubExpression {
                token: closer.map_or("end of input", |(_, raw)| raw).to_string(),
                expr: expr.to_string(),
            })
        };

        match self.state {
            State::Filter => {
                let expr = require(ast, &self.expr)?;
                let subject = self.take_cursor()?;
                self.place(Expr::FilterExpression {
                    subject: Box::new(subject),
                    relative: expr.has_relative(),
                    expr: Box::new(expr),
                });
            }
            State::SubExpression => {
                let expr = require(ast, &self.expr)?;
                self.place(expr);
            }
            State::ArgVal => match (ast, self.cursor.as_mut()) {
                (Some(arg), Some(Expr::FunctionCall { args, .. })) => args.push(arg),
                (None, Some(Expr::FunctionCall { args, pool, .. }))
                    if closing_list && args.len() == usize::from(*pool == Pool::Transforms) => {}
                (ast, _) => {
                    require(ast, &self.expr)?;
                }
            },
            State::ArrayVal => match (ast, self.cursor.as_mut()) {
                (Some(item), Some(Expr::ArrayLiteral(items))) => items.push(item),
                (None, Some(Expr::ArrayLiteral(items))) if closing_list && items.is_empty() => {}
                (ast, _) => {
                    require(ast, &self.expr)?;
                }
            },
            State::ObjVal => {
                let value = require(ast, &self.expr)?;
                let key = self.pending_key.take().unwrap_or_default();
                if let Some(Expr::ObjectLiteral(entries)) = self.cursor.as_mut() {
                    entries.push((key, value));
                }
            }
            State::TernaryMid => {
                if let Some(ternary) = self.ternary.as_mut() {
                    ternary.consequent = ast;
                }
            }
            State::TernaryEnd => {
                let alternate = require(ast, &self.expr)?;
                let Some(Ternary { test, consequent }) = self.ternary.take() else {
                    return Err(ParseError::UnexpectedEnd {
                        expr: self.expr.clone(),
                    });
                };
                self.place(Expr::ConditionalExpression {
                    test: Box::new(test),
                    consequent: consequent.map(Box::new),
                    alternate: Box::new(alternate),
                });
            }
            _ => {}
        }
        Ok(())
    }
}
