//! Operator and callable registry shared by the lexer, parser and evaluator.
//!
//! A [`Grammar`] maps symbols to elements (punctuation, binary and unary
//! operators) and names to callables in two pools, `functions` and
//! `transforms`. Every callable is stored behind the same boxed-future
//! signature, so the evaluator never distinguishes sync from async code.

use std::{collections::HashMap, future::Future, sync::Arc};

use futures::future::{self, BoxFuture, FutureExt};

use crate::{ast::TokenKind, evaluator::EvalError, operators, value::Value};

/// Result of evaluating any node or callable.
pub type EvalResult = Result<Value, EvalError>;

/// An operand handed to a deferred operator.
///
/// Futures are lazy: the operand is only evaluated if the operator awaits it.
pub type Deferred<'a> = BoxFuture<'a, EvalResult>;

pub type BinaryFn = Arc<dyn Fn(Value, Value) -> BoxFuture<'static, EvalResult> + Send + Sync>;

pub type DeferredFn =
    Arc<dyn for<'a> Fn(Deferred<'a>, Deferred<'a>) -> BoxFuture<'a, EvalResult> + Send + Sync>;

pub type UnaryFn = Arc<dyn Fn(Value) -> BoxFuture<'static, EvalResult> + Send + Sync>;

/// Function or transform; transforms get their subject as `args[0]`.
pub type Callable = Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, EvalResult> + Send + Sync>;

/// Unary operators bind tighter than any binary operator.
pub const UNARY_PRECEDENCE: u32 = u32::MAX;

/// How a binary operator receives its operands.
#[derive(Clone)]
pub enum BinaryEval {
    /// Both operands are evaluated, left first, before the call
    Direct(BinaryFn),
    /// The operator decides whether and when to evaluate each operand
    Deferred(DeferredFn),
}

#[derive(Clone)]
pub struct BinaryOp {
    pub precedence: u32,
    pub eval: BinaryEval,
}

#[derive(Clone)]
pub struct UnaryOp {
    pub precedence: u32,
    pub eval: UnaryFn,
}

/// A grammar element keyed by its spelling.
#[derive(Clone)]
pub enum Element {
    Punctuation(TokenKind),
    Binary(BinaryOp),
    Unary(UnaryOp),
}

impl Element {
    pub fn token_kind(&self) -> TokenKind {
        match self {
            Element::Punctuation(kind) => *kind,
            Element::Binary(_) => TokenKind::BinaryOp,
            Element::Unary(_) => TokenKind::UnaryOp,
        }
    }
}

/// Lexical elements, operators and callable pools.
///
/// Mutated at setup time, read-only while expressions are compiled and
/// evaluated.
///
/// # Examples
///
/// ```
/// use jexl_lang::{Grammar, Value};
///
/// let mut grammar = Grammar::new();
/// grammar.add_binary_op("**", 70, |a, b| {
///     let (a, b) = (a.as_float().unwrap_or(f64::NAN), b.as_float().unwrap_or(f64::NAN));
///     Ok(Value::Float(a.powf(b)))
/// });
/// assert!(grammar.binary("**").is_some());
///
/// grammar.remove_op("**");
/// assert!(grammar.binary("**").is_none());
/// ```
#[derive(Clone)]
pub struct Grammar {
    elements: HashMap<String, Element>,
    /// Non-word spellings, longest first, for the lexer's maximal munch
    symbols: Vec<String>,
    functions: HashMap<String, Callable>,
    transforms: HashMap<String, Callable>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    /// Grammar with the punctuation and the built-in operator set.
    pub fn new() -> Self {
        let mut grammar = Self::empty();
        for (symbol, kind) in [
            (".", TokenKind::Dot),
            ("[", TokenKind::OpenBracket),
            ("]", TokenKind::CloseBracket),
            ("|", TokenKind::Pipe),
            ("{", TokenKind::OpenCurl),
            ("}", TokenKind::CloseCurl),
            (":", TokenKind::Colon),
            (",", TokenKind::Comma),
            ("(", TokenKind::OpenParen),
            (")", TokenKind::CloseParen),
            ("?", TokenKind::Question),
        ] {
            grammar.elements.insert(symbol.to_string(), Element::Punctuation(kind));
        }
        operators::install(&mut grammar);
        grammar.rebuild_symbols();
        grammar
    }

    /// Grammar without any elements; mostly useful in tests.
    pub fn empty() -> Self {
        Grammar {
            elements: HashMap::new(),
            symbols: Vec::new(),
            functions: HashMap::new(),
            transforms: HashMap::new(),
        }
    }

    /// Adds or replaces a binary operator whose operands are evaluated first.
    pub fn add_binary_op<F>(&mut self, symbol: impl Into<String>, precedence: u32, f: F)
    where
        F: Fn(&Value, &Value) -> EvalResult + Send + Sync + 'static,
    {
        let eval: BinaryFn = Arc::new(move |left, right| future::ready(f(&left, &right)).boxed());
        self.insert(
            symbol.into(),
            Element::Binary(BinaryOp {
                precedence,
                eval: BinaryEval::Direct(eval),
            }),
        );
    }

    /// Adds or replaces a binary operator that controls evaluation of its
    /// operands, e.g. for short-circuiting.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::FutureExt;
    /// use jexl_lang::Grammar;
    ///
    /// let mut grammar = Grammar::new();
    /// // Null-coalescing: only evaluates the right side when the left is nullish.
    /// grammar.add_deferred_binary_op("??", 10, |left, right| {
    ///     async move {
    ///         let value = left.await?;
    ///         if value.is_nullish() { right.await } else { Ok(value) }
    ///     }
    ///     .boxed()
    /// });
    /// ```
    pub fn add_deferred_binary_op<F>(&mut self, symbol: impl Into<String>, precedence: u32, f: F)
    where
        F: for<'a> Fn(Deferred<'a>, Deferred<'a>) -> BoxFuture<'a, EvalResult>
            + Send
            + Sync
            + 'static,
    {
        self.insert(
            symbol.into(),
            Element::Binary(BinaryOp {
                precedence,
                eval: BinaryEval::Deferred(Arc::new(f)),
            }),
        );
    }

    /// Adds or replaces a unary (prefix) operator.
    pub fn add_unary_op<F>(&mut self, symbol: impl Into<String>, f: F)
    where
        F: Fn(&Value) -> EvalResult + Send + Sync + 'static,
    {
        let eval: UnaryFn = Arc::new(move |operand| future::ready(f(&operand)).boxed());
        self.insert(
            symbol.into(),
            Element::Unary(UnaryOp {
                precedence: UNARY_PRECEDENCE,
                eval,
            }),
        );
    }

    /// Removes an operator. Unknown symbols and punctuation are left alone.
    pub fn remove_op(&mut self, symbol: &str) {
        if matches!(
            self.elements.get(symbol),
            Some(Element::Binary(_) | Element::Unary(_))
        ) {
            self.elements.remove(symbol);
            self.rebuild_symbols();
        }
    }

    pub fn add_function<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), sync_callable(f));
    }

    pub fn add_async_function<F, Fut>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EvalResult> + Send + 'static,
    {
        self.functions.insert(name.into(), async_callable(f));
    }

    pub fn add_functions<I, K, F>(&mut self, functions: I)
    where
        I: IntoIterator<Item = (K, F)>,
        K: Into<String>,
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        for (name, f) in functions {
            self.add_function(name, f);
        }
    }

    pub fn add_transform<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.transforms.insert(name.into(), sync_callable(f));
    }

    pub fn add_async_transform<F, Fut>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EvalResult> + Send + 'static,
    {
        self.transforms.insert(name.into(), async_callable(f));
    }

    pub fn add_transforms<I, K, F>(&mut self, transforms: I)
    where
        I: IntoIterator<Item = (K, F)>,
        K: Into<String>,
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        for (name, f) in transforms {
            self.add_transform(name, f);
        }
    }

    pub fn element(&self, symbol: &str) -> Option<&Element> {
        self.elements.get(symbol)
    }

    pub fn binary(&self, symbol: &str) -> Option<&BinaryOp> {
        match self.elements.get(symbol) {
            Some(Element::Binary(op)) => Some(op),
            _ => None,
        }
    }

    pub fn unary(&self, symbol: &str) -> Option<&UnaryOp> {
        match self.elements.get(symbol) {
            Some(Element::Unary(op)) => Some(op),
            _ => None,
        }
    }

    pub fn function(&self, name: &str) -> Option<&Callable> {
        self.functions.get(name)
    }

    pub fn transform(&self, name: &str) -> Option<&Callable> {
        self.transforms.get(name)
    }

    /// Non-word spellings, longest first.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn insert(&mut self, symbol: String, element: Element) {
        self.elements.insert(symbol, element);
        self.rebuild_symbols();
    }

    // Word operators such as `in` are recognized through the identifier rule.
    fn rebuild_symbols(&mut self) {
        let mut symbols: Vec<String> = self
            .elements
            .keys()
            .filter(|s| !s.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_'))
            .cloned()
            .collect();
        symbols.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        self.symbols = symbols;
    }
}

fn sync_callable<F>(f: F) -> Callable
where
    F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
{
    Arc::new(move |args: Vec<Value>| future::ready(f(&args)).boxed())
}

fn async_callable<F, Fut>(f: F) -> Callable
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = EvalResult> + Send + 'static,
{
    Arc::new(move |args: Vec<Value>| f(args).boxed())
}
