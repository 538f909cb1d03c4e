//! Engine facade: owns the grammar and turns source text into runnable
//! expressions.

use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use futures::future::BoxFuture;

use crate::{
    ast::Expr,
    error::Error,
    evaluator::Evaluator,
    grammar::{Deferred, EvalResult, Grammar},
    lexer::Lexer,
    parser::{ParseOptions, Parser},
    value::Value,
};

/// An expression engine.
///
/// Registration needs `&mut self`; compiling and evaluating only read. Every
/// compiled [`Expression`] keeps the grammar it was compiled with, so later
/// registrations never change the behavior of existing expressions.
///
/// # Examples
///
/// ```
/// use futures::executor::block_on;
/// use jexl_lang::{Jexl, Value};
///
/// let mut jexl = Jexl::new();
/// jexl.add_transform("double", |args| {
///     let n = args[0].as_float().unwrap_or(0.0);
///     Ok(Value::Float(n * 2.0))
/// });
///
/// let context = Value::from(serde_json::json!({"price": 21}));
/// let result = block_on(jexl.evaluate("price|double", &context)).unwrap();
/// assert_eq!(result, Value::Float(42.0));
/// ```
pub struct Jexl {
    grammar: Arc<Grammar>,
    options: ParseOptions,
    cache: Option<Mutex<HashMap<String, Arc<Expr>>>>,
}

impl Default for Jexl {
    fn default() -> Self {
        Self::new()
    }
}

impl Jexl {
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Jexl {
            grammar: Arc::new(Grammar::new()),
            options,
            cache: None,
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        self.options
    }

    pub fn set_parse_options(&mut self, options: ParseOptions) {
        self.options = options;
        self.invalidate_cache();
    }

    /// Reuses parsed trees for source text seen before.
    pub fn enable_cache(&mut self) {
        if self.cache.is_none() {
            self.cache = Some(Mutex::new(HashMap::new()));
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Mutable access to the grammar. Expressions compiled earlier keep
    /// their own copy.
    pub fn grammar_mut(&mut self) -> &mut Grammar {
        self.invalidate_cache();
        Arc::make_mut(&mut self.grammar)
    }

    pub fn add_binary_op<F>(&mut self, symbol: impl Into<String>, precedence: u32, f: F)
    where
        F: Fn(&Value, &Value) -> EvalResult + Send + Sync + 'static,
    {
        self.grammar_mut().add_binary_op(symbol, precedence, f);
    }

    pub fn add_deferred_binary_op<F>(&mut self, symbol: impl Into<String>, precedence: u32, f: F)
    where
        F: for<'a> Fn(Deferred<'a>, Deferred<'a>) -> BoxFuture<'a, EvalResult>
            + Send
            + Sync
            + 'static,
    {
        self.grammar_mut().add_deferred_binary_op(symbol, precedence, f);
    }

    pub fn add_unary_op<F>(&mut self, symbol: impl Into<String>, f: F)
    where
        F: Fn(&Value) -> EvalResult + Send + Sync + 'static,
    {
        self.grammar_mut().add_unary_op(symbol, f);
    }

    pub fn remove_op(&mut self, symbol: &str) {
        self.grammar_mut().remove_op(symbol);
    }

    pub fn add_function<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.grammar_mut().add_function(name, f);
    }

    pub fn add_async_function<F, Fut>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EvalResult> + Send + 'static,
    {
        self.grammar_mut().add_async_function(name, f);
    }

    pub fn add_functions<I, K, F>(&mut self, functions: I)
    where
        I: IntoIterator<Item = (K, F)>,
        K: Into<String>,
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.grammar_mut().add_functions(functions);
    }

    pub fn add_transform<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.grammar_mut().add_transform(name, f);
    }

    pub fn add_async_transform<F, Fut>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EvalResult> + Send + 'static,
    {
        self.grammar_mut().add_async_transform(name, f);
    }

    pub fn add_transforms<I, K, F>(&mut self, transforms: I)
    where
        I: IntoIterator<Item = (K, F)>,
        K: Into<String>,
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.grammar_mut().add_transforms(transforms);
    }

    /// Parses source text once for repeated evaluation.
    pub fn compile(&self, source: &str) -> Result<Expression, Error> {
        let ast = match self.cached(source) {
            Some(ast) => ast,
            None => {
                let tokens = Lexer::new(source, &self.grammar).tokenize()?;
                let ast = Arc::new(Parser::with_options(&self.grammar, self.options).parse(tokens)?);
                log::debug!("compiled `{}`", source);
                self.store(source, &ast);
                ast
            }
        };
        Ok(Expression {
            source: source.to_string(),
            ast,
            grammar: Arc::clone(&self.grammar),
        })
    }

    /// Compiles and evaluates in one step.
    pub async fn evaluate(&self, source: &str, context: &Value) -> Result<Value, Error> {
        self.compile(source)?.evaluate(context).await
    }

    fn cached(&self, source: &str) -> Option<Arc<Expr>> {
        let cache = self.cache.as_ref()?;
        let cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(source).cloned()
    }

    fn store(&self, source: &str, ast: &Arc<Expr>) {
        if let Some(cache) = &self.cache {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(source.to_string(), Arc::clone(ast));
        }
    }

    fn invalidate_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            let cache = cache.get_mut().unwrap_or_else(PoisonError::into_inner);
            if !cache.is_empty() {
                log::debug!("grammar changed, dropping {} cached expression(s)", cache.len());
                cache.clear();
            }
        }
    }
}

/// A compiled expression, cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct Expression {
    source: String,
    ast: Arc<Expr>,
    grammar: Arc<Grammar>,
}

impl Expression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    pub async fn evaluate(&self, context: &Value) -> Result<Value, Error> {
        Ok(Evaluator::new(&self.grammar).evaluate(&self.ast, context).await?)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("ast", &self.ast)
            .finish_non_exhaustive()
    }
}
