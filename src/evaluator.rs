use futures::future::{BoxFuture, FutureExt, try_join_all};
use thiserror::Error;

use crate::{
    ast::{Expr, Pool},
    grammar::{BinaryEval, Callable, EvalResult, Grammar},
    value::Value,
};

/// Errors that can occur during expression evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Unknown transform: {0}")]
    UnknownTransform(String),

    /// Operator missing from the grammar the evaluator runs with
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Division by zero")]
    DivisionByZero,

    /// A registered function or transform failed
    #[error("Error in '{name}': {source}")]
    Callable {
        name: String,
        source: Box<EvalError>,
    },

    /// Raised by host code
    #[error("{0}")]
    Custom(String),
}

impl EvalError {
    pub fn custom(message: impl Into<String>) -> Self {
        EvalError::Custom(message.into())
    }
}

/// What identifiers resolve against.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Outer context of the evaluation
    pub context: &'a Value,
    /// Element currently visited by a filter
    pub relative: Option<&'a Value>,
}

impl<'a> Scope<'a> {
    pub fn new(context: &'a Value) -> Self {
        Scope {
            context,
            relative: None,
        }
    }

    pub fn with_relative(self, element: &'a Value) -> Self {
        Scope {
            context: self.context,
            relative: Some(element),
        }
    }
}

/// Asynchronous tree walker.
///
/// Every node evaluates to a boxed future. Siblings (array items, object
/// values, call arguments) are driven together and reassembled in source
/// order; suspension only ever happens inside registered callables.
///
/// # Examples
///
/// ```
/// use futures::executor::block_on;
/// use jexl_lang::{Evaluator, Expr, Grammar, Value};
///
/// let grammar = Grammar::new();
/// let expr = Expr::ident("answer");
/// let context = Value::object([("answer", Value::Integer(42))]);
///
/// let result = block_on(Evaluator::new(&grammar).evaluate(&expr, &context));
/// assert_eq!(result, Ok(Value::Integer(42)));
/// ```
pub struct Evaluator<'g> {
    grammar: &'g Grammar,
}

impl<'g> Evaluator<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Evaluator { grammar }
    }

    /// Evaluates a tree against a context.
    pub async fn evaluate(&self, expr: &Expr, context: &Value) -> EvalResult {
        self.eval(expr, Scope::new(context)).await
    }

    pub fn eval<'a>(&'a self, expr: &'a Expr, scope: Scope<'a>) -> BoxFuture<'a, EvalResult> {
        async move {
            match expr {
                Expr::Literal(value) => Ok(value.clone()),
                Expr::Identifier {
                    name,
                    from,
                    relative,
                } => {
                    let subject = match from {
                        Some(from) => self.eval(from, scope).await?,
                        None if *relative => return Ok(property(scope.relative.unwrap_or(scope.context), name)),
                        None => return Ok(property(scope.context, name)),
                    };
                    Ok(property(&subject, name))
                }
                Expr::BinaryExpression {
                    operator,
                    left,
                    right,
                } => self.binary(operator, left, right, scope).await,
                Expr::UnaryExpression { operator, right } => {
                    let op = self
                        .grammar
                        .unary(operator)
                        .ok_or_else(|| EvalError::UnknownOperator(operator.clone()))?;
                    let operand = self.eval(right, scope).await?;
                    (op.eval)(operand).await
                }
                Expr::ConditionalExpression {
                    test,
                    consequent,
                    alternate,
                } => {
                    let test = self.eval(test, scope).await?;
                    if !test.is_truthy() {
                        return self.eval(alternate, scope).await;
                    }
                    match consequent {
                        Some(consequent) => self.eval(consequent, scope).await,
                        None => Ok(test),
                    }
                }
                Expr::FilterExpression {
                    subject,
                    expr,
                    relative,
                } => {
                    let subject = self.eval(subject, scope).await?;
                    if *relative {
                        self.filter(subject, expr, scope).await
                    } else {
                        let key = self.eval(expr, scope).await?;
                        Ok(index(subject, &key))
                    }
                }
                Expr::ArrayLiteral(items) => {
                    let values = self.eval_all(items.iter(), scope).await?;
                    Ok(Value::Array(values))
                }
                Expr::ObjectLiteral(entries) => {
                    let values = self.eval_all(entries.iter().map(|(_, value)| value), scope).await?;
                    Ok(Value::object(entries.iter().map(|(key, _)| key.as_str()).zip(values)))
                }
                Expr::FunctionCall { name, args, pool } => {
                    let args = self.eval_all(args.iter(), scope).await?;
                    let callable = self.callable(name, *pool)?;
                    log::trace!("calling {:?} `{}` with {} argument(s)", pool, name, args.len());
                    callable(args).await.map_err(|source| EvalError::Callable {
                        name: name.clone(),
                        source: Box::new(source),
                    })
                }
            }
        }
        .boxed()
    }

    async fn binary(&self, operator: &str, left: &Expr, right: &Expr, scope: Scope<'_>) -> EvalResult {
        let op = self
            .grammar
            .binary(operator)
            .ok_or_else(|| EvalError::UnknownOperator(operator.to_string()))?;
        match &op.eval {
            BinaryEval::Direct(apply) => {
                let left = self.eval(left, scope).await?;
                let right = self.eval(right, scope).await?;
                apply(left, right).await
            }
            BinaryEval::Deferred(apply) => apply(self.eval(left, scope), self.eval(right, scope)).await,
        }
    }

    // Keeps the elements whose predicate is truthy. A non-array subject is
    // filtered as a single element; `undefined` filters to nothing.
    async fn filter(&self, subject: Value, predicate: &Expr, scope: Scope<'_>) -> EvalResult {
        let items = match subject {
            Value::Array(items) => items,
            Value::Undefined => return Ok(Value::Array(Vec::new())),
            other => vec![other],
        };
        let verdicts = try_join_all(
            items
                .iter()
                .map(|item| self.eval(predicate, scope.with_relative(item))),
        )
        .await?;
        Ok(Value::Array(
            items
                .into_iter()
                .zip(verdicts)
                .filter_map(|(item, verdict)| verdict.is_truthy().then_some(item))
                .collect(),
        ))
    }

    async fn eval_all<'a, I>(&'a self, exprs: I, scope: Scope<'a>) -> Result<Vec<Value>, EvalError>
    where
        I: Iterator<Item = &'a Expr>,
    {
        try_join_all(exprs.map(|expr| self.eval(expr, scope))).await
    }

    fn callable(&self, name: &str, pool: Pool) -> Result<&'g Callable, EvalError> {
        match pool {
            Pool::Functions => self
                .grammar
                .function(name)
                .ok_or_else(|| EvalError::UnknownFunction(name.to_string())),
            Pool::Transforms => self
                .grammar
                .transform(name)
                .ok_or_else(|| EvalError::UnknownTransform(name.to_string())),
        }
    }
}

/// Property lookup used by identifiers; traversing through an array reads
/// its first element.
fn property(subject: &Value, name: &str) -> Value {
    match subject {
        Value::Array(items) => items.first().map_or(Value::Undefined, |first| first.get(name)),
        other => other.get(name),
    }
}

/// Bracket access with a single (non-relative) key.
fn index(subject: Value, key: &Value) -> Value {
    match (subject, key) {
        (subject, Value::Boolean(keep)) => {
            if *keep {
                subject
            } else {
                Value::Undefined
            }
        }
        (Value::Array(items), key) => position(key)
            .and_then(|i| items.into_iter().nth(i))
            .unwrap_or(Value::Undefined),
        (Value::String(s), key) => position(key)
            .and_then(|i| s.chars().nth(i))
            .map_or(Value::Undefined, |c| Value::String(c.to_string())),
        (subject, key) => subject.get(&key.as_string()),
    }
}

// Numbers and numeric strings both address positions.
fn position(key: &Value) -> Option<usize> {
    match key {
        Value::String(s) => s.parse().ok(),
        other => other.as_index(),
    }
}
