//! An embeddable expression language.
//!
//! Expressions are compiled once by a [`Jexl`] engine and evaluated many
//! times against different JSON-like contexts. Operators, functions and
//! transforms all live in a [`Grammar`] the host can extend.
//!
//! ```
//! use futures::executor::block_on;
//! use jexl_lang::{Jexl, Value};
//! use serde_json::json;
//!
//! let jexl = Jexl::new();
//! let context = Value::from(json!({"a": [{"b": 1}, {"b": 2}, {"b": 3}]}));
//! let result = block_on(jexl.evaluate("a[.b > 1]", &context)).unwrap();
//! assert_eq!(result, Value::from(json!([{"b": 2}, {"b": 3}])));
//! ```

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod grammar;
pub mod lexer;
pub mod operators;
pub mod parser;
pub mod value;

pub use ast::{Expr, Pool, Token, TokenKind};
pub use engine::{Expression, Jexl};
pub use error::Error;
pub use evaluator::{EvalError, Evaluator, Scope};
pub use grammar::{Deferred, EvalResult, Grammar};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, ParseOptions, Parser};
pub use value::{Map, Value};
