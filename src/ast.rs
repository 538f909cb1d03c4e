//! # Jexl Expression Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the syntax tree of the expression
//! language: a small, dynamically-typed language compiled once and evaluated
//! many times against different contexts.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, identifiers, operations,
//!   filters, conditionals, calls)
//!
//! ## Quick Start
//!
//! ```text
//! users[.age >= 18].name|upper
//! ```
//!
//! Filters `users` down to the adults, takes the first adult's name and pipes
//! it through the `upper` transform.
//!
//! ## Core Concepts
//!
//! ### Property Traversal
//!
//! `a.b.c` reads nested properties. Stepping onto an array reads its first
//! element, so `order.items.sku` is `order.items[0].sku`. Reading through
//! `null` yields `null`; reading anything missing yields `undefined`.
//!
//! ### Filters and Indexing
//!
//! - `items[1]`, `user["first name"]` - index or key access
//! - `items[.price > 10]` - keeps the elements whose predicate is truthy;
//!   the leading dot makes `price` resolve against each element
//!
//! ### Operators
//!
//! Every operator lives in the grammar with a precedence. Operators can be
//! added, replaced or removed at setup time, and `&&`/`||` only evaluate their
//! right operand when needed.
//!
//! ### Calls
//!
//! - `max(a, b)` - function from the `functions` pool
//! - `value|round(2)` - transform from the `transforms` pool, receiving
//!   `value` as its first argument
//! - `Math.max(a, b)`, `value|String.upper` - dotted names are flat keys
//!
//! ## Examples
//!
//! ```text
//! price * qty > 100 ? "bulk" : "retail"
//! {name: user.name, tags: [a, b]}
//! nickname ?: name
//! ```
pub mod expressions;
pub mod tokens;

pub use expressions::{Expr, Pool};
pub use tokens::{Token, TokenKind};
