use crate::value::Value;

/// Registry table a [`Expr::FunctionCall`] resolves its name against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    /// Called as `name(args)`
    Functions,
    /// Called as `subject|name(args)`, with the subject as first argument
    Transforms,
}

/// Abstract Syntax Tree node representing a parsed expression.
///
/// The tree is fully owned: parent links only exist while the parser builds
/// it, and evaluation walks it top-down.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Scalar literal
    ///
    /// # Example
    /// ```text
    /// 42
    /// "hello"
    /// undefined
    /// ```
    Literal(Value),

    /// Name resolved against a context
    ///
    /// `from` holds the preceding link of a traversal chain, so `a.b.c` is
    /// `c` from (`b` from `a`). `relative` identifiers were written with a
    /// leading dot and resolve against the element a filter is visiting.
    ///
    /// # Examples
    /// ```text
    /// user
    /// user.address.city
    /// items[.price > 10]
    /// ```
    Identifier {
        name: String,
        from: Option<Box<Expr>>,
        relative: bool,
    },

    /// Binary operation looked up by symbol in the grammar
    BinaryExpression {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation looked up by symbol in the grammar
    UnaryExpression {
        operator: String,
        right: Box<Expr>,
    },

    /// Ternary conditional; a missing consequent is the `test ?: alternate`
    /// shorthand that yields the test value when truthy
    ///
    /// # Examples
    /// ```text
    /// age >= 18 ? "adult" : "minor"
    /// nickname ?: name
    /// ```
    ConditionalExpression {
        test: Box<Expr>,
        consequent: Option<Box<Expr>>,
        alternate: Box<Expr>,
    },

    /// Bracket access: an index/key lookup, or a per-element filter when the
    /// bracketed expression uses relative identifiers
    ///
    /// # Examples
    /// ```text
    /// items[0]
    /// user["first name"]
    /// items[.price > 10]
    /// ```
    FilterExpression {
        subject: Box<Expr>,
        expr: Box<Expr>,
        relative: bool,
    },

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [a, b + 1, "c"]
    /// ```
    ArrayLiteral(Vec<Expr>),

    /// Object literal, entries in declaration order
    ///
    /// # Example
    /// ```text
    /// {name: user.name, "total-price": price * qty}
    /// ```
    ObjectLiteral(Vec<(String, Expr)>),

    /// Function or transform call
    ///
    /// # Examples
    /// ```text
    /// Math.max(a, b)
    /// name|upper|pad(10)
    /// ```
    FunctionCall {
        name: String,
        args: Vec<Expr>,
        pool: Pool,
    },
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Plain identifier resolved against the outer context.
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier {
            name: name.into(),
            from: None,
            relative: false,
        }
    }

    /// Whether this subtree contains relative identifiers that belong to the
    /// enclosing filter. Nested filters own their relative identifiers.
    pub fn has_relative(&self) -> bool {
        match self {
            Expr::Literal(_) => false,
            Expr::Identifier { from, relative, .. } => {
                *relative || from.as_deref().is_some_and(Expr::has_relative)
            }
            Expr::BinaryExpression { left, right, .. } => left.has_relative() || right.has_relative(),
            Expr::UnaryExpression { right, .. } => right.has_relative(),
            Expr::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                test.has_relative()
                    || consequent.as_deref().is_some_and(Expr::has_relative)
                    || alternate.has_relative()
            }
            Expr::FilterExpression { subject, .. } => subject.has_relative(),
            Expr::ArrayLiteral(items) => items.iter().any(Expr::has_relative),
            Expr::ObjectLiteral(entries) => entries.iter().any(|(_, e)| e.has_relative()),
            Expr::FunctionCall { args, .. } => args.iter().any(Expr::has_relative),
        }
    }
}
