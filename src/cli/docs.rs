//! Reference documentation printed by `jexl docs` and `jexl doc`

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Filters,
    Transforms,
    Types,
}

impl DocCategory {
    /// Parse category name from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "filters" | "filter" => Some(Self::Filters),
            "transforms" | "transform" | "functions" => Some(Self::Transforms),
            "types" | "type" => Some(Self::Types),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"JEXL DOCUMENTATION

Jexl is a small expression language evaluated against a JSON context.
Expressions read context values by name, combine them with operators, and
pipe them through host-registered transforms.

DOCUMENTATION CATEGORIES

  syntax        Literals, identifiers, property access, objects and arrays
  operators     Arithmetic, comparison and logical operators with precedence
  filters       Bracket access: indexing and per-element filtering
  transforms    Pipes, transforms and function calls
  types         Values, truthiness, null and undefined

QUICK REFERENCE

  user.name             Property access
  items[0]              Index
  items[.price > 10]    Filter by element
  a ? b : c             Conditional
  a ?: b                a when truthy, otherwise b
  name|upper            Transform (host-registered)
  Math.max(a, b)        Function call (host-registered)

Transforms and functions come from the embedding application. The jexl
binary registers none, so 'jexl check' reports them as unknown.

Run 'jexl doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::parse(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Filters) => Ok(FILTERS_DOC),
        Some(DocCategory::Transforms) => Ok(TRANSFORMS_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX

LITERALS
  42  -7  3.14          Numbers (a sign directly before a digit is part of the number)
  "text"  'text'        Strings; backslash escapes the quote and itself
  true  false           Booleans
  null  undefined       The two empty values

IDENTIFIERS
  name
    Looks up a top-level key of the context.

    Example:
      Context:    {"name": "Alice"}
      Expression: name
      Output:     "Alice"

PROPERTY ACCESS
  user.address.city
    Each step reads a key of the previous value.

    Constraints:
      - A missing key gives undefined, not an error
      - A property of null is null
      - A property read through an array uses its first element

OBJECT AND ARRAY LITERALS
  {name: user.name, "full name": first + " " + last}
  [1, two, "three"]
    Members are evaluated in order. Object keys are identifiers or strings.

CONDITIONALS
  age >= 18 ? "adult" : "minor"
  nickname ?: name

WHITESPACE
  Spaces, tabs and newlines between tokens are ignored.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS

Lowest to highest precedence. Operators of equal precedence group left,
so 10 - 2 - 3 is 5.

  10  ||  &&                Logical; return one of their operands
  20  == != < <= > >= in    Comparison and membership
  30  + -                   Addition, subtraction, string concatenation
  40  * / // %              Multiply, divide, floor divide, remainder
  50  ^                     Power
      !                     Logical not (binds tightest)

LOGICAL
  a || b    a when truthy, otherwise b
  a && b    a when falsy, otherwise b
    The right operand is only evaluated when needed.

EQUALITY
  1 == 1.0              true
  null == undefined     true
  "1" == 1              false

MEMBERSHIP
  "ell" in "hello"      Substring
  2 in [1, 2, 3]        Array element
  "a" in {a: 1}         Object key

ARITHMETIC
  10 / 2      5       (exact result: integer)
  10 / 3      3.333   (inexact result: float)
  7 // 2      3
  "a" + 1     "a1"
  1 / 0       error: division by zero

Hosts may add, replace or remove any operator.
"#;

const FILTERS_DOC: &str = r#"FILTERS

INDEXING
  items[1]
  user["first name"]
  items[index + 1]
    The bracketed expression is evaluated once. Numbers index arrays and
    strings; anything else is used as a property key.

    Example:
      Context:    {"a": [{"b": 1}, {"b": 2}]}
      Expression: a[1]
      Output:     {"b": 2}

FILTERING
  items[.price > 10]
    A leading dot reads from the element being tested. Elements for which
    the expression is truthy are kept, in order.

    Example:
      Context:    {"a": [{"b": 1}, {"b": 2}, {"b": 3}]}
      Expression: a[.b > 1]
      Output:     [{"b": 2}, {"b": 3}]

    Constraints:
      - A non-array subject is tested as a single element
      - An undefined subject gives []
      - Names without a leading dot still read the outer context:
          items[.price > limit]

BOOLEAN GUARD
  user[isAdmin]
    A boolean key returns the subject when true and undefined when false.
"#;

const TRANSFORMS_DOC: &str = r#"TRANSFORMS AND FUNCTIONS

Both are registered by the host application; none are built in. The
examples below assume a host that registered them: the jexl binary has an
empty library, so 'jexl check "x|upper"' fails with "Unknown transform".

TRANSFORMS
  value|name
  value|name(arg1, arg2)
    The piped value is the first argument: x|f(a, b) calls f(x, a, b).
    Pipes chain from left to right: 5|double|addOne.

FUNCTIONS
  name(arg1, arg2)
  Math.max(a, b)
    Dotted names call the function registered under the full dotted name.

NAMESPACED TRANSFORMS
  value|str.upper
    By default the dotted run after a pipe names one transform. Hosts that
    turn this off get a traversal of the transform's result instead.
"#;

const TYPES_DOC: &str = r#"TYPES

  undefined   Missing value; printed as null in JSON output
  null        Explicit empty value
  boolean     true, false
  integer     Whole numbers
  float       Numbers with a fractional part
  string      Text
  array       Ordered list
  object      Keys in insertion order

TRUTHINESS
  Falsy: undefined, null, false, 0, NaN, ""
  Everything else is truthy, including [] and {}.

NULL AND UNDEFINED
  foo.bar with {"foo": null}     null
  foo.bar with {}                undefined
  null ? 1 : 2                   2
"#;
