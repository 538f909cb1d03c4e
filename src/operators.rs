//! Built-in operator set.
//!
//! | symbol | precedence |
//! |---|---|
//! | `\|\|` `&&` | 10 |
//! | `==` `!=` `<` `<=` `>` `>=` `in` | 20 |
//! | `+` `-` | 30 |
//! | `*` `/` `//` `%` | 40 |
//! | `^` | 50 |
//! | `!` (unary) | highest |

use futures::FutureExt;
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::{
    evaluator::EvalError,
    grammar::{EvalResult, Grammar},
    value::Value,
};

pub(crate) fn install(grammar: &mut Grammar) {
    grammar.add_deferred_binary_op("||", 10, |left, right| {
        async move {
            let value = left.await?;
            if value.is_truthy() { Ok(value) } else { right.await }
        }
        .boxed()
    });
    grammar.add_deferred_binary_op("&&", 10, |left, right| {
        async move {
            let value = left.await?;
            if value.is_truthy() { right.await } else { Ok(value) }
        }
        .boxed()
    });

    grammar.add_binary_op("==", 20, |a, b| Ok(Value::Boolean(loose_eq(a, b))));
    grammar.add_binary_op("!=", 20, |a, b| Ok(Value::Boolean(!loose_eq(a, b))));
    grammar.add_binary_op("<", 20, |a, b| Ok(compare(a, b, |o| o.is_lt())));
    grammar.add_binary_op("<=", 20, |a, b| Ok(compare(a, b, |o| o.is_le())));
    grammar.add_binary_op(">", 20, |a, b| Ok(compare(a, b, |o| o.is_gt())));
    grammar.add_binary_op(">=", 20, |a, b| Ok(compare(a, b, |o| o.is_ge())));
    grammar.add_binary_op("in", 20, |a, b| Ok(Value::Boolean(contains(b, a))));

    grammar.add_binary_op("+", 30, add);
    grammar.add_binary_op("-", 30, |a, b| arithmetic(Arith::Sub, a, b));
    grammar.add_binary_op("*", 40, |a, b| arithmetic(Arith::Mul, a, b));
    grammar.add_binary_op("/", 40, |a, b| arithmetic(Arith::Div, a, b));
    grammar.add_binary_op("//", 40, floor_div);
    grammar.add_binary_op("%", 40, |a, b| arithmetic(Arith::Rem, a, b));
    grammar.add_binary_op("^", 50, power);

    grammar.add_unary_op("!", |v| Ok(Value::Boolean(!v.is_truthy())));
}

/// Equality used by `==`: numbers compare by value across integer and float,
/// `null` equals `undefined`, containers compare element-wise.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => {
            a.as_float() == b.as_float()
        }
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| loose_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).is_some_and(|other| loose_eq(v, other)))
        }
        _ => a == b,
    }
}

// Numbers compare numerically, strings lexicographically; any other pairing
// is simply not ordered.
fn compare(a: &Value, b: &Value, pick: fn(std::cmp::Ordering) -> bool) -> Value {
    let ordering = match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => match (a.as_float(), b.as_float()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    };
    Value::Boolean(ordering.is_some_and(pick))
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::String(s) => match needle {
            Value::String(n) => s.contains(n.as_str()),
            _ => false,
        },
        Value::Array(items) => items.iter().any(|item| loose_eq(item, needle)),
        Value::Object(map) => match needle {
            Value::String(key) => map.contains_key(key),
            _ => false,
        },
        _ => false,
    }
}

fn add(a: &Value, b: &Value) -> EvalResult {
    match (a, b) {
        (Value::String(_), _) | (_, Value::String(_)) => {
            Ok(Value::String(format!("{}{}", a.as_string(), b.as_string())))
        }
        _ => arithmetic(Arith::Add, a, b),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Arith {
    fn verb(self) -> &'static str {
        match self {
            Arith::Add => "add",
            Arith::Sub => "subtract",
            Arith::Mul => "multiply",
            Arith::Div => "divide",
            Arith::Rem => "compute modulo of",
        }
    }

    fn floats(self, a: f64, b: f64) -> f64 {
        match self {
            Arith::Add => a + b,
            Arith::Sub => a - b,
            Arith::Mul => a * b,
            Arith::Div => a / b,
            Arith::Rem => a % b,
        }
    }

    fn decimals(self, a: Decimal, b: Decimal) -> Option<Decimal> {
        match self {
            Arith::Add => a.checked_add(b),
            Arith::Sub => a.checked_sub(b),
            Arith::Mul => a.checked_mul(b),
            Arith::Div => a.checked_div(b),
            Arith::Rem => a.checked_rem(b),
        }
    }
}

fn arithmetic(op: Arith, left: &Value, right: &Value) -> EvalResult {
    if matches!(op, Arith::Div | Arith::Rem) && right.as_float() == Some(0.0) {
        return Err(EvalError::DivisionByZero);
    }
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(integers(op, *a, *b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(op.floats(*a, *b))),
        (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => {
            Ok(mixed(op, left, right))
        }
        (a, b) => Err(EvalError::TypeError(format!(
            "Cannot {} {} and {}",
            op.verb(),
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn integers(op: Arith, a: i64, b: i64) -> Value {
    let exact = match op {
        Arith::Add => a.checked_add(b),
        Arith::Sub => a.checked_sub(b),
        Arith::Mul => a.checked_mul(b),
        Arith::Rem => a.checked_rem(b),
        // Check if division is exact; if not, return Float
        Arith::Div => match a.checked_rem(b) {
            Some(0) => a.checked_div(b),
            _ => None,
        },
    };
    match exact {
        Some(n) => Value::Integer(n),
        None => Value::Float(op.floats(a as f64, b as f64)),
    }
}

// Mixed integer/float arithmetic goes through decimals so that `100 * 1.1`
// is exactly 110, narrowed back to an integer when whole.
fn mixed(op: Arith, left: &Value, right: &Value) -> Value {
    if let Some(ad) = to_decimal(left)
        && let Some(bd) = to_decimal(right)
        && let Some(rd) = op.decimals(ad, bd)
    {
        if rd.is_integer()
            && let Some(r) = rd.to_i64()
        {
            return Value::Integer(r);
        } else if let Some(r) = rd.to_f64() {
            return Value::Float(r);
        }
    }
    let (a, b) = (left.as_float().unwrap_or(f64::NAN), right.as_float().unwrap_or(f64::NAN));
    Value::Float(op.floats(a, b))
}

fn to_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Integer(n) => Decimal::from_i64(*n),
        Value::Float(n) => Decimal::from_f64(*n),
        _ => None,
    }
}

fn floor_div(left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (_, r) if r.as_float() == Some(0.0) => Err(EvalError::DivisionByZero),
        // i64::MIN // -1 overflows and takes the float path below
        (Value::Integer(a), Value::Integer(b)) if a.checked_div(*b).is_some() => {
            let (q, r) = (a / b, a % b);
            if r != 0 && ((r < 0) != (*b < 0)) {
                Ok(Value::Integer(q - 1))
            } else {
                Ok(Value::Integer(q))
            }
        }
        (a, b) => match (a.as_float(), b.as_float()) {
            (Some(x), Some(y)) => {
                let floored = (x / y).floor();
                if floored.is_finite() && floored.abs() < i64::MAX as f64 {
                    Ok(Value::Integer(floored as i64))
                } else {
                    Ok(Value::Float(floored))
                }
            }
            _ => Err(EvalError::TypeError(format!(
                "Cannot floor-divide {} by {}",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

fn power(base: &Value, exponent: &Value) -> EvalResult {
    match (base, exponent) {
        (Value::Integer(b), Value::Integer(e)) if *e >= 0 => {
            let folded = u32::try_from(*e).ok().and_then(|e| b.checked_pow(e));
            Ok(folded
                .map(Value::Integer)
                .unwrap_or_else(|| Value::Float((*b as f64).powf(*e as f64))))
        }
        (b, e) => match (b.as_float(), e.as_float()) {
            (Some(x), Some(y)) => Ok(Value::Float(x.powf(y))),
            _ => Err(EvalError::TypeError(format!(
                "Cannot raise {} to the power of {}",
                b.type_name(),
                e.type_name()
            ))),
        },
    }
}
