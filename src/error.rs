use thiserror::Error;

use crate::{evaluator::EvalError, lexer::LexError, parser::ParseError};

/// Any failure of a compile or an evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
