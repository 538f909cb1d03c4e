//! Compile and run an expression against a JSON context

use futures::executor::block_on;

use super::CliError;
use crate::{Jexl, Value};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The expression to run
    pub expression: String,
    /// JSON context; an empty object when absent
    pub input: Option<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// The expression compiled
    SyntaxValid,
    /// The expression evaluated to a value
    Success(Value),
}

/// Compiles the expression and, unless only the syntax is checked,
/// evaluates it against the parsed input.
pub fn execute_check(jexl: &Jexl, options: &CheckOptions) -> Result<CheckResult, CliError> {
    let expression = jexl.compile(&options.expression).map_err(CliError::Compile)?;
    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let context = match &options.input {
        Some(json) if !json.trim().is_empty() => Value::from(serde_json::from_str::<serde_json::Value>(json)?),
        _ => Value::Object(Default::default()),
    };
    log::debug!("evaluating `{}`", expression.source());

    let result = block_on(expression.evaluate(&context)).map_err(CliError::Eval)?;
    Ok(CheckResult::Success(result))
}
