//! CLI support for jexl-lang
//!
//! Exposes the pieces of the `jexl` binary so other tools can run checks or
//! print the reference without spawning a process.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Compile error: {0}")]
    Compile(crate::Error),

    #[error("Evaluation error: {0}")]
    Eval(crate::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown category: '{0}'\nRun 'jexl docs' to see available categories.")]
    UnknownCategory(String),
}
