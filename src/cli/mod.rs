//! CLI support for advq
//!
//! Provides programmatic access to the advq command-line operations so they
//! can be embedded in other tools and tested without spawning a process.

mod convert;
mod docs;
mod run;

pub use convert::json_to_value;
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use run::{RunOptions, RunOutcome, execute_compile, execute_run};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// The pipeline failed
    #[error("{0}")]
    Run(#[from] crate::RunError),
    /// EDN parsing error outside a pipeline run
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),
    /// Evaluator fault
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),
    /// Config file error
    #[error("{0}")]
    Config(#[from] crate::config::ConfigError),
    /// Fixture JSON error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Fixture JSON is valid but not a list of tuples
    #[error("Results fixture must be a JSON array, found {0}")]
    FixtureNotArray(&'static str),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// No input provided
    #[error("No query provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,
    /// Unknown documentation category
    #[error("Unknown category: '{0}'\nRun 'advq docs' to see available categories.")]
    UnknownCategory(String),
}
