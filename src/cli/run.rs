//! Run advanced queries from the command line

use std::sync::Arc;

use super::{CliError, json_to_value};
use crate::{
    Database, Evaluator, MockDatabase, QueryDocument, QueryRunner, RunnerConfig, StaticDatabase,
};

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// The advanced query (EDN map)
    pub query: String,
    /// JSON array of result tuples to serve instead of the mock seed data
    pub results: Option<String>,
    /// Runner settings
    pub config: RunnerConfig,
    /// Only validate the document, don't run it
    pub syntax_only: bool,
}

/// Result of a run operation
#[derive(Debug, PartialEq)]
pub enum RunOutcome {
    /// Document parsed and has a :query component
    SyntaxValid,
    /// Query ran; serialized pipeline output
    Success(String),
}

/// Database for a command-line run: fixture tuples when given, else the mock.
fn database_for(results: Option<&str>) -> Result<Arc<dyn Database>, CliError> {
    let Some(json) = results else {
        return Ok(Arc::new(MockDatabase::new()));
    };
    match json_to_value(serde_json::from_str(json)?) {
        crate::Value::Vector(rows) => Ok(Arc::new(StaticDatabase::new(rows))),
        other => Err(CliError::FixtureNotArray(other.type_name())),
    }
}

/// Execute a run operation
pub async fn execute_run(options: &RunOptions) -> Result<RunOutcome, CliError> {
    if options.syntax_only {
        let document = QueryDocument::parse(&options.query).map_err(crate::RunError::from)?;
        return match document.query() {
            Some(_) => Ok(RunOutcome::SyntaxValid),
            None => Err(crate::RunError::MissingQueryComponent.into()),
        };
    }

    let database = database_for(options.results.as_deref())?;
    let runner = QueryRunner::with_config(database, options.config.clone());
    let output = runner.run_to_string(&options.query).await?;
    Ok(RunOutcome::Success(output))
}

/// Show how the evaluator reads a view or result-transform expression
pub fn execute_compile(expression: &str) -> Result<String, CliError> {
    Ok(Evaluator::new().compile(expression)?)
}
