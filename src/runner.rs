use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use crate::{
    config::{OutputShape, RunnerConfig},
    database::{Database, DatabaseError},
    document::{self, QueryDocument},
    evaluator::{Evaluator, Stage},
    output::{to_edn, to_json, to_json_pretty},
    parser::ParseError,
    value::Value,
};

/// Errors that stop a pipeline run.
///
/// Problems with `:view` or `:result-transform` are not here: those stages
/// fall back to their input and only log.
#[derive(Debug, Error)]
pub enum RunError {
    /// The input is not an EDN map
    #[error("malformed query: {0}")]
    MalformedInput(#[from] ParseError),

    /// The document has no `:query` component
    #[error("the advanced query has no :query component")]
    MissingQueryComponent,

    /// The database rejected or failed the query
    #[error("database query failed: {0}")]
    DatabaseQueryFailed(#[source] DatabaseError),
}

/// What the pipeline reports about the document it ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub title: String,
    pub collapsed: bool,
    pub has_view: bool,
    pub has_result_transform: bool,
    pub has_inputs: bool,
    pub query_components: Vec<String>,
}

impl Metadata {
    fn from_document(doc: &QueryDocument, default_title: &str) -> Self {
        Metadata {
            title: doc.title().unwrap_or(default_title).to_string(),
            collapsed: doc.collapsed(),
            has_view: doc.contains(document::VIEW),
            has_result_transform: doc.contains(document::RESULT_TRANSFORM),
            has_inputs: doc.contains(document::INPUTS),
            query_components: doc.component_names(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::string("title"), Value::string(self.title.clone())),
            (Value::string("collapsed"), Value::Boolean(self.collapsed)),
            (Value::string("hasView"), Value::Boolean(self.has_view)),
            (
                Value::string("hasResultTransform"),
                Value::Boolean(self.has_result_transform),
            ),
            (Value::string("hasInputs"), Value::Boolean(self.has_inputs)),
            (
                Value::string("queryComponents"),
                Value::Vector(
                    self.query_components
                        .iter()
                        .cloned()
                        .map(Value::String)
                        .collect(),
                ),
            ),
        ])
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Raw tuples after result-transform and view
    pub results: Value,
    pub metadata: Metadata,
    /// Tuples exactly as the database returned them
    pub raw_results: Vec<Value>,
    /// True when the document held nothing but `:query`
    pub bare_query: bool,
}

impl PipelineOutput {
    /// `{results, metadata, rawResults}` as a value.
    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::string("results"), self.results.clone()),
            (Value::string("metadata"), self.metadata.to_value()),
            (
                Value::string("rawResults"),
                Value::Vector(self.raw_results.clone()),
            ),
        ])
    }

    /// Serializes the output for display.
    ///
    /// With [`OutputShape::Auto`] a query-only document prints as the bare raw
    /// tuple list and anything richer prints the full structure.
    pub fn render(&self, shape: OutputShape, pretty: bool) -> String {
        let value = match shape {
            OutputShape::Auto if self.bare_query => Value::Vector(self.raw_results.clone()),
            OutputShape::Auto | OutputShape::Full => self.to_value(),
            OutputShape::Results => self.results.clone(),
        };
        if pretty {
            to_json_pretty(&value)
        } else {
            to_json(&value)
        }
    }
}

/// Runs advanced queries: parse, query the database, transform, package.
///
/// The runner holds no per-run state, so one instance can serve overlapping
/// runs.
pub struct QueryRunner {
    database: Arc<dyn Database>,
    evaluator: Evaluator,
    config: RunnerConfig,
}

impl QueryRunner {
    pub fn new(database: Arc<dyn Database>) -> Self {
        Self::with_config(database, RunnerConfig::default())
    }

    pub fn with_config(database: Arc<dyn Database>, config: RunnerConfig) -> Self {
        QueryRunner {
            database,
            evaluator: Evaluator::new(),
            config,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs one advanced query.
    ///
    /// Parsing and `:query` extraction happen before the database is
    /// contacted, so malformed input never reaches it. The database is called
    /// exactly once with the EDN text of `:query`. `:result-transform` is then
    /// applied, followed by `:view`.
    pub async fn run(&self, text: &str) -> Result<PipelineOutput, RunError> {
        let document = QueryDocument::parse(text)?;
        let query = document.query().ok_or(RunError::MissingQueryComponent)?;
        let query_text = to_edn(query);

        debug!(database = self.database.name(), query = %query_text, "dispatching query");
        let raw_results = self.database.query(&query_text).await.map_err(|e| {
            error!(error = %e, "database query failed");
            RunError::DatabaseQueryFailed(e)
        })?;
        debug!(rows = raw_results.len(), "query returned");

        let mut results = Value::Vector(raw_results.clone());
        for (stage, name) in [
            (Stage::ResultTransform, document::RESULT_TRANSFORM),
            (Stage::View, document::VIEW),
        ] {
            if let Some(expression) = document.expression_text(name) {
                let outcome = self.evaluator.apply_stage(stage, &expression, results);
                debug!(%stage, degraded = outcome.is_degraded(), "stage finished");
                results = outcome.into_value();
            }
        }

        Ok(PipelineOutput {
            results,
            metadata: Metadata::from_document(&document, &self.config.default_title),
            raw_results,
            bare_query: document.is_bare_query(),
        })
    }

    /// Runs one advanced query and serializes the output as configured.
    pub async fn run_to_string(&self, text: &str) -> Result<String, RunError> {
        let output = self.run(text).await?;
        Ok(output.render(self.config.output, self.config.pretty))
    }
}
