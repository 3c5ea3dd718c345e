//! Database capability consumed by the query runner.
//!
//! The runner never talks to a concrete database. It receives an
//! `Arc<dyn Database>` when it is built, and the choice between a
//! host-provided database and the built-in [`MockDatabase`] is made once, by
//! whoever assembles the application (see [`resolve`]).

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::value::Value;

/// Failure reported by a database backend.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The backend rejected the query text
    #[error("query rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached or failed internally
    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Executes query expressions and returns result tuples.
#[async_trait]
pub trait Database: Send + Sync {
    /// Runs `expression` (EDN text such as `[:find ?b :where ...]`) and
    /// returns the result tuples in order.
    async fn query(&self, expression: &str) -> Result<Vec<Value>, DatabaseError>;

    /// Name used in logs
    fn name(&self) -> &'static str {
        "database"
    }
}

/// Picks the database for a runner: the host's when one is available,
/// otherwise the [`MockDatabase`].
///
/// Call this at the composition boundary, once per runner you build.
pub fn resolve(host: Option<Arc<dyn Database>>) -> Arc<dyn Database> {
    match host {
        Some(database) => {
            debug!(database = database.name(), "using host database");
            database
        }
        None => {
            debug!("no host database available, using mock");
            Arc::new(MockDatabase::new())
        }
    }
}

/// One block of the mock seed data.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: i64,
    pub content: String,
    pub refs: Vec<String>,
}

impl Block {
    fn new(id: i64, content: &str, refs: &[&str]) -> Self {
        Block {
            id,
            content: content.to_string(),
            refs: refs.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::keyword("id"), Value::Integer(self.id)),
            (Value::keyword("content"), Value::string(self.content.clone())),
            (
                Value::keyword("refs"),
                Value::Vector(self.refs.iter().cloned().map(Value::String).collect()),
            ),
        ])
    }
}

/// Seed blocks served by [`MockDatabase`]: two open tasks and one done.
pub fn seed_blocks() -> Vec<Block> {
    vec![
        Block::new(1, "TODO Write documentation for the plugin", &["TODO"]),
        Block::new(2, "DONE Initial project scaffold", &["DONE"]),
        Block::new(3, "TODO Implement query runner", &["TODO"]),
    ]
}

/// Development stand-in for the host database.
///
/// Every query returns the whole seed data set, whatever it asks for.
#[derive(Debug, Clone)]
pub struct MockDatabase {
    blocks: Vec<Block>,
}

impl MockDatabase {
    pub fn new() -> Self {
        MockDatabase {
            blocks: seed_blocks(),
        }
    }
}

impl Default for MockDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Database for MockDatabase {
    async fn query(&self, expression: &str) -> Result<Vec<Value>, DatabaseError> {
        info!(query = expression, "mock database query executed");
        Ok(self.blocks.iter().map(Block::to_value).collect())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Database that answers every query with the same tuples.
///
/// Used for fixture files on the command line and as a host stand-in.
#[derive(Debug, Clone, Default)]
pub struct StaticDatabase {
    rows: Vec<Value>,
}

impl StaticDatabase {
    pub fn new(rows: Vec<Value>) -> Self {
        StaticDatabase { rows }
    }
}

#[async_trait]
impl Database for StaticDatabase {
    async fn query(&self, expression: &str) -> Result<Vec<Value>, DatabaseError> {
        debug!(query = expression, rows = self.rows.len(), "static database query");
        Ok(self.rows.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
