pub mod ast;
pub mod cli;
pub mod config;
pub mod database;
pub mod document;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod runner;
pub mod transform;
pub mod value;

pub use ast::Token;
pub use config::{OutputShape, RunnerConfig};
pub use database::{Database, DatabaseError, MockDatabase, StaticDatabase};
pub use document::QueryDocument;
pub use evaluator::{EvalError, Evaluator, Stage, StageOutcome};
pub use lexer::{LexError, Lexer, Position};
pub use output::{to_edn, to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use runner::{Metadata, PipelineOutput, QueryRunner, RunError};
pub use transform::Transform;
pub use value::Value;
