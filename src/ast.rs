//! # Token model for the EDN reader
//!
//! Query documents, query expressions, and view/transform functions are all
//! written in EDN. The [`crate::lexer::Lexer`] turns source text into
//! [`Token`]s and the [`crate::parser::Parser`] assembles them into
//! [`crate::Value`]s.
//!
//! ```text
//! {:title "Example" :query [:find ?b :where [?b :block/refs #{"TODO"}]]}
//! ```
//!
//! reads as a map with two keyword keys; the `:query` value is a vector that
//! mixes keywords, symbols (`?b`), and a set literal.
pub mod tokens;

pub use tokens::Token;
