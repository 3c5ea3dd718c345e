//! The parsed advanced-query document.
//!
//! An advanced query is an EDN map whose keyword keys name its components:
//!
//! ```text
//! {:title            "TODO blocks"
//!  :query            [:find ?b :where [?b :block/refs #{"TODO"}]]
//!  :result-transform (fn [data] (take 3 data))
//!  :view             (fn [data] (map first data))
//!  :collapsed?       false}
//! ```
//!
//! Only `:query` is required. Every top-level key is remembered in the order it
//! was written so the pipeline can report which components were present.

use tracing::debug;

use crate::{
    lexer::Lexer,
    output::to_edn,
    parser::{ParseError, Parser},
    value::Value,
};

pub const QUERY: &str = "query";
pub const VIEW: &str = "view";
pub const RESULT_TRANSFORM: &str = "result-transform";
pub const TITLE: &str = "title";
pub const COLLAPSED: &str = "collapsed";
pub const INPUTS: &str = "inputs";

/// Components of one advanced query, in encounter order.
///
/// Built once per pipeline run and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDocument {
    components: Vec<(String, Value)>,
}

impl QueryDocument {
    /// Reads `text` as an EDN map.
    ///
    /// Fails when the text is not valid EDN, when the top-level form is not a
    /// map, or when two keys name the same component (`:title` and `"title"`).
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let value = Parser::new(Lexer::new(text))?.parse()?;

        let entries = match value {
            Value::Map(entries) => entries,
            other => {
                return Err(ParseError::NotAMap {
                    found: format!("{} {}", other.type_name(), to_edn(&other)),
                });
            }
        };

        let mut components: Vec<(String, Value)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let name = component_name(&key);
            if components.iter().any(|(existing, _)| *existing == name) {
                return Err(ParseError::DuplicateComponent { name });
            }
            components.push((name, value));
        }

        debug!(
            components = ?components.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            "parsed query document"
        );
        Ok(QueryDocument { components })
    }

    /// Looks up a component by name (without the leading colon).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.components
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn query(&self) -> Option<&Value> {
        self.get(QUERY)
    }

    pub fn view(&self) -> Option<&Value> {
        self.get(VIEW)
    }

    pub fn result_transform(&self) -> Option<&Value> {
        self.get(RESULT_TRANSFORM)
    }

    /// The `:title` component when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.get(TITLE).and_then(Value::as_str)
    }

    /// `:collapsed` (or `:collapsed?`), false when absent.
    pub fn collapsed(&self) -> bool {
        self.get(COLLAPSED)
            .or_else(|| self.get("collapsed?"))
            .is_some_and(Value::is_truthy)
    }

    /// Every top-level component name, in the order written.
    pub fn component_names(&self) -> Vec<String> {
        self.components.iter().map(|(n, _)| n.clone()).collect()
    }

    /// True when nothing besides `:query` was given.
    pub fn is_bare_query(&self) -> bool {
        self.components.iter().all(|(n, _)| n == QUERY)
    }

    /// Text handed to the evaluator for an expression-valued component.
    ///
    /// Strings are display tags and are passed through without quotes, so
    /// `"table"` and `table` are treated the same way.
    pub fn expression_text(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| match value {
            Value::String(s) => s.clone(),
            other => to_edn(other),
        })
    }
}

/// Component name for a map key: keywords and symbols lose nothing but the
/// sigil, strings are taken as-is, anything else uses its EDN text.
fn component_name(key: &Value) -> String {
    match key {
        Value::Keyword(name) | Value::Symbol(name) | Value::String(name) => name.clone(),
        other => to_edn(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_keyword_sigil() {
        let doc = QueryDocument::parse(r#"{:title "Example" :query [:find ?b]}"#).unwrap();
        assert_eq!(doc.component_names(), vec!["title", "query"]);
        assert_eq!(doc.title(), Some("Example"));
    }

    #[test]
    fn collapsed_accepts_question_mark_form() {
        let doc = QueryDocument::parse("{:query [] :collapsed? true}").unwrap();
        assert!(doc.collapsed());
        let doc = QueryDocument::parse("{:query []}").unwrap();
        assert!(!doc.collapsed());
    }

    #[test]
    fn string_expressions_are_unquoted() {
        let doc = QueryDocument::parse(r#"{:query [] :view "table"}"#).unwrap();
        assert_eq!(doc.expression_text(VIEW).as_deref(), Some("table"));
    }
}
