//! Documentation content for the advq CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Document,
    Query,
    Views,
    Output,
    Errors,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "document" | "doc" | "components" => Some(Self::Document),
            "query" | "queries" | "edn" => Some(Self::Query),
            "views" | "view" | "result-transform" | "transforms" => Some(Self::Views),
            "output" | "results" => Some(Self::Output),
            "errors" | "error" => Some(Self::Errors),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"ADVQ DOCUMENTATION

advq runs advanced queries: EDN maps that bundle a database query with
optional display settings and result transformations.

DOCUMENTATION CATEGORIES

  document          Components of an advanced query and their defaults
  query             EDN notation accepted in documents and query vectors
  views             :view and :result-transform functions that are understood
  output            Shape of the printed results
  errors            What fails a run and what only logs a warning

QUICK REFERENCE

  {:title "Example"
   :query [:find ?b :where [?b :block/refs #{"TODO"}]]
   :result-transform (fn [data] (take 3 data))
   :view (fn [data] (map first data))}

Run 'advq doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Document) => Ok(DOCUMENT_DOC),
        Some(DocCategory::Query) => Ok(QUERY_DOC),
        Some(DocCategory::Views) => Ok(VIEWS_DOC),
        Some(DocCategory::Output) => Ok(OUTPUT_DOC),
        Some(DocCategory::Errors) => Ok(ERRORS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const DOCUMENT_DOC: &str = r#"DOCUMENT - Advanced Query Components

An advanced query is one EDN map. Keys are usually keywords; the leading
colon is dropped when components are reported.

  :query              Required. Sent to the database as EDN text.
  :title              Display title. Default: "Advanced Query".
  :collapsed          Display flag (also :collapsed?). Default: false.
  :result-transform   Function applied to the raw tuples first.
  :view               Function applied after :result-transform.
  :inputs             Recorded as present; not interpreted.
  anything else       Kept and listed in queryComponents.

  Example:
    {:title "Open tasks"
     :query [:find ?b :where [?b :block/refs #{"TODO"}]]
     :collapsed? false}

  Constraints:
    - The top-level form must be a map
    - A component may appear only once (:title and "title" clash)
"#;

const QUERY_DOC: &str = r#"QUERY - EDN Notation

  nil true false            literals
  42  -7  12N               integers
  3.14  1e3                 floats
  1.50M                     exact decimals
  "text"                    strings (\n \t \" \\ \uXXXX escapes)
  \a \newline \space        characters
  first  ?b  clojure.string/join   symbols
  :find  :block/refs        keywords
  (a b)  [a b]              lists, vectors
  {:k v}                    maps
  #{"TODO" "DOING"}         sets
  #inst "2024-01-01"        tagged literals
  #(first %)                anonymous functions (read, not run)
  #"^TODO"                  regex literals
  ; comment                 ignored to end of line
  #_form                    form is discarded

  Commas count as whitespace. The :query value is passed to the database
  exactly as it reads back, for example:

    [:find ?b :where [?b :block/refs #{"TODO"}]]
"#;

const VIEWS_DOC: &str = r#"VIEWS - :view and :result-transform

Both components take a one-argument function. Only these shapes are
understood; the first one found in the body wins:

  (fn [data] (map first data))   first item of every tuple
  (fn [data] (count data))       number of tuples
  (fn [data] (take 3 data))      first 3 tuples

Anything else leaves the results unchanged:

  my-view                        named function, not resolved
  :table  "list"                 display tags
  (fn [data] (sort data))        unsupported body, logged as a warning
  #(take 3 %)                    shorthand functions are not matched

  Order:
    :result-transform always runs before :view.

  Try it:
    advq compile '(fn [data] (take 3 data))'
"#;

const OUTPUT_DOC: &str = r#"OUTPUT - Printed Results

A document with only :query prints the raw tuples:

  [
    ["block1", "content1"]
  ]

Any other document prints the full structure:

  {
    "results": [...],          after :result-transform and :view
    "metadata": {
      "title": "Example",
      "collapsed": false,
      "hasView": true,
      "hasResultTransform": false,
      "hasInputs": false,
      "queryComponents": ["title", "query", "view"]
    },
    "rawResults": [...]        as returned by the database
  }

  Config (--config file.toml):
    default_title = "Advanced Query"
    output = "auto"            auto | full | results
    pretty = true              --compact sets this to false
"#;

const ERRORS_DOC: &str = r#"ERRORS - Failures and Fallbacks

These stop the run and print an error instead of results:

  malformed query            input is not an EDN map
  no :query component        the database is never contacted
  database query failed      the database rejected or failed the query

These never stop the run:

  an unsupported or broken :view / :result-transform
    The stage keeps its input and a warning is logged (use --verbose).
"#;
