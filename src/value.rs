use rust_decimal::Decimal;

/// A data value read from EDN or returned by the database.
///
/// The same type describes the parsed query document, the query expression
/// handed to the database, and the result tuples flowing through the
/// transform stages.
///
/// # Ordering
///
/// Maps and sets keep the order in which their entries were read, so a value
/// printed back with [`crate::output::to_edn`] reproduces the source layout.
///
/// # Examples
///
/// ```
/// use advq::Value;
///
/// let tuple = Value::Vector(vec![
///     Value::String("block1".to_string()),
///     Value::String("content1".to_string()),
/// ]);
/// assert_eq!(tuple.as_sequence().map(|items| items.len()), Some(2));
///
/// let tag = Value::keyword("block/refs");
/// assert_eq!(tag, Value::Keyword("block/refs".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `nil`
    Nil,

    /// `true` / `false`
    Boolean(bool),

    /// Integer number (`42`, `-7`, `12N`)
    Integer(i64),

    /// Floating-point number (`3.5`, `1e3`)
    Float(f64),

    /// Arbitrary-precision decimal (`1.50M`)
    Decimal(Decimal),

    /// UTF-8 string
    String(String),

    /// Character literal (`\a`, `\newline`)
    Char(char),

    /// Symbol such as `?b`, `first`, or `my.ns/fn-name`
    Symbol(String),

    /// Keyword, stored without its leading colon (`:block/refs` → `block/refs`)
    Keyword(String),

    /// `( ... )`
    List(Vec<Value>),

    /// `[ ... ]`
    Vector(Vec<Value>),

    /// `{ ... }`, entries in source order
    Map(Vec<(Value, Value)>),

    /// `#{ ... }`, elements in source order
    Set(Vec<Value>),

    /// Tagged literal such as `#inst "2024-01-01"`
    Tagged(String, Box<Value>),

    /// Anonymous function literal `#( ... )`, kept as its body forms
    AnonFn(Vec<Value>),

    /// Regex literal `#"..."`, pattern text as written
    Regex(String),
}

impl Value {
    pub fn keyword(name: impl Into<String>) -> Self {
        Value::Keyword(name.into())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Truthiness as the query dialect sees it: only `nil` and `false` are falsey.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    /// Elements of a list or vector.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Vector(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_sequence(&self) -> bool {
        self.as_sequence().is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Look up a map entry by keyword name.
    pub fn get_keyword(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, Value::Keyword(kw) if kw == name))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Human-readable type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Char(_) => "char",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::List(_) => "list",
            Value::Vector(_) => "vector",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Tagged(..) => "tagged",
            Value::AnonFn(_) => "function",
            Value::Regex(_) => "regex",
        }
    }
}
