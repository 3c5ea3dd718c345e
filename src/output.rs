//! Text serialization for [`Value`]s.
//!
//! Two output notations are supported:
//!
//! - **EDN** via [`to_edn()`]: the canonical compact form used to hand the
//!   `:query` expression to the database and view/transform expressions to the
//!   evaluator. Reading the output back yields an equal value.
//! - **JSON** via [`to_json()`] and [`to_json_pretty()`]: what the pipeline
//!   shows to the user. Pretty output uses 2-space indentation and keeps map
//!   entries in insertion order, so the same input always prints the same way.
//!
//! # JSON mapping
//!
//! JSON has fewer types than EDN, so some values are folded:
//!
//! | EDN                  | JSON                                 |
//! |----------------------|--------------------------------------|
//! | `nil`                | `null`                               |
//! | `:kw` (value)        | `":kw"`                              |
//! | `:kw` (map key)      | `"kw"`                               |
//! | `sym`                | `"sym"`                              |
//! | `\c`                 | `"c"`                                |
//! | `1.5M`               | `1.5`                                |
//! | lists, vectors, sets | arrays                               |
//! | `#tag form`          | the form, tag dropped                |
//! | `#(f %)`             | `"#(f %)"`                           |
//! | `#"re"`              | `"re"`                               |
//!
//! # Examples
//!
//! ```
//! use advq::Value;
//! use advq::output::{to_edn, to_json};
//!
//! let query = Value::Vector(vec![Value::keyword("find"), Value::symbol("?b")]);
//! assert_eq!(to_edn(&query), "[:find ?b]");
//! assert_eq!(to_json(&query), r#"[":find","?b"]"#);
//! ```

use crate::value::Value;

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Nil => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) if n.is_finite() => format!("{:?}", n),
            Value::Float(_) => "null".to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::String(s) => format!("\"{}\"", escape_json(s)),
            Value::Char(c) => format!("\"{}\"", escape_json(&c.to_string())),
            Value::Symbol(s) => format!("\"{}\"", escape_json(s)),
            Value::Keyword(k) => format!("\":{}\"", escape_json(k)),
            Value::List(items) | Value::Vector(items) | Value::Set(items) => {
                self.print_array(items, indent)
            }
            Value::AnonFn(_) => format!("\"{}\"", escape_json(&to_edn(value))),
            Value::Regex(pattern) => format!("\"{}\"", escape_json(pattern)),
            Value::Map(entries) => self.print_object(entries, indent),
            Value::Tagged(_, inner) => self.print_value(inner, indent),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        if self.pretty {
            let mut result = "[\n".to_string();
            let items: Vec<String> = arr
                .iter()
                .map(|v| {
                    format!(
                        "{}{}",
                        self.indent(indent + 1),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&items.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push(']');
            result
        } else {
            let items: Vec<String> = arr.iter().map(|v| self.print_value(v, indent)).collect();
            format!("[{}]", items.join(","))
        }
    }

    fn print_object(&self, entries: &[(Value, Value)], indent: usize) -> String {
        if entries.is_empty() {
            return "{}".to_string();
        }

        if self.pretty {
            let mut result = "{\n".to_string();
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}\"{}\": {}",
                        self.indent(indent + 1),
                        escape_json(&json_key(k)),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&items.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push('}');
            result
        } else {
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| {
                    format!(
                        "\"{}\":{}",
                        escape_json(&json_key(k)),
                        self.print_value(v, indent)
                    )
                })
                .collect();
            format!("{{{}}}", items.join(","))
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

/// Object key text for a map key.
fn json_key(key: &Value) -> String {
    match key {
        Value::String(s) | Value::Keyword(s) | Value::Symbol(s) => s.clone(),
        other => to_edn(other),
    }
}

fn escape_json(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            '\n' => vec!['\\', 'n'],
            '\r' => vec!['\\', 'r'],
            '\t' => vec!['\\', 't'],
            c if c.is_control() => format!("\\u{:04x}", c as u32).chars().collect(),
            c => vec![c],
        })
        .collect()
}

fn escape_edn(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn edn_char(c: char) -> String {
    match c {
        '\n' => "\\newline".to_string(),
        ' ' => "\\space".to_string(),
        '\t' => "\\tab".to_string(),
        '\r' => "\\return".to_string(),
        '\u{c}' => "\\formfeed".to_string(),
        '\u{8}' => "\\backspace".to_string(),
        c if c.is_control() => format!("\\u{:04x}", c as u32),
        c => format!("\\{}", c),
    }
}

fn edn_float(n: f64) -> String {
    if n.is_nan() {
        "##NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "##Inf" } else { "##-Inf" }.to_string()
    } else {
        // Debug keeps a fractional part or exponent, so the text reads back as a float.
        format!("{:?}", n)
    }
}

fn edn_join(items: &[Value]) -> String {
    items.iter().map(to_edn).collect::<Vec<_>>().join(" ")
}

/// Converts a Value to compact EDN text.
///
/// Collections are separated by single spaces and map entries keep their
/// order, so a query read from the user is forwarded in the same shape it
/// was written:
///
/// ```
/// use advq::{output::to_edn, parser::parse_str};
///
/// let text = r#"[:find ?b :where [?b :block/refs #{"TODO"}]]"#;
/// assert_eq!(to_edn(&parse_str(text).unwrap()), text);
/// ```
pub fn to_edn(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => edn_float(*n),
        Value::Decimal(d) => format!("{}M", d),
        Value::String(s) => format!("\"{}\"", escape_edn(s)),
        Value::Char(c) => edn_char(*c),
        Value::Symbol(s) => s.clone(),
        Value::Keyword(k) => format!(":{}", k),
        Value::List(items) => format!("({})", edn_join(items)),
        Value::Vector(items) => format!("[{}]", edn_join(items)),
        Value::Set(items) => format!("#{{{}}}", edn_join(items)),
        Value::Map(entries) => {
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{} {}", to_edn(k), to_edn(v)))
                .collect();
            format!("{{{}}}", items.join(" "))
        }
        Value::Tagged(tag, inner) => format!("#{} {}", tag, to_edn(inner)),
        Value::AnonFn(items) => format!("#({})", edn_join(items)),
        Value::Regex(pattern) => format!("#\"{}\"", pattern),
    }
}

/// Converts a Value to compact JSON text.
///
/// - No indentation or extra whitespace
/// - Map entries keep insertion order
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to pretty-printed JSON text.
///
/// This is the format the pipeline returns for display:
///
/// ```
/// use advq::Value;
/// use advq::output::to_json_pretty;
///
/// let tuples = Value::Vector(vec![
///     Value::Vector(vec![Value::string("block1"), Value::string("content1")]),
/// ]);
/// assert_eq!(
///     to_json_pretty(&tuples),
///     "[\n  [\n    \"block1\",\n    \"content1\"\n  ]\n]"
/// );
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_keep_a_fraction_in_edn() {
        assert_eq!(to_edn(&Value::Float(1.0)), "1.0");
        assert_eq!(to_edn(&Value::Float(-2.5)), "-2.5");
        assert_eq!(to_edn(&Value::Float(f64::NAN)), "##NaN");
    }

    #[test]
    fn strings_are_escaped_in_both_notations() {
        let value = Value::string("say \"hi\"\n");
        assert_eq!(to_edn(&value), r#""say \"hi\"\n""#);
        assert_eq!(to_json(&value), r#""say \"hi\"\n""#);
    }

    #[test]
    fn keyword_keys_drop_the_colon_in_json() {
        let map = Value::Map(vec![
            (Value::keyword("id"), Value::Integer(1)),
            (Value::keyword("refs"), Value::Vector(vec![Value::string("TODO")])),
        ]);
        assert_eq!(to_json(&map), r#"{"id":1,"refs":["TODO"]}"#);
        assert_eq!(to_edn(&map), r#"{:id 1 :refs ["TODO"]}"#);
    }

    #[test]
    fn map_order_is_preserved() {
        let map = Value::Map(vec![
            (Value::string("zeta"), Value::Integer(1)),
            (Value::string("alpha"), Value::Integer(2)),
        ]);
        assert_eq!(to_json_pretty(&map), "{\n  \"zeta\": 1,\n  \"alpha\": 2\n}");
    }

    #[test]
    fn chars_and_tags_print_as_edn() {
        assert_eq!(to_edn(&Value::Char('\n')), "\\newline");
        assert_eq!(to_edn(&Value::Char('a')), "\\a");
        let inst = Value::Tagged("inst".to_string(), Box::new(Value::string("2024-01-01")));
        assert_eq!(to_edn(&inst), "#inst \"2024-01-01\"");
        assert_eq!(to_json(&inst), "\"2024-01-01\"");
    }
}
