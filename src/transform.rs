use crate::value::Value;

/// A result transformation recognised from a view or result-transform
/// expression.
///
/// Only a few shapes of user function are understood. Anything else becomes
/// [`Transform::Identity`], which hands its input back untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Returns the input unchanged
    ///
    /// # Examples
    /// ```text
    /// my-view
    /// :table
    /// (fn [data] (some-complex-operation data))
    /// ```
    Identity,

    /// Projects the first item of every tuple
    ///
    /// # Examples
    /// ```text
    /// (fn [data] (map first data))
    /// ```
    MapFirst,

    /// Number of tuples
    ///
    /// # Examples
    /// ```text
    /// (fn [data] (count data))
    /// ```
    Count,

    /// The first `n` tuples
    ///
    /// # Examples
    /// ```text
    /// (fn [data] (take 3 data))
    /// ```
    Take(usize),
}

impl Transform {
    /// Applies the transformation.
    ///
    /// Lists stay lists and vectors stay vectors. Input that is not a sequence
    /// passes through, except for [`Transform::Count`] which reports `1`.
    ///
    /// ```
    /// use advq::{transform::Transform, Value};
    ///
    /// let data = Value::Vector((1..=5).map(Value::Integer).collect());
    /// assert_eq!(Transform::Count.apply(data.clone()), Value::Integer(5));
    /// assert_eq!(
    ///     Transform::Take(2).apply(data),
    ///     Value::Vector(vec![Value::Integer(1), Value::Integer(2)])
    /// );
    /// ```
    pub fn apply(&self, data: Value) -> Value {
        match self {
            Transform::Identity => data,
            Transform::MapFirst => map_sequence(data, |items| {
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::List(inner) | Value::Vector(inner) => {
                            inner.into_iter().next().unwrap_or(Value::Nil)
                        }
                        other => other,
                    })
                    .collect()
            }),
            Transform::Count => match data.as_sequence() {
                Some(items) => Value::Integer(items.len() as i64),
                None => Value::Integer(1),
            },
            Transform::Take(n) => map_sequence(data, |items| items.into_iter().take(*n).collect()),
        }
    }

    /// Short name used in logs and diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Transform::Identity => "identity".to_string(),
            Transform::MapFirst => "map-first".to_string(),
            Transform::Count => "count".to_string(),
            Transform::Take(n) => format!("take {}", n),
        }
    }
}

/// Rebuilds a list or vector from `f(items)`; other values are returned as-is.
fn map_sequence(data: Value, f: impl FnOnce(Vec<Value>) -> Vec<Value>) -> Value {
    match data {
        Value::List(items) => Value::List(f(items)),
        Value::Vector(items) => Value::Vector(f(items)),
        other => other,
    }
}

/// Outcome of looking at the body of a `(fn [x] ...)` form.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyMatch {
    Matched(Transform),
    Unsupported,
}

/// Classifies a function body.
///
/// The known forms are checked in a fixed order and the first hit wins:
///
/// 1. `(map first ...)` anywhere in the body
/// 2. the symbol `count` anywhere in the body
/// 3. `(take n ...)` with a non-negative integer `n`
///
/// Matching works on read forms, so names that only appear inside string
/// literals or comments are never mistaken for calls.
pub fn classify_body(body: &[Value]) -> BodyMatch {
    if body.iter().any(contains_map_first) {
        return BodyMatch::Matched(Transform::MapFirst);
    }
    if body.iter().any(mentions_count) {
        return BodyMatch::Matched(Transform::Count);
    }
    match body.iter().find_map(find_take) {
        Some(n) => BodyMatch::Matched(Transform::Take(n)),
        None => BodyMatch::Unsupported,
    }
}

/// Sub-forms of a collection, keys and values included for maps.
fn children(form: &Value) -> Vec<&Value> {
    match form {
        Value::List(items) | Value::Vector(items) | Value::Set(items) | Value::AnonFn(items) => {
            items.iter().collect()
        }
        Value::Map(entries) => entries.iter().flat_map(|(k, v)| [k, v]).collect(),
        Value::Tagged(_, inner) => vec![inner.as_ref()],
        _ => Vec::new(),
    }
}

fn is_call_to<'a>(form: &'a Value, name: &str) -> Option<&'a [Value]> {
    match form {
        Value::List(items) if items.first().and_then(Value::as_symbol) == Some(name) => {
            Some(&items[1..])
        }
        _ => None,
    }
}

fn contains_map_first(form: &Value) -> bool {
    if let Some(args) = is_call_to(form, "map") {
        if args.first().and_then(Value::as_symbol) == Some("first") {
            return true;
        }
    }
    children(form).into_iter().any(contains_map_first)
}

fn mentions_count(form: &Value) -> bool {
    match form {
        Value::Symbol(name) => name == "count",
        other => children(other).into_iter().any(mentions_count),
    }
}

fn find_take(form: &Value) -> Option<usize> {
    if let Some(args) = is_call_to(form, "take") {
        let count = args.first().and_then(Value::as_int);
        if let Some(n) = count.and_then(|n| usize::try_from(n).ok()) {
            return Some(n);
        }
    }
    children(form).into_iter().find_map(find_take)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn body(text: &str) -> Vec<Value> {
        vec![parse_str(text).unwrap()]
    }

    #[test]
    fn map_first_wins_over_count() {
        assert_eq!(
            classify_body(&body("(map first (count data))")),
            BodyMatch::Matched(Transform::MapFirst)
        );
    }

    #[test]
    fn count_wins_over_take() {
        assert_eq!(
            classify_body(&body("(count (take 3 data))")),
            BodyMatch::Matched(Transform::Count)
        );
    }

    #[test]
    fn names_inside_strings_do_not_match() {
        assert_eq!(
            classify_body(&body(r#"(str "count" data)"#)),
            BodyMatch::Unsupported
        );
    }

    #[test]
    fn negative_take_is_unsupported() {
        assert_eq!(classify_body(&body("(take -1 data)")), BodyMatch::Unsupported);
    }

    #[test]
    fn map_first_keeps_non_tuples() {
        let data = Value::Vector(vec![
            Value::Vector(vec![Value::string("a"), Value::Integer(1)]),
            Value::string("loose"),
            Value::Vector(vec![]),
        ]);
        assert_eq!(
            Transform::MapFirst.apply(data),
            Value::Vector(vec![Value::string("a"), Value::string("loose"), Value::Nil])
        );
    }

    #[test]
    fn non_sequences_pass_through() {
        let data = Value::string("scalar");
        assert_eq!(Transform::MapFirst.apply(data.clone()), data);
        assert_eq!(Transform::Take(2).apply(data.clone()), data);
        assert_eq!(Transform::Count.apply(data), Value::Integer(1));
    }
}
