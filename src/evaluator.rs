use std::{fmt, sync::OnceLock};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    parser::parse_str,
    transform::{BodyMatch, Transform, classify_body},
    value::Value,
};

/// Grammar of a bare symbol reference such as `my-view`.
const IDENTIFIER_PATTERN: &str = r"^[a-zA-Z\-_][a-zA-Z0-9\-_]*$";

/// Internal faults of the evaluator.
///
/// Unsupported expressions are not errors: they evaluate to
/// [`Transform::Identity`] and log a warning.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("evaluator failed to initialize: {0}")]
    Initialization(#[source] regex::Error),
}

/// Which pipeline stage an expression belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResultTransform,
    View,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ResultTransform => write!(f, "result-transform"),
            Stage::View => write!(f, "view"),
        }
    }
}

/// Result of running one stage.
///
/// A stage never fails the pipeline: when the expression cannot be evaluated
/// the stage is `Degraded` and carries the data it was given.
#[derive(Debug)]
pub enum StageOutcome {
    Applied { value: Value, transform: Transform },
    Degraded { value: Value, error: EvalError },
}

impl StageOutcome {
    pub fn into_value(self) -> Value {
        match self {
            StageOutcome::Applied { value, .. } | StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            StageOutcome::Applied { value, .. } | StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }
}

/// Turns view and result-transform expressions into [`Transform`]s.
///
/// This is a pattern matcher over a handful of known function shapes, not an
/// interpreter. See [`Evaluator::evaluate`] for the accepted forms.
#[derive(Debug)]
pub struct Evaluator {
    pattern: &'static str,
    identifier: OnceLock<Regex>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator {
            pattern: IDENTIFIER_PATTERN,
            identifier: OnceLock::new(),
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares the evaluator. Calling it again is a no-op.
    ///
    /// [`Evaluator::evaluate`] and [`Evaluator::compile`] call this themselves.
    pub fn initialize(&self) -> Result<(), EvalError> {
        self.identifier_grammar().map(|_| ())
    }

    fn identifier_grammar(&self) -> Result<&Regex, EvalError> {
        if let Some(regex) = self.identifier.get() {
            return Ok(regex);
        }
        let regex = Regex::new(self.pattern).map_err(EvalError::Initialization)?;
        debug!("expression evaluator initialized");
        Ok(self.identifier.get_or_init(|| regex))
    }

    /// Evaluates an expression into a transform.
    ///
    /// - A bare symbol (`my-view`) or keyword (`:table`) is a reference to a
    ///   named function that cannot be resolved here, and yields
    ///   [`Transform::Identity`].
    /// - A single-parameter function `(fn [data] body)` is matched against
    ///   the known body shapes (see [`classify_body`]). An unknown body yields
    ///   [`Transform::Identity`] and a warning.
    /// - Anything else, including text that does not read at all, yields
    ///   [`Transform::Identity`] and a warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use advq::{Evaluator, transform::Transform};
    ///
    /// let evaluator = Evaluator::new();
    /// assert_eq!(evaluator.evaluate("(fn [data] (take 3 data))").unwrap(), Transform::Take(3));
    /// assert_eq!(evaluator.evaluate(":table").unwrap(), Transform::Identity);
    /// ```
    pub fn evaluate(&self, expression: &str) -> Result<Transform, EvalError> {
        let identifier = self.identifier_grammar()?;
        let code = expression.trim();

        if code.starts_with(':') || identifier.is_match(code) {
            debug!(expression = code, "symbolic reference, using identity");
            return Ok(Transform::Identity);
        }

        let Some(body) = function_body(code) else {
            warn!(expression = code, "expression is not a supported function form, using identity");
            return Ok(Transform::Identity);
        };

        match classify_body(&body) {
            BodyMatch::Matched(transform) => {
                debug!(expression = code, transform = %transform.describe(), "matched function pattern");
                Ok(transform)
            }
            BodyMatch::Unsupported => {
                warn!(expression = code, "unsupported function pattern, using identity");
                Ok(Transform::Identity)
            }
        }
    }

    /// Describes how an expression would be evaluated, for debugging.
    ///
    /// Not used by the pipeline itself.
    pub fn compile(&self, expression: &str) -> Result<String, EvalError> {
        let transform = self.evaluate(expression)?;
        Ok(format!(
            ";; compiled transform: {}\n{}",
            transform.describe(),
            expression.trim()
        ))
    }

    /// Evaluates `expression` and applies it to `data`.
    ///
    /// Any evaluation error is logged and the original `data` is kept.
    pub fn apply_stage(&self, stage: Stage, expression: &str, data: Value) -> StageOutcome {
        match self.evaluate(expression) {
            Ok(transform) => StageOutcome::Applied {
                value: transform.apply(data),
                transform,
            },
            Err(error) => {
                warn!(%stage, %error, "stage failed, keeping previous results");
                StageOutcome::Degraded { value: data, error }
            }
        }
    }
}

/// Body forms of `(fn [param] body...)`, if `code` reads as exactly that.
fn function_body(code: &str) -> Option<Vec<Value>> {
    let Value::List(mut items) = parse_str(code).ok()? else {
        return None;
    };
    if items.len() < 3 || items[0].as_symbol() != Some("fn") {
        return None;
    }
    match &items[1] {
        Value::Vector(params) if params.len() == 1 && params[0].as_symbol().is_some() => {}
        _ => return None,
    }
    Some(items.split_off(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broken_evaluator() -> Evaluator {
        Evaluator {
            pattern: "[unclosed",
            identifier: OnceLock::new(),
        }
    }

    #[test]
    fn initialization_failure_is_reported() {
        let evaluator = broken_evaluator();
        assert!(matches!(
            evaluator.initialize(),
            Err(EvalError::Initialization(_))
        ));
        assert!(evaluator.compile("(fn [d] (count d))").is_err());
    }

    #[test]
    fn degraded_stage_keeps_its_input() {
        let data = Value::Vector(vec![Value::Integer(1), Value::Integer(2)]);
        let outcome =
            broken_evaluator().apply_stage(Stage::View, "(fn [d] (count d))", data.clone());
        assert!(outcome.is_degraded());
        assert!(matches!(
            outcome,
            StageOutcome::Degraded { error: EvalError::Initialization(_), .. }
        ));
        assert_eq!(outcome.into_value(), data);
    }

    #[test]
    fn initialize_is_idempotent() {
        let evaluator = Evaluator::new();
        evaluator.initialize().unwrap();
        evaluator.initialize().unwrap();
        assert_eq!(evaluator.evaluate("my-view").unwrap(), Transform::Identity);
    }

    #[test]
    fn two_parameter_functions_are_not_recognised() {
        let evaluator = Evaluator::new();
        assert_eq!(
            evaluator.evaluate("(fn [a b] (count a))").unwrap(),
            Transform::Identity
        );
    }

    #[test]
    fn unreadable_text_becomes_identity() {
        let evaluator = Evaluator::new();
        assert_eq!(
            evaluator.evaluate("(fn [data] (map first data)").unwrap(),
            Transform::Identity
        );
    }
}
