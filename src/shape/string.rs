//! String shape.
//!
//! This module provides [`StringShape`] for validating string values with
//! length and regex pattern constraints.

use regex::Regex;

use crate::coerce;
use crate::error::{codes, Issue, IssueParam, ShapeError};
use crate::operation::Operation;
use crate::options::ApplyOptions;
use crate::types::{Kind, TypeAtom};
use crate::value::Value;

use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};

/// A shape accepting strings.
///
/// Length limits count Unicode scalar values. Pattern checks are unsafe
/// operations: every violated pattern is reported, even in early-return mode.
///
/// # Example
///
/// ```rust
/// use verdict::{Shape, ShapeLike, Value};
///
/// let schema = Shape::string()
///     .min_len(3)
///     .pattern(r"^[a-z]+$")
///     .unwrap()
///     .pattern(r"x")
///     .unwrap();
///
/// let issues = schema.parse(&Value::from("AB")).unwrap_err();
/// // too short, and both patterns fail
/// assert_eq!(issues.issues().unwrap().len(), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct StringShape {
    core: ShapeCore,
}

impl StringShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a minimum length constraint.
    ///
    /// # Example
    ///
    /// ```rust
    /// use verdict::{Shape, ShapeLike, Value};
    ///
    /// let schema = Shape::string().min_len(5);
    ///
    /// assert!(schema.parse(&Value::from("hello")).is_ok());
    /// assert!(schema.parse(&Value::from("hi")).is_err());
    /// ```
    pub fn min_len(self, min: usize) -> Self {
        self.add_operation(length(
            "min_len",
            codes::MIN_LENGTH,
            min,
            |len, min| len >= min,
            format!("must be at least {} characters", min),
        ))
    }

    /// Adds a maximum length constraint.
    pub fn max_len(self, max: usize) -> Self {
        self.add_operation(length(
            "max_len",
            codes::MAX_LENGTH,
            max,
            |len, max| len <= max,
            format!("must be at most {} characters", max),
        ))
    }

    /// Adds a regex the string must match.
    ///
    /// Returns an error if the pattern does not compile. Adding the same
    /// pattern twice keeps one check.
    pub fn pattern(self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        let message = format!("must match pattern {}", pattern);

        let operation = Operation::check(move |value, _, _| match value.as_str() {
            Some(s) if !regex.is_match(s) => Ok(vec![Issue::new(
                codes::PATTERN,
                value.clone(),
                message.clone(),
            )
            .with_param(IssueParam::Value(Value::from(regex.as_str())))]),
            _ => Ok(Vec::new()),
        })
        .with_key(format!("pattern:{}", pattern))
        .with_param(pattern)
        .with_unsafe(true);

        Ok(self.add_operation(operation))
    }
}

fn length(
    key: &'static str,
    code: &'static str,
    limit: usize,
    passes: fn(usize, usize) -> bool,
    message: String,
) -> Operation {
    Operation::check(move |value, _, _| match value.as_str() {
        Some(s) if !passes(s.chars().count(), limit) => {
            Ok(vec![Issue::new(code, value.clone(), message.clone())
                .with_param(IssueParam::Value(Value::Number(limit as f64)))])
        }
        _ => Ok(Vec::new()),
    })
    .with_key(key)
    .with_param(Value::Number(limit as f64))
}

impl ShapeLike for StringShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::String)]
    }

    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        coerce::string_inputs()
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        let coercing = self.is_coercing_for(options);
        Ok(
            match coerce::prepare(
                input,
                coercing,
                |v| matches!(v, Value::String(_)),
                coerce::to_string,
            ) {
                Some(value) => Structure::accepted(value),
                None => Structure::rejected(self.core.type_issue(input, Kind::String)),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseError;

    fn codes_of(result: Result<Value, ParseError>) -> Vec<String> {
        match result {
            Err(ParseError::Invalid(issues)) => issues.into_iter().map(|i| i.code).collect(),
            other => panic!("expected issues, got {:?}", other),
        }
    }

    #[test]
    fn test_length_counts_chars() {
        let shape = StringShape::new().min_len(2).max_len(3);
        assert!(shape.parse(&Value::from("日本")).is_ok());
        assert_eq!(codes_of(shape.parse(&Value::from("a"))), vec![codes::MIN_LENGTH]);
        assert_eq!(codes_of(shape.parse(&Value::from("abcd"))), vec![codes::MAX_LENGTH]);
    }

    #[test]
    fn test_patterns_are_unsafe() {
        let shape = StringShape::new()
            .min_len(5)
            .pattern("^a")
            .unwrap()
            .pattern("z$")
            .unwrap();

        assert_eq!(
            codes_of(shape.parse(&Value::from("bc"))),
            vec![codes::MIN_LENGTH, codes::PATTERN, codes::PATTERN]
        );
    }

    #[test]
    fn test_same_pattern_is_deduplicated() {
        let shape = StringShape::new()
            .pattern("^a")
            .unwrap()
            .pattern("^a")
            .unwrap();
        assert_eq!(shape.core().pipeline().len(), 1);
    }

    #[test]
    fn test_invalid_regex() {
        assert!(StringShape::new().pattern("(").is_err());
    }

    #[test]
    fn test_type_issue_message_override() {
        let shape = StringShape::new().error("name must be text");
        match shape.parse(&Value::from(1)) {
            Err(ParseError::Invalid(issues)) => {
                assert_eq!(issues.first().message, "name must be text")
            }
            other => panic!("expected issues, got {:?}", other),
        }
    }

    #[test]
    fn test_coercion() {
        let shape = StringShape::new().coerce();
        assert_eq!(shape.parse(&Value::from(12)).unwrap(), Value::from("12"));
        assert_eq!(
            shape.parse(&Value::Array(vec![Value::Bool(true)])).unwrap(),
            Value::from("true")
        );
        assert!(shape.parse(&Value::Null).is_err());
    }
}
