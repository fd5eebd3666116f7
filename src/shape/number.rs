//! Number shape.
//!
//! This module provides [`NumberShape`] for validating finite or infinite
//! numbers with bounds, sign, integrality, and divisibility constraints.

use crate::coerce;
use crate::error::{codes, Issue, IssueParam, ShapeError};
use crate::operation::Operation;
use crate::options::ApplyOptions;
use crate::types::{Kind, TypeAtom};
use crate::value::{format_number, Value};

use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};

/// A shape accepting numbers other than NaN.
///
/// Each constraint is a keyed operation, so calling the same builder twice
/// replaces the earlier limit instead of adding a second check.
///
/// # Example
///
/// ```rust
/// use verdict::{Shape, ShapeLike, Value};
///
/// let schema = Shape::number().range(1.0, 100.0).integer();
///
/// assert!(schema.parse(&Value::from(50)).is_ok());
/// assert!(schema.parse(&Value::from(150)).is_err());
/// assert!(schema.parse(&Value::Number(1.5)).is_err());
/// assert!(schema.parse(&Value::Number(f64::NAN)).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct NumberShape {
    core: ShapeCore,
}

impl NumberShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number must be at least `limit`.
    pub fn min(self, limit: f64) -> Self {
        self.add_operation(bound(
            "min",
            codes::MIN_VALUE,
            limit,
            |n, limit| n >= limit,
            format!("must be at least {}", format_number(limit)),
        ))
    }

    /// The number must be at most `limit`.
    pub fn max(self, limit: f64) -> Self {
        self.add_operation(bound(
            "max",
            codes::MAX_VALUE,
            limit,
            |n, limit| n <= limit,
            format!("must be at most {}", format_number(limit)),
        ))
    }

    /// The number must be greater than `limit`.
    pub fn gt(self, limit: f64) -> Self {
        self.add_operation(bound(
            "gt",
            codes::GREATER_THAN,
            limit,
            |n, limit| n > limit,
            format!("must be greater than {}", format_number(limit)),
        ))
    }

    /// The number must be less than `limit`.
    pub fn lt(self, limit: f64) -> Self {
        self.add_operation(bound(
            "lt",
            codes::LESS_THAN,
            limit,
            |n, limit| n < limit,
            format!("must be less than {}", format_number(limit)),
        ))
    }

    /// Equivalent to `.min(min).max(max)`.
    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    pub fn positive(self) -> Self {
        self.add_operation(bound(
            "positive",
            codes::POSITIVE,
            0.0,
            |n, zero| n > zero,
            "must be positive".to_string(),
        ))
    }

    pub fn non_negative(self) -> Self {
        self.add_operation(bound(
            "non_negative",
            codes::NON_NEGATIVE,
            0.0,
            |n, zero| n >= zero,
            "must be non-negative".to_string(),
        ))
    }

    pub fn negative(self) -> Self {
        self.add_operation(bound(
            "negative",
            codes::NEGATIVE,
            0.0,
            |n, zero| n < zero,
            "must be negative".to_string(),
        ))
    }

    /// The number must have no fractional part.
    pub fn integer(self) -> Self {
        self.add_operation(
            Operation::check(|value, _, _| match value.as_f64() {
                Some(n) if n.fract() != 0.0 => Ok(vec![Issue::new(
                    codes::INTEGER,
                    value.clone(),
                    "must be an integer",
                )]),
                _ => Ok(Vec::new()),
            })
            .with_key("integer"),
        )
    }

    /// The number must be an integral multiple of `divisor`.
    ///
    /// The quotient is compared to its nearest integer with a relative
    /// tolerance, so `0.3` is a multiple of `0.1`.
    pub fn multiple_of(self, divisor: f64) -> Self {
        self.add_operation(bound(
            "multiple_of",
            codes::MULTIPLE_OF,
            divisor,
            is_multiple,
            format!("must be a multiple of {}", format_number(divisor)),
        ))
    }
}

fn is_multiple(n: f64, divisor: f64) -> bool {
    if divisor == 0.0 {
        return false;
    }
    let quotient = n / divisor;
    (quotient - quotient.round()).abs() <= f64::EPSILON * quotient.abs().max(1.0) * 4.0
}

fn bound(
    key: &'static str,
    code: &'static str,
    limit: f64,
    passes: fn(f64, f64) -> bool,
    message: String,
) -> Operation {
    Operation::check(move |value, _, _| match value.as_f64() {
        Some(n) if !passes(n, limit) => Ok(vec![Issue::new(code, value.clone(), message.clone())
            .with_param(IssueParam::Value(Value::Number(limit)))]),
        _ => Ok(Vec::new()),
    })
    .with_key(key)
    .with_param(limit)
}

fn is_number(value: &Value) -> bool {
    matches!(value, Value::Number(n) if !n.is_nan())
}

impl ShapeLike for NumberShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Number)]
    }

    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        coerce::number_inputs()
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        let coercing = self.is_coercing_for(options);
        Ok(
            match coerce::prepare(input, coercing, is_number, coerce::to_number) {
                Some(value) => Structure::accepted(value),
                None => Structure::rejected(self.core.type_issue(input, Kind::Number)),
            },
        )
    }
}
