//! Arbitrary-size integer shape.

use crate::coerce;
use crate::error::{codes, Issue, IssueParam, ShapeError};
use crate::operation::Operation;
use crate::options::ApplyOptions;
use crate::types::{Kind, TypeAtom};
use crate::value::Value;

use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};

/// A shape accepting big integers.
///
/// # Example
///
/// ```rust
/// use verdict::{Shape, ShapeLike, Value};
///
/// let schema = Shape::bigint().min(0).coerce();
///
/// assert_eq!(schema.parse(&Value::from("12")).unwrap(), Value::BigInt(12));
/// assert!(schema.parse(&Value::BigInt(-1)).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct BigIntShape {
    core: ShapeCore,
}

impl BigIntShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(self, limit: i128) -> Self {
        self.add_operation(bound(
            "min",
            codes::MIN_VALUE,
            limit,
            |n, limit| n >= limit,
            format!("must be at least {}", limit),
        ))
    }

    pub fn max(self, limit: i128) -> Self {
        self.add_operation(bound(
            "max",
            codes::MAX_VALUE,
            limit,
            |n, limit| n <= limit,
            format!("must be at most {}", limit),
        ))
    }
}

fn bound(
    key: &'static str,
    code: &'static str,
    limit: i128,
    passes: fn(i128, i128) -> bool,
    message: String,
) -> Operation {
    Operation::check(move |value, _, _| match value {
        Value::BigInt(n) if !passes(*n, limit) => {
            Ok(vec![Issue::new(code, value.clone(), message.clone())
                .with_param(IssueParam::Value(Value::BigInt(limit)))])
        }
        _ => Ok(Vec::new()),
    })
    .with_key(key)
    .with_param(limit)
}

impl ShapeLike for BigIntShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::BigInt)]
    }

    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        coerce::bigint_inputs()
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
                |v| matches!(v, Value::BigInt(_)),
                coerce::to_bigint,
            ) {
                Some(value) => Structure::accepted(value),
                None => Structure::rejected(self.core.type_issue(input, Kind::BigInt)),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_are_not_bigints() {
        let shape = BigIntShape::new();
        assert!(shape.parse(&Value::BigInt(1)).is_ok());
        assert!(shape.parse(&Value::from(1)).is_err());
    }

    #[test]
    fn test_bounds() {
        let shape = BigIntShape::new().min(-5).max(5);
        assert!(shape.parse(&Value::BigInt(5)).is_ok());
        let issues = shape.parse(&Value::BigInt(6)).unwrap_err();
        assert_eq!(issues.issues().unwrap().first().code, codes::MAX_VALUE);
    }
}
