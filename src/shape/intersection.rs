//! Intersection shape.

use std::borrow::Cow;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use stillwater::Validation;

use crate::error::{codes, Issue, Issues, ShapeError};
use crate::options::ApplyOptions;
use crate::types::{distribute_types, intersect_values, TypeAtom};
use crate::value::Value;

use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};
use super::AnyShape;

/// A shape accepting a value only if every member accepts it.
///
/// Members are applied to the same input in declaration order. If every
/// member returns the input unchanged, so does the intersection. Otherwise
/// the member outputs are merged with [`intersect_values`], and outputs that
/// cannot be merged raise a single `invalid_intersection` issue.
///
/// # Example
///
/// ```rust
/// use verdict::{IntoShape, Shape, ShapeLike, Value};
///
/// let both = Shape::intersection([
///     Shape::object().field("id", Shape::number()).into_shape(),
///     Shape::object().field("name", Shape::string()).into_shape(),
/// ]);
///
/// let input = Value::object([("id", Value::from(1)), ("name", Value::from("a"))]);
/// assert!(both.parse(&input).is_ok());
/// assert!(both.parse(&Value::object([("id", 1)])).is_err());
/// ```
#[derive(Clone)]
pub struct IntersectionShape {
    core: ShapeCore,
    members: Vec<AnyShape>,
}

impl IntersectionShape {
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = AnyShape>,
    {
        Self {
            core: ShapeCore::new(),
            members: members.into_iter().collect(),
        }
    }

    pub fn members(&self) -> &[AnyShape] {
        &self.members
    }

    /// Merges the accepted outputs of every member.
    fn merge<'a>(&self, input: &'a Value, outputs: Vec<Cow<'a, Value>>) -> Structure<'a> {
        if outputs.iter().all(|output| matches!(output, Cow::Borrowed(_))) {
            return Structure::accepted(Cow::Borrowed(input));
        }

        let mut outputs = outputs.into_iter();
        let first = outputs.next().map_or_else(|| input.clone(), Cow::into_owned);
        let merged = outputs.try_fold(first, |acc, output| intersect_values(&acc, &output));

        match merged {
            Some(value) => Structure::accepted(Cow::Owned(value)),
            None => {
                let message = match self.core.type_message() {
                    Some(message) => message.to_string(),
                    None => "member outputs cannot be intersected".to_string(),
                };
                Structure::rejected(Issue::new(
                    codes::INVALID_INTERSECTION,
                    input.clone(),
                    message,
                ))
            }
        }
    }
}

/// Sorts member results into outputs and issues. Returns false once the
/// remaining members need not run.
fn collect<'a>(
    result: crate::ValidationResult<Cow<'a, Value>>,
    outputs: &mut Vec<Cow<'a, Value>>,
    issues: &mut Vec<Issue>,
    options: &ApplyOptions,
) -> bool {
    match result {
        Validation::Success(value) => {
            outputs.push(value);
            true
        }
        Validation::Failure(failure) => {
            issues.extend(failure);
            options.verbose
        }
    }
}

impl ShapeLike for IntersectionShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        distribute_types(self.members.iter().map(|member| member.input_types().to_vec()))
    }

    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        let coercing = ApplyOptions::new().with_coerce(true);
        distribute_types(
            self.members
                .iter()
                .map(|member| member.input_types_for(&coercing).to_vec()),
        )
    }

    fn has_async_children(&self) -> bool {
        self.members.iter().any(|member| member.is_async())
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        let mut outputs = Vec::with_capacity(self.members.len());
        let mut issues = Vec::new();

        for member in &self.members {
            let result = member.apply(input, options)?;
            if !collect(result, &mut outputs, &mut issues, options) {
                break;
            }
        }

        Ok(match Issues::from_vec(issues) {
            Some(issues) => Structure::Rejected(issues),
            None => self.merge(input, outputs),
        })
    }

    fn apply_structure_async<'a>(
        &'a self,
        input: &'a Value,
        options: ApplyOptions,
    ) -> BoxFuture<'a, Result<Structure<'a>, ShapeError>> {
        async move {
            let mut outputs = Vec::with_capacity(self.members.len());
            let mut issues = Vec::new();

            for member in &self.members {
                let result = member.apply_async(input, options).await?;
                if !collect(result, &mut outputs, &mut issues, &options) {
                    break;
                }
            }

            Ok(match Issues::from_vec(issues) {
                Some(issues) => Structure::Rejected(issues),
                None => self.merge(input, outputs),
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{IntoShape, Shape};
    use crate::types::Kind;

    #[test]
    fn test_input_types_follow_distribution() {
        let shape = Shape::intersection([
            Shape::union([Shape::number().into_shape(), Shape::string().into_shape()])
                .into_shape(),
            Shape::union([
                Shape::number().into_shape(),
                Shape::string().into_shape(),
                Shape::boolean().into_shape(),
            ])
            .into_shape(),
        ]);
        assert_eq!(
            &*shape.input_types(),
            &[TypeAtom::Kind(Kind::Number), TypeAtom::Kind(Kind::String)]
        );
    }

    #[test]
    fn test_unchanged_outputs_return_input() {
        let shape = Shape::intersection([
            Shape::number().min(1.0).into_shape(),
            Shape::number().max(10.0).into_shape(),
        ]);
        let input = Value::from(5);
        let result = shape.apply(&input, &ApplyOptions::default()).unwrap();
        assert!(matches!(result, Validation::Success(Cow::Borrowed(_))));
    }

    #[test]
    fn test_early_return_stops_at_first_failing_member() {
        let shape = Shape::intersection([
            Shape::number().min(10.0).into_shape(),
            Shape::number().max(0.0).into_shape(),
        ]);

        let issues = shape.parse(&Value::from(5)).unwrap_err();
        assert_eq!(issues.issues().unwrap().len(), 1);

        let issues = shape
            .parse_with(&Value::from(5), &ApplyOptions::verbose())
            .unwrap_err();
        let found: Vec<_> = issues
            .issues()
            .unwrap()
            .iter()
            .map(|i| i.code.as_str())
            .collect();
        assert_eq!(found, vec![codes::MIN_VALUE, codes::MAX_VALUE]);
    }

    #[test]
    fn test_transformed_outputs_are_merged() {
        let shape = Shape::intersection([
            Shape::object()
                .field("a", Shape::number().coerce())
                .strip()
                .into_shape(),
            Shape::object().field("b", Shape::string()).strip().into_shape(),
        ]);
        let input = Value::object([("a", Value::from("1")), ("b", Value::from("x"))]);

        assert_eq!(
            shape.parse(&input).unwrap(),
            Value::object([("a", Value::from(1)), ("b", Value::from("x"))])
        );
    }

    #[test]
    fn test_incompatible_outputs() {
        let shape = Shape::intersection([
            Shape::number().alter(|_| Value::from(1)).into_shape(),
            Shape::number().alter(|_| Value::from(2)).into_shape(),
        ]);

        let issues = shape.parse(&Value::from(0)).unwrap_err();
        let issue = issues.issues().unwrap().first();
        assert_eq!(issue.code, codes::INVALID_INTERSECTION);
        assert_eq!(issue.input, Value::from(0));
    }

    #[test]
    fn test_empty_intersection_accepts_anything() {
        let shape = Shape::intersection(Vec::<AnyShape>::new());
        assert!(shape.parse(&Value::Null).is_ok());
        assert_eq!(&*shape.input_types(), &[TypeAtom::Kind(Kind::Unknown)]);
    }
}
