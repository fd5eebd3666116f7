//! Array and tuple shapes.
//!
//! This module provides [`ArrayShape`], which validates positional head
//! elements and an optional rest element shape, plus container-level length
//! and uniqueness constraints.

use std::borrow::Cow;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::coerce;
use crate::error::{codes, Issue, IssueParam, Issues, ShapeError};
use crate::operation::Operation;
use crate::options::ApplyOptions;
use crate::path::PathSegment;
use crate::types::{Kind, TypeAtom};
use crate::value::Value;

use super::composite::{Collector, CopyOnWrite, Visit};
use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};
use super::AnyShape;

/// A shape for arrays and tuples.
///
/// Elements at positions covered by the head are checked by the matching
/// head shape. Remaining elements are checked by the rest shape; without one,
/// the array must have exactly as many elements as the head.
///
/// Length and uniqueness constraints are forced operations: they still report
/// when an element failed.
///
/// # Example
///
/// ```rust
/// use verdict::{ApplyOptions, Shape, ShapeLike, Value};
///
/// let schema = Shape::array(Shape::string().min_len(1)).min_len(3);
///
/// let input = Value::Array(vec![Value::from("a"), Value::from("")]);
/// let issues = schema
///     .parse_with(&input, &ApplyOptions::verbose())
///     .unwrap_err();
///
/// let issues = issues.issues().unwrap();
/// assert_eq!(issues.len(), 2);
/// assert_eq!(issues.first().path.to_string(), "[1]");
/// ```
#[derive(Clone)]
pub struct ArrayShape {
    core: ShapeCore,
    head: Vec<AnyShape>,
    rest: Option<AnyShape>,
}

impl ArrayShape {
    pub fn new(head: Vec<AnyShape>, rest: Option<AnyShape>) -> Self {
        Self {
            core: ShapeCore::new(),
            head,
            rest,
        }
    }

    /// Sets the shape for elements past the head.
    pub fn rest(mut self, shape: AnyShape) -> Self {
        self.rest = Some(shape);
        self.core.invalidate();
        self
    }

    pub fn head(&self) -> &[AnyShape] {
        &self.head
    }

    /// The array must have at least `min` elements.
    pub fn min_len(self, min: usize) -> Self {
        self.add_operation(length(
            "min_len",
            codes::MIN_LENGTH,
            min,
            |len, min| len >= min,
            format!("must have at least {} items", min),
        ))
    }

    /// The array must have at most `max` elements.
    pub fn max_len(self, max: usize) -> Self {
        self.add_operation(length(
            "max_len",
            codes::MAX_LENGTH,
            max,
            |len, max| len <= max,
            format!("must have at most {} items", max),
        ))
    }

    /// Equivalent to `.min_len(1)`.
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// No two elements may be equal. Reports each repeated element at its
    /// index.
    pub fn unique(self) -> Self {
        self.add_operation(
            Operation::check(|value, _, _| {
                let Some(items) = value.as_array() else {
                    return Ok(Vec::new());
                };
                Ok(items
                    .iter()
                    .enumerate()
                    .filter(|(index, item)| items[..*index].contains(*item))
                    .map(|(index, item)| {
                        Issue::new(codes::UNIQUE, item.clone(), "must be unique")
                            .prefixed(PathSegment::index(index))
                    })
                    .collect())
            })
            .with_key("unique")
            .with_force(true),
        )
    }

    fn item_shape(&self, index: usize) -> Option<&AnyShape> {
        self.head.get(index).or(self.rest.as_ref())
    }

    /// Type check, coercion and tuple length check.
    fn prepare<'a>(&self, input: &'a Value, options: &ApplyOptions) -> Result<Cow<'a, Value>, Issues> {
        let coercing = self.is_coercing_for(options);
        let value = coerce::prepare(
            input,
            coercing,
            |v| matches!(v, Value::Array(_)),
            coerce::to_array,
        )
        .ok_or_else(|| Issues::single(self.core.type_issue(input, Kind::Array)))?;

        let len = value.as_array().map_or(0, Vec::len);
        let fits = match self.rest {
            Some(_) => len >= self.head.len(),
            None => len == self.head.len(),
        };
        if !fits {
            let issue = Issue::new(
                codes::TUPLE_LENGTH,
                input.clone(),
                format!("must have {} items, got {}", self.head.len(), len),
            )
            .with_param(IssueParam::Value(Value::Number(self.head.len() as f64)));
            return Err(Issues::single(issue));
        }
        Ok(value)
    }
}

fn elements(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        _ => &[],
    }
}

fn length(
    key: &'static str,
    code: &'static str,
    limit: usize,
    passes: fn(usize, usize) -> bool,
    message: String,
) -> Operation {
    Operation::check(move |value, _, _| match value.as_array() {
        Some(items) if !passes(items.len(), limit) => {
            Ok(vec![Issue::new(code, value.clone(), message.clone())
                .with_param(IssueParam::Value(Value::Number(limit as f64)))])
        }
        _ => Ok(Vec::new()),
    })
    .with_key(key)
    .with_param(Value::Number(limit as f64))
    .with_force(true)
}

impl ShapeLike for ArrayShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Array)]
    }

    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Unknown)]
    }

    fn has_async_children(&self) -> bool {
        self.head.iter().chain(&self.rest).any(|shape| shape.is_async())
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        let base = match self.prepare(input, options) {
            Ok(base) => base,
            Err(issues) => return Ok(Structure::Rejected(issues)),
        };

        let mut collector = Collector::new(options);
        let rebuilt = {
            let items = elements(&base);
            let mut copy = CopyOnWrite::new(items);

            for (index, item) in items.iter().enumerate() {
                let Some(shape) = self.item_shape(index) else {
                    break;
                };
                let result = shape.apply(item, options)?;
                if let Visit::Changed(value) = collector.visit(result, || PathSegment::index(index))
                {
                    copy.set(index, value);
                }
                if collector.should_stop() {
                    break;
                }
            }
            copy.into_changed()
        };

        Ok(collector.finish(base, rebuilt.map(Value::Array)))
    }

    fn apply_structure_async<'a>(
        &'a self,
        input: &'a Value,
        options: ApplyOptions,
    ) -> BoxFuture<'a, Result<Structure<'a>, ShapeError>> {
        async move {
            let base = match self.prepare(input, &options) {
                Ok(base) => base,
                Err(issues) => return Ok(Structure::Rejected(issues)),
            };

            let mut collector = Collector::new(&options);
            let rebuilt = {
                let items = elements(&base);
                let mut copy = CopyOnWrite::new(items);

                for (index, item) in items.iter().enumerate() {
                    let Some(shape) = self.item_shape(index) else {
                        break;
                    };
                    let result = shape.apply_async(item, options).await?;
                    if let Visit::Changed(value) =
                        collector.visit(result, || PathSegment::index(index))
                    {
                        copy.set(index, value);
                    }
                    if collector.should_stop() {
                        break;
                    }
                }
                copy.into_changed()
            };

            Ok(collector.finish(base, rebuilt.map(Value::Array)))
        }
        .boxed()
    }
}
