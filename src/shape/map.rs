//! Map shape.

use std::borrow::Cow;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::coerce;
use crate::error::{Issues, ShapeError};
use crate::options::ApplyOptions;
use crate::path::PathSegment;
use crate::types::{Kind, TypeAtom};
use crate::value::Value;

use super::composite::{Collector, CopyOnWrite, Visit};
use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};
use super::AnyShape;

/// A shape for maps with arbitrary keys.
///
/// Issues from both the key shape and the value shape are located at the
/// entry's key. When coercing, plain objects and arrays of `[key, value]`
/// pairs are accepted as maps.
///
/// Entries are kept positionally. A key shape that maps two keys to the same
/// output produces two entries with that key; nothing is merged.
///
/// # Example
///
/// ```rust
/// use verdict::{Shape, ShapeLike, Value};
///
/// let shape = Shape::map(Shape::number(), Shape::string());
/// let input = Value::Map(vec![(Value::from(1), Value::from(2))]);
///
/// let issues = shape.parse(&input).unwrap_err();
/// assert_eq!(issues.issues().unwrap().first().path.to_string(), "[1]");
/// ```
#[derive(Clone)]
pub struct MapShape {
    core: ShapeCore,
    key: AnyShape,
    value: AnyShape,
}

impl MapShape {
    pub fn new(key: AnyShape, value: AnyShape) -> Self {
        Self {
            core: ShapeCore::new(),
            key,
            value,
        }
    }

    pub fn key_shape(&self) -> &AnyShape {
        &self.key
    }

    pub fn value_shape(&self) -> &AnyShape {
        &self.value
    }

    fn prepare<'a>(&self, input: &'a Value, options: &ApplyOptions) -> Result<Cow<'a, Value>, Issues> {
        coerce::prepare(
            input,
            self.is_coercing_for(options),
            |v| matches!(v, Value::Map(_)),
            coerce::to_map,
        )
        .ok_or_else(|| Issues::single(self.core.type_issue(input, Kind::Map)))
    }
}

fn entries(value: &Value) -> &[(Value, Value)] {
    match value {
        Value::Map(entries) => entries,
        _ => &[],
    }
}

/// Merges the outcome of validating one entry's key and value.
fn changed_entry(
    key: &Value,
    value: &Value,
    new_key: Visit,
    new_value: Visit,
) -> Option<(Value, Value)> {
    match (new_key, new_value) {
        (Visit::Changed(k), Visit::Changed(v)) => Some((k, v)),
        (Visit::Changed(k), _) => Some((k, value.clone())),
        (_, Visit::Changed(v)) => Some((key.clone(), v)),
        _ => None,
    }
}

impl ShapeLike for MapShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Map)]
    }

    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        coerce::map_inputs()
    }

    fn has_async_children(&self) -> bool {
        self.key.is_async() || self.value.is_async()
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
            let items = entries(&base);
            let mut copy = CopyOnWrite::new(items);

            for (index, (key, value)) in items.iter().enumerate() {
                let result = self.key.apply(key, options)?;
                let new_key = collector.visit(result, || PathSegment::key(key.clone()));
                if collector.should_stop() {
                    break;
                }

                let result = self.value.apply(value, options)?;
                let new_value = collector.visit(result, || PathSegment::key(key.clone()));
                if let Some(entry) = changed_entry(key, value, new_key, new_value) {
                    copy.set(index, entry);
                }
                if collector.should_stop() {
                    break;
                }
            }
            copy.into_changed()
        };

        Ok(collector.finish(base, rebuilt.map(Value::Map)))
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
                let items = entries(&base);
                let mut copy = CopyOnWrite::new(items);

                for (index, (key, value)) in items.iter().enumerate() {
                    let result = self.key.apply_async(key, options).await?;
                    let new_key = collector.visit(result, || PathSegment::key(key.clone()));
                    if collector.should_stop() {
                        break;
                    }

                    let result = self.value.apply_async(value, options).await?;
                    let new_value = collector.visit(result, || PathSegment::key(key.clone()));
                    if let Some(entry) = changed_entry(key, value, new_key, new_value) {
                        copy.set(index, entry);
                    }
                    if collector.should_stop() {
                        break;
                    }
                }
                copy.into_changed()
            };

            Ok(collector.finish(base, rebuilt.map(Value::Map)))
        }
        .boxed()
    }
}
