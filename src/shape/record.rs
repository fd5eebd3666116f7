//! Record shape: objects with arbitrary keys.

use std::borrow::Cow;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::ShapeError;
use crate::options::ApplyOptions;
use crate::path::PathSegment;
use crate::types::{Kind, TypeAtom};
use crate::value::{Object, Value};

use super::composite::{Collector, Visit};
use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};
use super::AnyShape;

/// A shape for plain objects whose keys are not known in advance.
///
/// Every key is validated as a string by the key shape, and every value by
/// the value shape. A key shape may rename keys; the output then holds the
/// renamed keys in the original order. When two keys end up with the same
/// name the later entry's value wins, at the position of the earlier one.
///
/// # Example
///
/// ```rust
/// use verdict::{Shape, ShapeLike, Value};
///
/// let scores = Shape::record(Shape::string().min_len(2), Shape::number());
///
/// assert!(scores.parse(&Value::object([("ada", 3)])).is_ok());
/// assert!(scores.parse(&Value::object([("a", 3)])).is_err());
/// ```
#[derive(Clone)]
pub struct RecordShape {
    core: ShapeCore,
    key: Option<AnyShape>,
    value: AnyShape,
}

impl RecordShape {
    pub fn new(key: Option<AnyShape>, value: AnyShape) -> Self {
        Self {
            core: ShapeCore::new(),
            key,
            value,
        }
    }

    pub fn key_shape(&self) -> Option<&AnyShape> {
        self.key.as_ref()
    }

    pub fn value_shape(&self) -> &AnyShape {
        &self.value
    }
}

/// Rebuilds the record lazily: nothing is allocated until the first entry
/// changes, at which point the unchanged entries before it are copied.
struct Rebuild<'s> {
    source: &'s Object,
    output: Option<Object>,
}

impl<'s> Rebuild<'s> {
    fn new(source: &'s Object) -> Self {
        Self {
            source,
            output: None,
        }
    }

    fn entry(&mut self, index: usize, key: Option<String>, value: Option<Value>) {
        if self.output.is_none() && key.is_none() && value.is_none() {
            return;
        }
        let source = self.source;
        let Some((original_key, original_value)) = source.get_index(index) else {
            return;
        };
        let output = self.output.get_or_insert_with(|| {
            source
                .iter()
                .take(index)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        });

        output.insert(
            key.unwrap_or_else(|| original_key.clone()),
            value.unwrap_or_else(|| original_value.clone()),
        );
    }

    fn into_changed(self) -> Option<Value> {
        self.output.map(Value::Object)
    }
}

fn key_name(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl ShapeLike for RecordShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Object)]
    }

    fn has_async_children(&self) -> bool {
        self.key.iter().chain([&self.value]).any(|shape| shape.is_async())
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        let Value::Object(entries) = input else {
            return Ok(Structure::rejected(self.core.type_issue(input, Kind::Object)));
        };

        let mut collector = Collector::new(options);
        let mut rebuild = Rebuild::new(entries);

        for (index, (key, value)) in entries.iter().enumerate() {
            let mut new_key = None;
            if let Some(key_shape) = &self.key {
                let key_value = Value::String(key.clone());
                let result = key_shape.apply(&key_value, options)?;
                match collector.visit(result, || PathSegment::field(key.as_str())) {
                    Visit::Changed(renamed) => new_key = Some(key_name(renamed)),
                    Visit::Unchanged => {}
                    Visit::Failed if collector.should_stop() => break,
                    Visit::Failed => {}
                }
            }

            let result = self.value.apply(value, options)?;
            let new_value = match collector.visit(result, || PathSegment::field(key.as_str())) {
                Visit::Changed(value) => Some(value),
                _ => None,
            };
            rebuild.entry(index, new_key, new_value);

            if collector.should_stop() {
                break;
            }
        }

        Ok(collector.finish(Cow::Borrowed(input), rebuild.into_changed()))
    }

    fn apply_structure_async<'a>(
        &'a self,
        input: &'a Value,
        options: ApplyOptions,
    ) -> BoxFuture<'a, Result<Structure<'a>, ShapeError>> {
        async move {
            let Value::Object(entries) = input else {
                return Ok(Structure::rejected(self.core.type_issue(input, Kind::Object)));
            };

            let mut collector = Collector::new(&options);
            let mut rebuild = Rebuild::new(entries);

            for (index, (key, value)) in entries.iter().enumerate() {
                let mut new_key = None;
                if let Some(key_shape) = &self.key {
                    let key_value = Value::String(key.clone());
                    let result = key_shape.apply_async(&key_value, options).await?;
                    let visit = collector.visit(result, || PathSegment::field(key.as_str()));
                    match visit {
                        Visit::Changed(renamed) => new_key = Some(key_name(renamed)),
                        Visit::Unchanged => {}
                        Visit::Failed if collector.should_stop() => break,
                        Visit::Failed => {}
                    }
                }

                let result = self.value.apply_async(value, options).await?;
                let new_value = match collector.visit(result, || PathSegment::field(key.as_str()))
                {
                    Visit::Changed(value) => Some(value),
                    _ => None,
                };
                rebuild.entry(index, new_key, new_value);

                if collector.should_stop() {
                    break;
                }
            }

            Ok(collector.finish(Cow::Borrowed(input), rebuild.into_changed()))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use crate::shape::Shape;

    #[test]
    fn test_validates_every_value() {
        let shape = Shape::record(Shape::string(), Shape::number());
        let input = Value::object([("a", Value::from(1)), ("b", Value::from("x"))]);

        let issues = shape.parse(&input).unwrap_err();
        let issues = issues.issues().unwrap();
        assert_eq!(issues.first().path.to_string(), "b");
        assert_eq!(issues.first().code, codes::INVALID_TYPE);
    }

    #[test]
    fn test_key_failure_is_located_at_key() {
        let shape = Shape::record(Shape::string().min_len(2), Shape::unknown());
        let input = Value::object([("ok", Value::Null), ("x", Value::Null)]);

        let issues = shape.parse(&input).unwrap_err();
        let issue = issues.issues().unwrap().first().clone();
        assert_eq!(issue.path.to_string(), "x");
        assert_eq!(issue.input, Value::from("x"));
    }

    #[test]
    fn test_key_rename_keeps_order() {
        let upper =
            Shape::string().alter(|v| Value::from(v.as_str().unwrap_or("").to_uppercase()));
        let shape = Shape::record(upper, Shape::number().coerce());
        let input = Value::object([("a", Value::from(1)), ("b", Value::from("2"))]);

        let output = shape.parse(&input).unwrap();
        let keys: Vec<_> = output.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(output.as_object().unwrap()["B"], Value::from(2));
    }

    #[test]
    fn test_key_rename_collision_keeps_later_value() {
        let rename = Shape::string().alter(|v| match v.as_str() {
            Some("a") => Value::from("b"),
            _ => v.clone(),
        });
        let shape = Shape::record(rename, Shape::number());
        let input = Value::object([("a", 1), ("b", 2)]);

        assert_eq!(shape.parse(&input).unwrap(), Value::object([("b", 2)]));
    }

    #[test]
    fn test_value_change_after_unchanged_prefix() {
        let shape = Shape::record(Shape::string(), Shape::number().coerce());
        let input = Value::object([("a", Value::from(1)), ("b", Value::from("2"))]);

        assert_eq!(
            shape.parse(&input).unwrap(),
            Value::object([("a", Value::from(1)), ("b", Value::from(2))])
        );
    }

    #[test]
    fn test_unchanged_record_is_borrowed() {
        let shape = Shape::record(Shape::string(), Shape::number());
        let input = Value::object([("a", 1)]);
        let result = shape.apply(&input, &ApplyOptions::default()).unwrap();
        assert!(matches!(
            result,
            stillwater::Validation::Success(Cow::Borrowed(_))
        ));
    }
}
