//! Set shape.

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

/// A shape for sets. Element issues are located by insertion index.
///
/// When coercing, arrays and single values are accepted as sets.
#[derive(Clone)]
pub struct SetShape {
    core: ShapeCore,
    value: AnyShape,
}

impl SetShape {
    pub fn new(value: AnyShape) -> Self {
        Self {
            core: ShapeCore::new(),
            value,
        }
    }

    pub fn value_shape(&self) -> &AnyShape {
        &self.value
    }

    fn prepare<'a>(&self, input: &'a Value, options: &ApplyOptions) -> Result<Cow<'a, Value>, Issues> {
        coerce::prepare(
            input,
            self.is_coercing_for(options),
            |v| matches!(v, Value::Set(_)),
            coerce::to_set,
        )
        .ok_or_else(|| Issues::single(self.core.type_issue(input, Kind::Set)))
    }
}

fn elements(value: &Value) -> &[Value] {
    match value {
        Value::Set(items) => items,
        _ => &[],
    }
}

impl ShapeLike for SetShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Set)]
    }

    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Unknown)]
    }

    fn has_async_children(&self) -> bool {
        self.value.is_async()
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
                let result = self.value.apply(item, options)?;
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

        Ok(collector.finish(base, rebuilt.map(Value::Set)))
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
                    let result = self.value.apply_async(item, options).await?;
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

            Ok(collector.finish(base, rebuilt.map(Value::Set)))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    #[test]
    fn test_element_issue_located_by_index() {
        let shape = Shape::set(Shape::number());
        let input = Value::Set(vec![Value::from(1), Value::from("x")]);

        let issues = shape.parse(&input).unwrap_err();
        assert_eq!(issues.issues().unwrap().first().path.to_string(), "[1]");
    }

    #[test]
    fn test_coerces_array_to_set() {
        let shape = Shape::set(Shape::number()).coerce();
        let input = Value::Array(vec![Value::from(1), Value::from(2)]);

        assert_eq!(
            shape.parse(&input).unwrap(),
            Value::Set(vec![Value::from(1), Value::from(2)])
        );
        assert!(Shape::set(Shape::number()).parse(&input).is_err());
    }

    #[test]
    fn test_unchanged_set_is_borrowed() {
        let shape = Shape::set(Shape::string());
        let input = Value::Set(vec![Value::from("a")]);
        let result = shape.apply(&input, &ApplyOptions::default()).unwrap();
        assert!(matches!(
            result,
            stillwater::Validation::Success(Cow::Borrowed(_))
        ));
    }
}
