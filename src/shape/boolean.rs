//! Boolean shape.

use crate::coerce;
use crate::error::ShapeError;
use crate::options::ApplyOptions;
use crate::types::{Kind, TypeAtom};
use crate::value::Value;

use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};

/// A shape accepting `true` and `false`.
#[derive(Clone, Debug, Default)]
pub struct BooleanShape {
    core: ShapeCore,
}

impl BooleanShape {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShapeLike for BooleanShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Boolean)]
    }

    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        coerce::boolean_inputs()
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
                |v| matches!(v, Value::Bool(_)),
                coerce::to_boolean,
            ) {
                Some(value) => Structure::accepted(value),
                None => Structure::rejected(self.core.type_issue(input, Kind::Boolean)),
            },
        )
    }
}
