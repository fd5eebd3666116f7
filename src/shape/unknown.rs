//! Shapes at the top and bottom of the type lattice.

use std::borrow::Cow;

use crate::error::{codes, Issue, ShapeError};
use crate::options::ApplyOptions;
use crate::types::{Kind, TypeAtom};
use crate::value::Value;

use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};

/// Accepts any value. Useful as a base for shapes built only from
/// operations.
#[derive(Clone, Debug, Default)]
pub struct UnknownShape {
    core: ShapeCore,
}

impl UnknownShape {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShapeLike for UnknownShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Unknown)]
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        _options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        Ok(Structure::accepted(Cow::Borrowed(input)))
    }
}

/// Rejects every value.
#[derive(Clone, Debug, Default)]
pub struct NeverShape {
    core: ShapeCore,
}

impl NeverShape {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShapeLike for NeverShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Never)]
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        _options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        let message = self.core.type_message().unwrap_or("must not be present");
        Ok(Structure::rejected(Issue::new(
            codes::NEVER,
            input.clone(),
            message,
        )))
    }
}
