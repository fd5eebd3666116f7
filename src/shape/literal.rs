//! Literal shape.

use std::borrow::Cow;

use crate::error::{codes, Issue, IssueParam, ShapeError};
use crate::options::ApplyOptions;
use crate::types::TypeAtom;
use crate::value::Value;

use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};

/// A shape accepting exactly one value.
///
/// NaN matches NaN. `null` and `undefined` literals report an ordinary type
/// issue, since they are types of their own.
///
/// # Example
///
/// ```rust
/// use verdict::{Shape, ShapeLike, Value};
///
/// let schema = Shape::literal("admin");
///
/// assert!(schema.parse(&Value::from("admin")).is_ok());
/// assert!(schema.parse(&Value::from("user")).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct LiteralShape {
    core: ShapeCore,
    value: Value,
}

impl LiteralShape {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            core: ShapeCore::new(),
            value: value.into(),
        }
    }

    /// The accepted value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    fn issue(&self, input: &Value) -> Issue {
        if let TypeAtom::Kind(kind) = TypeAtom::literal(self.value.clone()) {
            return self.core.type_issue(input, kind);
        }
        let message = match self.core.type_message() {
            Some(message) => message.to_string(),
            None => format!("must be equal to {}", self.value),
        };
        Issue::new(codes::INVALID_LITERAL, input.clone(), message)
            .with_param(IssueParam::Value(self.value.clone()))
    }
}

impl ShapeLike for LiteralShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::literal(self.value.clone())]
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        _options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        if *input == self.value {
            Ok(Structure::accepted(Cow::Borrowed(input)))
        } else {
            Ok(Structure::rejected(self.issue(input)))
        }
    }
}
