//! Shape definitions.
//!
//! Every validator is a shape: an immutable node that checks the structure of
//! a value, recurses into children for containers, and runs its own pipeline
//! of operations. [`Shape`] is the entry point for building them.
//!
//! # Example
//!
//! ```rust
//! use verdict::{Shape, ShapeLike, Value};
//!
//! let schema = Shape::object()
//!     .field("name", Shape::string().min_len(1))
//!     .field("tags", Shape::array(Shape::string()).max_len(3));
//!
//! let input = Value::object([
//!     ("name", Value::from("box")),
//!     ("tags", Value::Array(vec![Value::from("a")])),
//! ]);
//! assert!(schema.parse(&input).is_ok());
//! ```

use std::sync::Arc;

mod array;
mod bigint;
mod boolean;
mod composite;
mod core;
mod date;
mod intersection;
mod literal;
mod map;
mod number;
mod object;
mod record;
mod set;
mod string;
mod traits;
mod union;
mod unknown;

pub use self::core::ShapeCore;
pub use array::ArrayShape;
pub use bigint::BigIntShape;
pub use boolean::BooleanShape;
pub use date::DateShape;
pub use intersection::IntersectionShape;
pub use literal::LiteralShape;
pub use map::MapShape;
pub use number::NumberShape;
pub use object::{KeyMode, ObjectShape};
pub use record::RecordShape;
pub use set::SetShape;
pub use string::StringShape;
pub use traits::{ShapeLike, Structure};
pub use union::UnionShape;
pub use unknown::{NeverShape, UnknownShape};

use crate::value::Value;

/// A shared, type-erased shape. Composite shapes hold their children as
/// `AnyShape`, so one child may be reused by many parents.
pub type AnyShape = Arc<dyn ShapeLike>;

/// Conversion into a shared child shape.
pub trait IntoShape {
    fn into_shape(self) -> AnyShape;
}

impl<S> IntoShape for S
where
    S: ShapeLike + 'static,
{
    fn into_shape(self) -> AnyShape {
        Arc::new(self)
    }
}

impl IntoShape for AnyShape {
    fn into_shape(self) -> AnyShape {
        self
    }
}

/// Entry point for creating shapes.
///
/// # Example
///
/// ```rust
/// use verdict::{Shape, ShapeLike, Value};
///
/// let port = Shape::number().integer().range(1.0, 65535.0);
/// let host = Shape::nullable(Shape::string().min_len(1));
///
/// assert!(port.parse(&Value::from(8080)).is_ok());
/// assert!(host.parse(&Value::Null).is_ok());
/// ```
pub struct Shape;

impl Shape {
    pub fn number() -> NumberShape {
        NumberShape::new()
    }

    /// Creates a string shape.
    ///
    /// # Example
    ///
    /// ```rust
    /// use verdict::{Shape, ShapeLike, Value};
    ///
    /// let schema = Shape::string().max_len(3);
    ///
    /// assert!(schema.parse(&Value::from("abc")).is_ok());
    /// assert!(schema.parse(&Value::from("abcd")).is_err());
    /// ```
    pub fn string() -> StringShape {
        StringShape::new()
    }

    pub fn boolean() -> BooleanShape {
        BooleanShape::new()
    }

    pub fn bigint() -> BigIntShape {
        BigIntShape::new()
    }

    pub fn date() -> DateShape {
        DateShape::new()
    }

    /// A shape accepting exactly `value`.
    pub fn literal(value: impl Into<Value>) -> LiteralShape {
        LiteralShape::new(value)
    }

    pub fn null() -> LiteralShape {
        LiteralShape::new(Value::Null)
    }

    pub fn undefined() -> LiteralShape {
        LiteralShape::new(Value::Undefined)
    }

    pub fn unknown() -> UnknownShape {
        UnknownShape::new()
    }

    pub fn never() -> NeverShape {
        NeverShape::new()
    }

    /// An array whose elements all conform to `item`.
    pub fn array(item: impl IntoShape) -> ArrayShape {
        ArrayShape::new(Vec::new(), Some(item.into_shape()))
    }

    /// A fixed-length array with one shape per position.
    ///
    /// # Example
    ///
    /// ```rust
    /// use verdict::{IntoShape, Shape, ShapeLike, Value};
    ///
    /// let point = Shape::tuple(vec![
    ///     Shape::number().into_shape(),
    ///     Shape::number().into_shape(),
    /// ]);
    ///
    /// assert!(point.parse(&Value::from(vec![Value::from(1), Value::from(2)])).is_ok());
    /// assert!(point.parse(&Value::from(vec![Value::from(1)])).is_err());
    /// ```
    pub fn tuple(head: Vec<AnyShape>) -> ArrayShape {
        ArrayShape::new(head, None)
    }

    pub fn object() -> ObjectShape {
        ObjectShape::new()
    }

    /// An object with arbitrary string keys.
    pub fn record(key: impl IntoShape, value: impl IntoShape) -> RecordShape {
        RecordShape::new(Some(key.into_shape()), value.into_shape())
    }

    pub fn map(key: impl IntoShape, value: impl IntoShape) -> MapShape {
        MapShape::new(key.into_shape(), value.into_shape())
    }

    pub fn set(value: impl IntoShape) -> SetShape {
        SetShape::new(value.into_shape())
    }

    pub fn union<I>(members: I) -> UnionShape
    where
        I: IntoIterator<Item = AnyShape>,
    {
        UnionShape::new(members)
    }

    pub fn intersection<I>(members: I) -> IntersectionShape
    where
        I: IntoIterator<Item = AnyShape>,
    {
        IntersectionShape::new(members)
    }

    /// `shape`, or `undefined`.
    ///
    /// `undefined` is tried first, so a coercing `shape` never turns a
    /// missing value into a default.
    pub fn optional(shape: impl IntoShape) -> UnionShape {
        UnionShape::new([Self::undefined().into_shape(), shape.into_shape()])
    }

    /// `shape`, or `null`.
    pub fn nullable(shape: impl IntoShape) -> UnionShape {
        UnionShape::new([Self::null().into_shape(), shape.into_shape()])
    }
}
