//! # Verdict
//!
//! A runtime validation engine. A shape describes the expected structure of
//! a value; applying it to an in-memory [`Value`] either yields the value
//! (possibly coerced or transformed) or a list of path-located issues.
//!
//! ## Overview
//!
//! - Shapes are immutable. Builder methods return a new shape, so one shape
//!   may be shared across threads and applied any number of times.
//! - Each shape runs a pipeline of [`Operation`]s after its own structural
//!   check. The pipeline is compiled once and cached.
//! - Every entry point has a sync and an async form. Async shapes refuse the
//!   sync form, and the async form completes synchronously when nothing in
//!   the shape is async.
//! - By default validation returns early: each branch stops at its first
//!   issue. [`ApplyOptions::verbose`] collects every issue instead.
//! - Unions dispatch on the value's [`Kind`], and intersections merge their
//!   members' outputs.
//!
//! ## Core Types
//!
//! - [`Shape`]: entry point for creating shapes
//! - [`ShapeLike`]: the apply and parse entry points every shape provides
//! - [`Issue`] / [`Issues`]: a single diagnostic and a non-empty collection
//! - [`IssuePath`]: where an issue occurred (e.g., `users[0].email`)
//! - [`ParseError`]: what the throwing parse entry point fails with
//!
//! ## Example
//!
//! ```rust
//! use verdict::{ApplyOptions, Shape, ShapeLike, Value};
//!
//! let schema = Shape::number().min(2.0).multiple_of(3.0);
//!
//! assert!(schema.parse(&Value::from(6)).is_ok());
//!
//! // early return: only the first violated constraint
//! let issues = schema.parse(&Value::from(1)).unwrap_err();
//! assert_eq!(issues.issues().unwrap().len(), 1);
//!
//! // verbose: every violated constraint, in declaration order
//! let issues = schema
//!     .parse_with(&Value::from(1), &ApplyOptions::verbose())
//!     .unwrap_err();
//! assert_eq!(issues.issues().unwrap().len(), 2);
//! ```

pub mod coerce;
pub mod error;
pub mod operation;
pub mod options;
pub mod path;
pub mod shape;
pub mod types;
pub mod value;

pub use coerce::NotCoercible;
pub use error::{
    codes, BoxError, Issue, IssueParam, Issues, OperationError, ParseError, ShapeError,
};
pub use operation::{Callback, Operation, OperationState, Pipeline};
pub use options::ApplyOptions;
pub use path::{IssuePath, PathSegment};
pub use shape::{
    AnyShape, ArrayShape, BigIntShape, BooleanShape, DateShape, IntersectionShape, IntoShape,
    KeyMode, LiteralShape, MapShape, NeverShape, NumberShape, ObjectShape, RecordShape, SetShape,
    Shape, ShapeCore, ShapeLike, StringShape, Structure, UnionShape, UnknownShape,
};
pub use types::{distribute_types, intersect_values, union_types, Kind, TypeAtom};
pub use value::{Object, Symbol, Value};

/// Type alias for validation results using [`Issues`].
pub type ValidationResult<T> = stillwater::Validation<T, Issues>;
