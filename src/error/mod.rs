//! Error types.
//!
//! Validation issues ([`Issue`], [`Issues`]) describe non-conforming input.
//! [`ShapeError`] covers failures of the validator itself, which are never
//! reported as issues.

mod failure;
mod issue;

pub use failure::{BoxError, OperationError, ParseError, ShapeError};
pub use issue::{Issue, IssueParam, Issues};

/// Issue codes raised by the built-in shapes.
pub mod codes {
    pub const INVALID_TYPE: &str = "invalid_type";
    pub const INVALID_LITERAL: &str = "invalid_literal";
    pub const INVALID_UNION: &str = "invalid_union";
    pub const INVALID_INTERSECTION: &str = "invalid_intersection";
    pub const NEVER: &str = "never";
    /// Raised by predicate checks that carry no code of their own.
    pub const REFINE: &str = "refine";
    pub const UNKNOWN_KEY: &str = "unknown_key";
    pub const TUPLE_LENGTH: &str = "tuple_length";

    pub const MIN_VALUE: &str = "min_value";
    pub const MAX_VALUE: &str = "max_value";
    pub const GREATER_THAN: &str = "greater_than";
    pub const LESS_THAN: &str = "less_than";
    pub const MULTIPLE_OF: &str = "multiple_of";
    pub const INTEGER: &str = "integer";
    pub const POSITIVE: &str = "positive";
    pub const NON_NEGATIVE: &str = "non_negative";
    pub const NEGATIVE: &str = "negative";

    pub const MIN_LENGTH: &str = "min_length";
    pub const MAX_LENGTH: &str = "max_length";
    pub const UNIQUE: &str = "unique";
    pub const PATTERN: &str = "pattern";
}
