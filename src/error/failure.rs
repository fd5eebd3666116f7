//! Errors that are not validation issues.

use thiserror::Error;

use super::issue::{Issue, Issues};

/// A boxed error raised by caller-supplied callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A failure of the validator itself rather than of the input.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// A synchronous entry point was used on a shape with async operations
    /// or async children.
    #[error("shape is async, use an async entry point")]
    AsyncShape,

    /// A callback failed for reasons unrelated to the input.
    #[error("{0}")]
    Defect(BoxError),
}

impl ShapeError {
    pub fn defect(error: impl Into<BoxError>) -> Self {
        ShapeError::Defect(error.into())
    }
}

/// What an operation callback may return instead of a value.
///
/// `Issues` are merged into the running diagnostics. `Defect` propagates
/// unchanged to the caller of the top-level entry point.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("operation raised {} issue(s)", .0.len())]
    Issues(Vec<Issue>),

    #[error("{0}")]
    Defect(BoxError),
}

impl OperationError {
    pub fn defect(error: impl Into<BoxError>) -> Self {
        OperationError::Defect(error.into())
    }
}

impl From<Issues> for OperationError {
    fn from(issues: Issues) -> Self {
        OperationError::Issues(issues.into_vec())
    }
}

impl From<ShapeError> for OperationError {
    fn from(error: ShapeError) -> Self {
        match error {
            ShapeError::Defect(inner) => OperationError::Defect(inner),
            other => OperationError::Defect(Box::new(other)),
        }
    }
}

/// Lets a callback delegate to another shape's throwing parse with `?`.
impl From<ParseError> for OperationError {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Invalid(issues) => issues.into(),
            ParseError::Shape(error) => error.into(),
        }
    }
}

/// The aggregate error of the throwing parse entry points.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Invalid(#[from] Issues),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl ParseError {
    /// Returns the issues if this is a validation failure.
    pub fn issues(&self) -> Option<&Issues> {
        match self {
            ParseError::Invalid(issues) => Some(issues),
            ParseError::Shape(_) => None,
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ShapeError>();
    assert_sync::<ShapeError>();
    assert_send::<OperationError>();
    assert_sync::<OperationError>();
    assert_send::<ParseError>();
    assert_sync::<ParseError>();
};
