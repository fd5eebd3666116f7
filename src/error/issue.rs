//! Validation issue types.
//!
//! This module provides [`Issue`] for single diagnostics and [`Issues`] for
//! the non-empty list a failed validation carries.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::{IssuePath, PathSegment};
use crate::types::{Kind, TypeAtom};
use crate::value::Value;

/// Structured context attached to an issue.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueParam {
    /// The violated limit or expected literal.
    Value(Value),
    /// The type the structural check expected.
    Kind(Kind),
    /// Context of a failed union.
    Union {
        /// The input types the union accepts.
        inputs: Vec<TypeAtom>,
        /// Issues of every member that was tried, in declaration order.
        /// `None` when no member was eligible for the input's type.
        issue_groups: Option<Vec<Vec<Issue>>>,
    },
}

/// A single validation diagnostic.
///
/// An issue is raised with an empty path relative to the shape that produced
/// it. The only change it undergoes afterwards is composite parents
/// prepending their keys.
///
/// # Example
///
/// ```rust
/// use verdict::{Issue, IssueParam, PathSegment, Value};
///
/// let issue = Issue::new("min_value", Value::from(1), "must be at least 2")
///     .with_param(IssueParam::Value(Value::from(2)))
///     .prefixed(PathSegment::field("age"));
///
/// assert_eq!(issue.path.to_string(), "age");
/// assert_eq!(issue.code, "min_value");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Machine-readable issue code (see [`codes`](crate::codes)).
    pub code: String,
    pub path: IssuePath,
    /// The value that failed, as the raising shape saw it.
    pub input: Value,
    pub message: String,
    pub param: Option<IssueParam>,
    /// Caller-supplied metadata, passed through untouched.
    pub meta: Option<Value>,
}

impl Issue {
    pub fn new(code: impl Into<String>, input: Value, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            path: IssuePath::root(),
            input,
            message: message.into(),
            param: None,
            meta: None,
        }
    }

    pub fn with_param(mut self, param: IssueParam) -> Self {
        self.param = Some(param);
        self
    }

    pub fn with_meta(mut self, meta: impl Into<Value>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Returns the issue relocated under `segment`.
    pub fn prefixed(mut self, segment: PathSegment) -> Self {
        self.path.prepend(segment);
        self
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };

        write!(f, "{}: {} [{}]", path_str, self.message, self.code)
    }
}

impl std::error::Error for Issue {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issue>();
    assert_sync::<Issue>();
};

/// A non-empty, ordered collection of issues.
///
/// `Issues` is the failure side of every validation result. It implements
/// `Semigroup` so that independent failures can be combined:
///
/// ```rust
/// use verdict::{Issue, Issues, Value};
/// use stillwater::prelude::*;
///
/// let a = Issues::single(Issue::new("refine", Value::Null, "first"));
/// let b = Issues::single(Issue::new("refine", Value::Null, "second"));
///
/// let combined = a.combine(b);
/// assert_eq!(combined.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issues(NonEmptyVec<Issue>);

impl Issues {
    pub fn single(issue: Issue) -> Self {
        Self(NonEmptyVec::singleton(issue))
    }

    /// Returns `None` if `issues` is empty.
    pub fn from_vec(issues: Vec<Issue>) -> Option<Self> {
        NonEmptyVec::from_vec(issues).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API consistency.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    pub fn first(&self) -> &Issue {
        self.0.head()
    }

    /// Returns all issues at the specified path.
    pub fn at_path(&self, path: &IssuePath) -> Vec<&Issue> {
        self.0.iter().filter(|i| &i.path == path).collect()
    }

    /// Returns all issues with the specified code.
    pub fn with_code(&self, code: &str) -> Vec<&Issue> {
        self.0.iter().filter(|i| i.code == code).collect()
    }

    pub fn into_vec(self) -> Vec<Issue> {
        self.0.into_vec()
    }

    /// Relocates every issue under `segment`.
    pub fn prefixed(self, segment: PathSegment) -> Vec<Issue> {
        self.into_iter()
            .map(|issue| issue.prefixed(segment.clone()))
            .collect()
    }
}

impl Semigroup for Issues {
    fn combine(self, other: Self) -> Self {
        Issues(self.0.combine(other.0))
    }
}

impl Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} issue(s):", self.len())?;
        for (i, issue) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for Issues {}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a Issues {
    type Item = &'a Issue;
    type IntoIter = Box<dyn Iterator<Item = &'a Issue> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issues>();
    assert_sync::<Issues>();
};
