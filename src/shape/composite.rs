//! Child iteration shared by container shapes.
//!
//! A container applies each child shape in order, relocates the child's
//! issues under the child's key, and copies itself only once a child output
//! differs from its input.

use std::borrow::Cow;

use stillwater::Validation;

use crate::error::Issue;
use crate::options::ApplyOptions;
use crate::path::PathSegment;
use crate::value::Value;
use crate::ValidationResult;

use super::traits::Structure;

/// What a container learns from one child result.
pub(crate) enum Visit {
    Unchanged,
    Changed(Value),
    Failed,
}

/// Accumulates child issues for one container.
pub(crate) struct Collector {
    verbose: bool,
    issues: Vec<Issue>,
}

impl Collector {
    pub fn new(options: &ApplyOptions) -> Self {
        Self {
            verbose: options.verbose,
            issues: Vec::new(),
        }
    }

    /// Records a child result. `segment` is only built if the child failed.
    pub fn visit<F>(&mut self, result: ValidationResult<Cow<'_, Value>>, segment: F) -> Visit
    where
        F: FnOnce() -> PathSegment,
    {
        match result {
            Validation::Success(Cow::Borrowed(_)) => Visit::Unchanged,
            Validation::Success(Cow::Owned(value)) => Visit::Changed(value),
            Validation::Failure(issues) => {
                self.issues.extend(issues.prefixed(segment()));
                Visit::Failed
            }
        }
    }

    /// Records an issue raised by the container about one of its entries.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// True once the container may stop visiting children.
    pub fn should_stop(&self) -> bool {
        !self.verbose && !self.issues.is_empty()
    }

    /// Hands the container's value on to its pipeline.
    ///
    /// When a child failed the container's own input is passed on, so forced
    /// operations never see a partially rebuilt value.
    pub fn finish<'a>(self, base: Cow<'a, Value>, rebuilt: Option<Value>) -> Structure<'a> {
        if !self.issues.is_empty() {
            return Structure::Accepted {
                value: base,
                issues: self.issues,
            };
        }
        match rebuilt {
            Some(value) => Structure::accepted(Cow::Owned(value)),
            None => Structure::accepted(base),
        }
    }
}

/// A slice that is copied on its first write.
pub(crate) struct CopyOnWrite<'s, T: Clone> {
    source: &'s [T],
    copy: Option<Vec<T>>,
}

impl<'s, T: Clone> CopyOnWrite<'s, T> {
    pub fn new(source: &'s [T]) -> Self {
        Self { source, copy: None }
    }

    pub fn set(&mut self, index: usize, item: T) {
        let copy = self.copy.get_or_insert_with(|| self.source.to_vec());
        copy[index] = item;
    }

    /// Returns the copy, or `None` if nothing was written.
    pub fn into_changed(self) -> Option<Vec<T>> {
        self.copy
    }
}
