//! State shared by every shape.

use std::sync::{Arc, OnceLock};

use crate::error::{codes, Issue, IssueParam};
use crate::operation::{Operation, Pipeline};
use crate::types::{Kind, TypeAtom};
use crate::value::Value;

/// The part of a shape that is independent of what it validates: its
/// operations, its coercion flag, overrides set through the construction
/// contract, and memoized derived facts.
///
/// Cloning is shallow apart from the operation list. Every setter clears the
/// memos, so a derived shape never reuses facts computed for its source.
#[derive(Clone, Default, Debug)]
pub struct ShapeCore {
    pipeline: Pipeline,
    coerce: bool,
    forced_async: bool,
    input_override: Option<Vec<TypeAtom>>,
    type_message: Option<String>,
    inputs: OnceLock<Arc<[TypeAtom]>>,
    is_async: OnceLock<bool>,
}

impl ShapeCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// True if the shape enabled coercion for itself.
    pub fn is_coercing(&self) -> bool {
        self.coerce
    }

    pub fn is_forced_async(&self) -> bool {
        self.forced_async
    }

    pub fn input_override(&self) -> Option<&[TypeAtom]> {
        self.input_override.as_deref()
    }

    /// True if the shape has no operations and no construction overrides, so
    /// a parent may look through it.
    pub fn is_plain(&self) -> bool {
        self.pipeline.is_empty()
            && !self.forced_async
            && self.input_override.is_none()
            && self.type_message.is_none()
    }

    /// Builds the structural type issue for `input`.
    pub fn type_issue(&self, input: &Value, expected: Kind) -> Issue {
        let message = match &self.type_message {
            Some(message) => message.clone(),
            None => format!("expected {}, got {}", expected, Kind::of(input)),
        };
        Issue::new(codes::INVALID_TYPE, input.clone(), message)
            .with_param(IssueParam::Kind(expected))
    }

    /// The message override for structural issues, if one was set.
    pub fn type_message(&self) -> Option<&str> {
        self.type_message.as_deref()
    }

    pub(crate) fn push_operation(&mut self, operation: Operation) {
        self.pipeline.push(operation);
        self.invalidate();
    }

    /// Overrides the message of the last operation, or of the structural
    /// issue when there are no operations yet.
    pub(crate) fn set_error(&mut self, message: String) {
        match self.pipeline.last_mut() {
            Some(last) => last.set_message(message),
            None => self.type_message = Some(message),
        }
    }

    pub(crate) fn set_coerce(&mut self, coerce: bool) {
        self.coerce = coerce;
        self.invalidate();
    }

    pub(crate) fn set_input_types(&mut self, types: Vec<TypeAtom>) {
        self.input_override = Some(types);
        self.invalidate();
    }

    pub(crate) fn set_async(&mut self) {
        self.forced_async = true;
        self.invalidate();
    }

    /// Clears memoized facts. Composite shapes call this when their children
    /// change.
    pub(crate) fn invalidate(&mut self) {
        self.inputs = OnceLock::new();
        self.is_async = OnceLock::new();
    }

    pub(crate) fn memo_inputs<F>(&self, compute: F) -> Arc<[TypeAtom]>
    where
        F: FnOnce() -> Vec<TypeAtom>,
    {
        Arc::clone(self.inputs.get_or_init(|| compute().into()))
    }

    pub(crate) fn memo_async<F>(&self, compute: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        *self.is_async.get_or_init(compute)
    }
}
