//! The shape protocol.
//!
//! [`ShapeLike`] is implemented by every validator node. A shape supplies its
//! structural step (type check, coercion, and child recursion for composites)
//! and the trait runs the shape's operation pipeline on whatever the
//! structural step accepted.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;
use stillwater::Validation;
use tracing::{debug, trace};

use crate::error::{codes, Issue, Issues, OperationError, ParseError, ShapeError};
use crate::operation::{Operation, OperationState};
use crate::options::ApplyOptions;
use crate::types::{union_types, TypeAtom};
use crate::value::Value;
use crate::ValidationResult;

use super::core::ShapeCore;
use super::union::UnionShape;

/// The outcome of a shape's structural step.
#[derive(Debug)]
pub enum Structure<'a> {
    /// The input does not have the right structure. Operations do not run.
    Rejected(Issues),
    /// The input (possibly coerced or rebuilt) goes on to the pipeline,
    /// together with any issues raised by children.
    Accepted {
        value: Cow<'a, Value>,
        issues: Vec<Issue>,
    },
}

impl<'a> Structure<'a> {
    pub fn accepted(value: Cow<'a, Value>) -> Self {
        Structure::Accepted {
            value,
            issues: Vec::new(),
        }
    }

    pub fn rejected(issue: Issue) -> Self {
        Structure::Rejected(Issues::single(issue))
    }

    fn finish(
        self,
        shape: &(impl ShapeLike + ?Sized),
        options: &ApplyOptions,
    ) -> Result<ValidationResult<Cow<'a, Value>>, ShapeError> {
        match self {
            Structure::Rejected(issues) => Ok(Validation::Failure(issues)),
            Structure::Accepted { value, issues } => {
                let state = shape
                    .core()
                    .pipeline()
                    .run(OperationState::new(value, issues), options)?;
                Ok(state.into_result())
            }
        }
    }
}

/// A validator node.
///
/// Shapes are immutable once built. Builder methods consume the shape and
/// return a new one, and the apply entry points only read it, so one shape
/// may be shared across threads and reused for any number of calls.
///
/// # Example
///
/// ```rust
/// use verdict::{ApplyOptions, Shape, ShapeLike, Value};
///
/// let shape = Shape::number().min(2.0).multiple_of(3.0);
///
/// let issues = shape
///     .try_parse(&Value::from(1))
///     .unwrap()
///     .into_result()
///     .unwrap_err();
/// assert_eq!(issues.len(), 1);
///
/// let issues = shape
///     .try_parse_with(&Value::from(1), &ApplyOptions::verbose())
///     .unwrap()
///     .into_result()
///     .unwrap_err();
/// assert_eq!(issues.len(), 2);
/// ```
pub trait ShapeLike: Send + Sync {
    fn core(&self) -> &ShapeCore;

    fn core_mut(&mut self) -> &mut ShapeCore;

    /// The input types the shape accepts without coercion.
    fn declared_input_types(&self) -> Vec<TypeAtom>;

    /// The input types the shape accepts when coercing.
    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        self.declared_input_types()
    }

    /// True if any child shape is async.
    fn has_async_children(&self) -> bool {
        false
    }

    /// Checks the input's structure and recurses into children.
    ///
    /// Composite shapes must not call this on async children; the sync
    /// [`apply`](ShapeLike::apply) of a child refuses if it is async.
    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError>;

    /// Async counterpart of [`apply_structure`](ShapeLike::apply_structure).
    /// Composite shapes with async children override it.
    fn apply_structure_async<'a>(
        &'a self,
        input: &'a Value,
        options: ApplyOptions,
    ) -> BoxFuture<'a, Result<Structure<'a>, ShapeError>> {
        future::ready(self.apply_structure(input, &options)).boxed()
    }

    /// Returns the union behind this shape, if it is one.
    fn as_union(&self) -> Option<&UnionShape> {
        None
    }

    fn is_coercing_for(&self, options: &ApplyOptions) -> bool {
        self.core().is_coercing() || options.coerce
    }

    /// The minimal set of input types this shape may accept.
    fn input_types(&self) -> Arc<[TypeAtom]> {
        self.core().memo_inputs(|| {
            let core = self.core();
            let types = match core.input_override() {
                Some(types) => types.to_vec(),
                None if core.is_coercing() => self.coerced_input_types(),
                None => self.declared_input_types(),
            };
            union_types(types)
        })
    }

    /// Input types under the given call options.
    fn input_types_for(&self, options: &ApplyOptions) -> Arc<[TypeAtom]> {
        let core = self.core();
        if options.coerce && !core.is_coercing() && core.input_override().is_none() {
            union_types(self.coerced_input_types()).into()
        } else {
            self.input_types()
        }
    }

    /// True if this shape or any descendant has async operations.
    fn is_async(&self) -> bool {
        self.core().memo_async(|| {
            let core = self.core();
            core.is_forced_async() || core.pipeline().is_async() || self.has_async_children()
        })
    }

    /// Validates `input` synchronously.
    ///
    /// The output borrows `input` when nothing was changed.
    fn apply<'a>(
        &self,
        input: &'a Value,
        options: &ApplyOptions,
    ) -> Result<ValidationResult<Cow<'a, Value>>, ShapeError> {
        if self.is_async() {
            debug!("refusing sync apply on an async shape");
            return Err(ShapeError::AsyncShape);
        }
        self.apply_structure(input, options)?.finish(self, options)
    }

    /// Validates `input`, awaiting async operations and children.
    ///
    /// Completes synchronously when nothing in the shape is async.
    fn apply_async<'a>(
        &'a self,
        input: &'a Value,
        options: ApplyOptions,
    ) -> BoxFuture<'a, Result<ValidationResult<Cow<'a, Value>>, ShapeError>> {
        if !self.is_async() {
            trace!("async apply completed synchronously");
            return future::ready(self.apply(input, &options)).boxed();
        }

        async move {
            match self.apply_structure_async(input, options).await? {
                Structure::Rejected(issues) => Ok(Validation::Failure(issues)),
                Structure::Accepted { value, issues } => {
                    let state = self
                        .core()
                        .pipeline()
                        .run_async(OperationState::new(value, issues), options)
                        .await?;
                    Ok(state.into_result())
                }
            }
        }
        .boxed()
    }

    /// Returns the output or fails with every issue found.
    fn parse(&self, input: &Value) -> Result<Value, ParseError> {
        self.parse_with(input, &ApplyOptions::default())
    }

    fn parse_with(&self, input: &Value, options: &ApplyOptions) -> Result<Value, ParseError> {
        Ok(self
            .apply(input, options)?
            .into_result()
            .map(Cow::into_owned)?)
    }

    /// Returns the validation result. Only defects and misuse are errors.
    fn try_parse(&self, input: &Value) -> Result<ValidationResult<Value>, ShapeError> {
        self.try_parse_with(input, &ApplyOptions::default())
    }

    fn try_parse_with(
        &self,
        input: &Value,
        options: &ApplyOptions,
    ) -> Result<ValidationResult<Value>, ShapeError> {
        Ok(self.apply(input, options)?.map(Cow::into_owned))
    }

    fn is_valid(&self, input: &Value) -> Result<bool, ShapeError> {
        Ok(self.apply(input, &ApplyOptions::default())?.is_success())
    }

    fn parse_async<'a>(
        &'a self,
        input: &'a Value,
        options: ApplyOptions,
    ) -> BoxFuture<'a, Result<Value, ParseError>> {
        self.apply_async(input, options)
            .map(|result| -> Result<Value, ParseError> {
                Ok(result?.into_result().map(Cow::into_owned)?)
            })
            .boxed()
    }

    fn try_parse_async<'a>(
        &'a self,
        input: &'a Value,
        options: ApplyOptions,
    ) -> BoxFuture<'a, Result<ValidationResult<Value>, ShapeError>> {
        self.apply_async(input, options)
            .map(|result| -> Result<ValidationResult<Value>, ShapeError> {
                Ok(result?.map(Cow::into_owned))
            })
            .boxed()
    }

    fn is_valid_async<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<bool, ShapeError>> {
        self.apply_async(input, ApplyOptions::default())
            .map(|result| -> Result<bool, ShapeError> { Ok(result?.is_success()) })
            .boxed()
    }

    /// Appends an operation, replacing one with the same key.
    fn add_operation(mut self, operation: Operation) -> Self
    where
        Self: Sized,
    {
        self.core_mut().push_operation(operation);
        self
    }

    /// Adds a check returning the issues it finds.
    fn check<F>(self, f: F) -> Self
    where
        Self: Sized,
        F: Fn(&Value, &ApplyOptions) -> Result<Vec<Issue>, OperationError> + Send + Sync + 'static,
    {
        self.add_operation(Operation::check(move |value, _, options| f(value, options)))
    }

    /// Adds a predicate check raising a `refine` issue when it returns false.
    fn refine<P>(self, predicate: P, message: impl Into<String>) -> Self
    where
        Self: Sized,
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.add_operation(Operation::check(move |value, _, _| {
            if predicate(value) {
                Ok(Vec::new())
            } else {
                Ok(vec![Issue::new(codes::REFINE, value.clone(), message.clone())])
            }
        }))
    }

    /// Adds a transform of the validated value.
    fn alter<F>(self, f: F) -> Self
    where
        Self: Sized,
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.add_operation(Operation::alter(move |value, _, _| Ok(f(value))))
    }

    /// Adds an async check. The shape becomes async.
    fn check_async<F, Fut>(self, f: F) -> Self
    where
        Self: Sized,
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Issue>, OperationError>> + Send + 'static,
    {
        self.add_operation(Operation::check_async(move |value, _, _| f(value).boxed()))
    }

    fn refine_async<P, Fut>(self, predicate: P, message: impl Into<String>) -> Self
    where
        Self: Sized,
        P: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let message = message.into();
        self.add_operation(Operation::check_async(move |value, _, _| {
            let passed = predicate(value.clone());
            let message = message.clone();
            async move {
                if passed.await {
                    Ok(Vec::new())
                } else {
                    Ok(vec![Issue::new(codes::REFINE, value, message)])
                }
            }
            .boxed()
        }))
    }

    fn alter_async<F, Fut>(self, f: F) -> Self
    where
        Self: Sized,
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        self.add_operation(Operation::alter_async(move |value, _, _| {
            f(value).map(Ok::<Value, OperationError>).boxed()
        }))
    }

    /// Sets the message of the last operation's issues, or of the type issue
    /// if no operation was added yet.
    fn error(mut self, message: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.core_mut().set_error(message.into());
        self
    }

    /// Enables input coercion for this shape.
    fn coerce(mut self) -> Self
    where
        Self: Sized,
    {
        self.core_mut().set_coerce(true);
        self
    }

    /// Replaces the input types used for union dispatch.
    fn set_input_types<I>(mut self, types: I) -> Self
    where
        Self: Sized,
        I: IntoIterator<Item = TypeAtom>,
    {
        self.core_mut().set_input_types(types.into_iter().collect());
        self
    }

    /// Marks the shape async even without async operations.
    fn set_async(mut self) -> Self
    where
        Self: Sized,
    {
        self.core_mut().set_async();
        self
    }
}
