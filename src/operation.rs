//! Operations and the compiled pipeline that runs them.
//!
//! An [`Operation`] is one check or transform attached to a shape. A shape
//! keeps its operations in a [`Pipeline`], which folds them into a single
//! continuation chain on first use and caches the result until the list
//! changes.
//!
//! Every operation is gated on the issues gathered so far:
//!
//! - after a child shape failed, only *forced* operations run;
//! - otherwise an operation runs if there are no issues yet, if it is
//!   *unsafe*, or if the call is verbose.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use parking_lot::RwLock;
use stillwater::Validation;
use tracing::{debug, trace};

use crate::error::{Issue, Issues, OperationError, ShapeError};
use crate::options::ApplyOptions;
use crate::value::Value;

pub type CheckFn = dyn Fn(&Value, Option<&Value>, &ApplyOptions) -> Result<Vec<Issue>, OperationError>
    + Send
    + Sync;

pub type AlterFn =
    dyn Fn(&Value, Option<&Value>, &ApplyOptions) -> Result<Value, OperationError> + Send + Sync;

pub type CheckAsyncFn = dyn Fn(Value, Option<Value>, ApplyOptions) -> BoxFuture<'static, Result<Vec<Issue>, OperationError>>
    + Send
    + Sync;

pub type AlterAsyncFn = dyn Fn(Value, Option<Value>, ApplyOptions) -> BoxFuture<'static, Result<Value, OperationError>>
    + Send
    + Sync;

/// The body of an operation.
///
/// Checks return the issues they found (empty when the value passes).
/// Alters return the replacement value.
#[derive(Clone)]
pub enum Callback {
    Check(Arc<CheckFn>),
    Alter(Arc<AlterFn>),
    CheckAsync(Arc<CheckAsyncFn>),
    AlterAsync(Arc<AlterAsyncFn>),
}

impl Callback {
    pub fn is_async(&self) -> bool {
        matches!(self, Callback::CheckAsync(_) | Callback::AlterAsync(_))
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Callback::Check(_) => "Check",
            Callback::Alter(_) => "Alter",
            Callback::CheckAsync(_) => "CheckAsync",
            Callback::AlterAsync(_) => "AlterAsync",
        };
        f.write_str(name)
    }
}

/// One step of a shape's pipeline.
///
/// # Example
///
/// ```rust
/// use verdict::{Issue, Operation, Shape, ShapeLike, Value};
///
/// let even = Operation::check(|value, _, _| {
///     let n = value.as_f64().unwrap_or(0.0);
///     Ok(if n % 2.0 == 0.0 {
///         vec![]
///     } else {
///         vec![Issue::new("even", value.clone(), "must be even")]
///     })
/// })
/// .with_key("even");
///
/// let shape = Shape::number().add_operation(even);
/// assert!(shape.parse(&Value::from(4)).is_ok());
/// assert!(shape.parse(&Value::from(3)).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Operation {
    key: Option<String>,
    param: Option<Value>,
    callback: Callback,
    is_unsafe: bool,
    is_forced: bool,
    message: Option<String>,
}

impl Operation {
    pub fn new(callback: Callback) -> Self {
        Self {
            key: None,
            param: None,
            callback,
            is_unsafe: false,
            is_forced: false,
            message: None,
        }
    }

    pub fn check<F>(f: F) -> Self
    where
        F: Fn(&Value, Option<&Value>, &ApplyOptions) -> Result<Vec<Issue>, OperationError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Callback::Check(Arc::new(f)))
    }

    pub fn alter<F>(f: F) -> Self
    where
        F: Fn(&Value, Option<&Value>, &ApplyOptions) -> Result<Value, OperationError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Callback::Alter(Arc::new(f)))
    }

    pub fn check_async<F>(f: F) -> Self
    where
        F: Fn(Value, Option<Value>, ApplyOptions) -> BoxFuture<'static, Result<Vec<Issue>, OperationError>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Callback::CheckAsync(Arc::new(f)))
    }

    pub fn alter_async<F>(f: F) -> Self
    where
        F: Fn(Value, Option<Value>, ApplyOptions) -> BoxFuture<'static, Result<Value, OperationError>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Callback::AlterAsync(Arc::new(f)))
    }

    /// Sets the identity key. Adding an operation whose key is already
    /// present replaces the earlier one.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_param(mut self, param: impl Into<Value>) -> Self {
        self.param = Some(param.into());
        self
    }

    /// An unsafe operation runs even when earlier operations raised issues.
    pub fn with_unsafe(mut self, is_unsafe: bool) -> Self {
        self.is_unsafe = is_unsafe;
        self
    }

    /// A forced operation runs even when a child shape already failed.
    pub fn with_force(mut self, is_forced: bool) -> Self {
        self.is_forced = is_forced;
        self
    }

    /// Replaces the message of every issue this operation raises.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub(crate) fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn param(&self) -> Option<&Value> {
        self.param.as_ref()
    }

    pub fn is_async(&self) -> bool {
        self.callback.is_async()
    }

    pub fn is_unsafe(&self) -> bool {
        self.is_unsafe
    }

    pub fn is_forced(&self) -> bool {
        self.is_forced
    }

    fn should_run(&self, state: &OperationState<'_>, options: &ApplyOptions) -> bool {
        if state.upstream_failed {
            return self.is_forced;
        }
        state.issues.is_empty() || self.is_unsafe || options.verbose
    }

    fn apply<'a>(
        &self,
        mut state: OperationState<'a>,
        options: &ApplyOptions,
    ) -> Result<OperationState<'a>, ShapeError> {
        if !self.should_run(&state, options) {
            return Ok(state);
        }

        match &self.callback {
            Callback::Check(f) => {
                let found = f(&state.value, self.param.as_ref(), options);
                self.settle_check(&mut state, found)?;
            }
            Callback::Alter(f) => {
                let altered = f(&state.value, self.param.as_ref(), options);
                self.settle_alter(&mut state, altered)?;
            }
            Callback::CheckAsync(_) | Callback::AlterAsync(_) => {
                return Err(ShapeError::AsyncShape);
            }
        }
        Ok(state)
    }

    async fn apply_async<'a>(
        &self,
        mut state: OperationState<'a>,
        options: &ApplyOptions,
    ) -> Result<OperationState<'a>, ShapeError> {
        if !self.should_run(&state, options) {
            return Ok(state);
        }

        match &self.callback {
            Callback::CheckAsync(f) => {
                let found = f(state.value.clone().into_owned(), self.param.clone(), *options).await;
                self.settle_check(&mut state, found)?;
                Ok(state)
            }
            Callback::AlterAsync(f) => {
                let altered =
                    f(state.value.clone().into_owned(), self.param.clone(), *options).await;
                self.settle_alter(&mut state, altered)?;
                Ok(state)
            }
            _ => self.apply(state, options),
        }
    }

    fn settle_check(
        &self,
        state: &mut OperationState<'_>,
        found: Result<Vec<Issue>, OperationError>,
    ) -> Result<(), ShapeError> {
        match found {
            Ok(issues) => {
                self.absorb(state, issues);
                Ok(())
            }
            Err(error) => self.settle_error(state, error),
        }
    }

    fn settle_alter(
        &self,
        state: &mut OperationState<'_>,
        altered: Result<Value, OperationError>,
    ) -> Result<(), ShapeError> {
        match altered {
            Ok(value) => {
                state.value = Cow::Owned(value);
                Ok(())
            }
            Err(error) => self.settle_error(state, error),
        }
    }

    fn settle_error(
        &self,
        state: &mut OperationState<'_>,
        error: OperationError,
    ) -> Result<(), ShapeError> {
        match error {
            OperationError::Issues(issues) => {
                self.absorb(state, issues);
                Ok(())
            }
            OperationError::Defect(error) => {
                debug!(key = ?self.key, error = %error, "operation raised a defect");
                Err(ShapeError::Defect(error))
            }
        }
    }

    fn absorb(&self, state: &mut OperationState<'_>, issues: Vec<Issue>) {
        match &self.message {
            Some(message) => state
                .issues
                .extend(issues.into_iter().map(|i| i.with_message(message.clone()))),
            None => state.issues.extend(issues),
        }
    }
}

/// The value and diagnostics flowing through a pipeline.
#[derive(Debug)]
pub struct OperationState<'a> {
    pub value: Cow<'a, Value>,
    pub issues: Vec<Issue>,
    upstream_failed: bool,
}

impl<'a> OperationState<'a> {
    /// Starts a pipeline run. Issues passed in here come from child shapes,
    /// so only forced operations will see the state.
    pub fn new(value: Cow<'a, Value>, issues: Vec<Issue>) -> Self {
        let upstream_failed = !issues.is_empty();
        Self {
            value,
            issues,
            upstream_failed,
        }
    }

    pub fn into_result(self) -> Validation<Cow<'a, Value>, Issues> {
        match Issues::from_vec(self.issues) {
            Some(issues) => Validation::Failure(issues),
            None => Validation::Success(self.value),
        }
    }
}

type Stage = Arc<
    dyn for<'a> Fn(OperationState<'a>, &ApplyOptions) -> Result<OperationState<'a>, ShapeError>
        + Send
        + Sync,
>;

fn stage<F>(f: F) -> Stage
where
    F: for<'a> Fn(OperationState<'a>, &ApplyOptions) -> Result<OperationState<'a>, ShapeError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

fn compile(operations: &[Operation]) -> Stage {
    match operations {
        [] => stage(|state, _| Ok(state)),
        [op] => {
            let op = op.clone();
            stage(move |state, options| op.apply(state, options))
        }
        [first, second] => {
            let first = first.clone();
            let second = second.clone();
            stage(move |state, options| second.apply(first.apply(state, options)?, options))
        }
        _ => operations
            .iter()
            .rev()
            .fold(stage(|state, _| Ok(state)), |next, op| {
                let op = op.clone();
                stage(move |state, options| next(op.apply(state, options)?, options))
            }),
    }
}

/// An ordered list of operations with a lazily compiled form.
///
/// The compiled chain is cached on first run. Racing first runs may each
/// compile; the results are identical, so the last write wins harmlessly.
#[derive(Default)]
pub struct Pipeline {
    operations: Vec<Operation>,
    compiled: RwLock<Option<Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn is_async(&self) -> bool {
        self.operations.iter().any(Operation::is_async)
    }

    /// Appends `operation`, or replaces the operation with the same key in
    /// place.
    pub fn push(&mut self, operation: Operation) {
        let existing = operation
            .key()
            .and_then(|key| self.operations.iter().position(|op| op.key() == Some(key)));

        match existing {
            Some(index) => self.operations[index] = operation,
            None => self.operations.push(operation),
        }
        *self.compiled.get_mut() = None;
    }

    /// Returns the last operation, if any.
    pub fn last_mut(&mut self) -> Option<&mut Operation> {
        *self.compiled.get_mut() = None;
        self.operations.last_mut()
    }

    /// Runs every operation synchronously.
    ///
    /// Fails with [`ShapeError::AsyncShape`] if an async operation is
    /// reached.
    pub fn run<'a>(
        &self,
        state: OperationState<'a>,
        options: &ApplyOptions,
    ) -> Result<OperationState<'a>, ShapeError> {
        if self.operations.is_empty() {
            return Ok(state);
        }
        let chain = self.compiled();
        chain(state, options)
    }

    /// Runs every operation, awaiting async ones in order.
    pub async fn run_async<'a>(
        &self,
        mut state: OperationState<'a>,
        options: ApplyOptions,
    ) -> Result<OperationState<'a>, ShapeError> {
        for op in &self.operations {
            state = op.apply_async(state, &options).await?;
        }
        Ok(state)
    }

    fn compiled(&self) -> Stage {
        if let Some(chain) = self.compiled.read().as_ref() {
            return Arc::clone(chain);
        }

        let chain = compile(&self.operations);
        trace!(operations = self.operations.len(), "compiled operation pipeline");
        *self.compiled.write() = Some(Arc::clone(&chain));
        chain
    }
}

impl Clone for Pipeline {
    fn clone(&self) -> Self {
        Self {
            operations: self.operations.clone(),
            compiled: RwLock::new(self.compiled.read().clone()),
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("operations", &self.operations)
            .field("compiled", &self.compiled.read().is_some())
            .finish()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Pipeline>();
    assert_sync::<Pipeline>();
};
