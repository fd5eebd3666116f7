//! Object shape validation.
//!
//! This module provides [`ObjectShape`] for validating plain objects with
//! typed properties, optional properties, and a policy for keys the shape
//! does not declare.

use std::borrow::Cow;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use indexmap::IndexMap;

use crate::error::{codes, Issue, IssueParam, ShapeError};
use crate::options::ApplyOptions;
use crate::path::PathSegment;
use crate::types::{Kind, TypeAtom};
use crate::value::{Object, Value};

use super::composite::{Collector, Visit};
use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};
use super::{AnyShape, IntoShape, Shape};

/// Stands in for a missing property.
static UNDEFINED: Value = Value::Undefined;

/// How an object shape treats keys it does not declare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyMode {
    /// Unknown keys are kept in the output.
    #[default]
    Preserve,
    /// Unknown keys are removed from the output.
    Strip,
    /// Unknown keys are reported as `unknown_key` issues.
    Exact,
}

/// A shape for plain objects.
///
/// Properties are validated in declaration order. A missing property is
/// validated as `undefined`, so only properties whose shape accepts
/// `undefined` may be absent. If the property shape returns `undefined`
/// unchanged the key stays absent from the output.
///
/// Keys that are not declared are handled by the rest shape if one is set,
/// and otherwise by the [`KeyMode`].
///
/// # Example
///
/// ```rust
/// use verdict::{ApplyOptions, Shape, ShapeLike, Value};
///
/// let schema = Shape::object()
///     .field("name", Shape::string().min_len(1))
///     .field("age", Shape::number().integer().non_negative())
///     .optional("email", Shape::string())
///     .exact();
///
/// let input = Value::object([
///     ("name", Value::from("")),
///     ("age", Value::from(30)),
///     ("nickname", Value::from("al")),
/// ]);
///
/// let issues = schema
///     .parse_with(&input, &ApplyOptions::verbose())
///     .unwrap_err();
/// let paths: Vec<_> = issues
///     .issues()
///     .unwrap()
///     .iter()
///     .map(|i| i.path.to_string())
///     .collect();
/// assert_eq!(paths, vec!["name", "nickname"]);
/// ```
#[derive(Clone, Default)]
pub struct ObjectShape {
    core: ShapeCore,
    properties: IndexMap<String, AnyShape>,
    key_mode: KeyMode,
    rest: Option<AnyShape>,
}

impl ObjectShape {
    /// Creates an object shape with no properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required property. Redeclaring a name replaces its shape but
    /// keeps its position.
    ///
    /// # Example
    ///
    /// ```rust
    /// use verdict::{Shape, ShapeLike, Value};
    ///
    /// let schema = Shape::object().field("name", Shape::string());
    ///
    /// assert!(schema.parse(&Value::object([("name", "Ada")])).is_ok());
    /// assert!(schema.parse(&Value::empty_object()).is_err());
    /// ```
    pub fn field(mut self, name: impl Into<String>, shape: impl IntoShape) -> Self {
        self.properties.insert(name.into(), shape.into_shape());
        self.core.invalidate();
        self
    }

    /// Adds a property that may be absent or `undefined`.
    pub fn optional(self, name: impl Into<String>, shape: impl IntoShape) -> Self {
        self.field(name, Shape::optional(shape))
    }

    /// Keeps undeclared keys. This is the default.
    pub fn preserve(mut self) -> Self {
        self.key_mode = KeyMode::Preserve;
        self.rest = None;
        self.core.invalidate();
        self
    }

    /// Drops undeclared keys from the output.
    pub fn strip(mut self) -> Self {
        self.key_mode = KeyMode::Strip;
        self.rest = None;
        self.core.invalidate();
        self
    }

    /// Rejects undeclared keys.
    pub fn exact(mut self) -> Self {
        self.key_mode = KeyMode::Exact;
        self.rest = None;
        self.core.invalidate();
        self
    }

    /// Validates the values of undeclared keys with `shape`. Replaces the
    /// key mode.
    pub fn rest(mut self, shape: impl IntoShape) -> Self {
        self.rest = Some(shape.into_shape());
        self.key_mode = KeyMode::Preserve;
        self.core.invalidate();
        self
    }

    pub fn key_mode(&self) -> KeyMode {
        self.key_mode
    }

    /// Declared property names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn property(&self, name: &str) -> Option<&AnyShape> {
        self.properties.get(name)
    }

    fn unknown_entries<'e>(&'e self, entries: &'e Object) -> impl Iterator<Item = (&'e String, &'e Value)> {
        entries
            .iter()
            .filter(move |(key, _)| !self.properties.contains_key(key.as_str()))
    }

    /// Applies the key mode to undeclared keys when there is no rest shape.
    fn apply_key_mode(
        &self,
        entries: &Object,
        output: &mut Option<Object>,
        collector: &mut Collector,
    ) {
        match self.key_mode {
            KeyMode::Preserve => {}
            KeyMode::Strip => {
                if self.unknown_entries(entries).next().is_some() {
                    output
                        .get_or_insert_with(|| entries.clone())
                        .retain(|key, _| self.properties.contains_key(key.as_str()));
                }
            }
            KeyMode::Exact => {
                for (key, value) in self.unknown_entries(entries) {
                    collector.push(
                        Issue::new(
                            codes::UNKNOWN_KEY,
                            value.clone(),
                            format!("unknown key {}", key),
                        )
                        .with_param(IssueParam::Value(Value::from(key.as_str())))
                        .prefixed(PathSegment::field(key.as_str())),
                    );
                    if collector.should_stop() {
                        break;
                    }
                }
            }
        }
    }
}

fn record_change(output: &mut Option<Object>, entries: &Object, key: &str, visit: Visit) {
    if let Visit::Changed(value) = visit {
        output
            .get_or_insert_with(|| entries.clone())
            .insert(key.to_string(), value);
    }
}

impl ShapeLike for ObjectShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Object)]
    }

    fn has_async_children(&self) -> bool {
        self.properties
            .values()
            .chain(&self.rest)
            .any(|shape| shape.is_async())
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        let Value::Object(entries) = input else {
            return Ok(Structure::rejected(self.core.type_issue(input, Kind::Object)));
        };

        let mut collector = Collector::new(options);
        let mut output: Option<Object> = None;

        for (key, shape) in &self.properties {
            let value = entries.get(key).unwrap_or(&UNDEFINED);
            let result = shape.apply(value, options)?;
            let visit = collector.visit(result, || PathSegment::field(key.as_str()));
            record_change(&mut output, entries, key, visit);
            if collector.should_stop() {
                break;
            }
        }

        if !collector.should_stop() {
            match &self.rest {
                Some(rest) => {
                    for (key, value) in self.unknown_entries(entries) {
                        let result = rest.apply(value, options)?;
                        let visit = collector.visit(result, || PathSegment::field(key.as_str()));
                        record_change(&mut output, entries, key, visit);
                        if collector.should_stop() {
                            break;
                        }
                    }
                }
                None => self.apply_key_mode(entries, &mut output, &mut collector),
            }
        }

        Ok(collector.finish(Cow::Borrowed(input), output.map(Value::Object)))
    }

    fn apply_structure_async<'a>(
        &'a self,
        input: &'a Value,
        options: ApplyOptions,
    ) -> BoxFuture<'a, Result<Structure<'a>, ShapeError>> {
        async move {
            let Value::Object(entries) = input else {
                return Ok(Structure::rejected(self.core.type_issue(input, Kind::Object)));
            };

            let mut collector = Collector::new(&options);
            let mut output: Option<Object> = None;

            for (key, shape) in &self.properties {
                let value = entries.get(key).unwrap_or(&UNDEFINED);
                let result = shape.apply_async(value, options).await?;
                let visit = collector.visit(result, || PathSegment::field(key.as_str()));
                record_change(&mut output, entries, key, visit);
                if collector.should_stop() {
                    break;
                }
            }

            if !collector.should_stop() {
                match &self.rest {
                    Some(rest) => {
                        for (key, value) in self.unknown_entries(entries) {
                            let result = rest.apply_async(value, options).await?;
                            let visit =
                                collector.visit(result, || PathSegment::field(key.as_str()));
                            record_change(&mut output, entries, key, visit);
                            if collector.should_stop() {
                                break;
                            }
                        }
                    }
                    None => self.apply_key_mode(entries, &mut output, &mut collector),
                }
            }

            Ok(collector.finish(Cow::Borrowed(input), output.map(Value::Object)))
        }
        .boxed()
    }
}
