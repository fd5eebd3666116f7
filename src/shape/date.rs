//! Date shape.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::coerce;
use crate::error::{codes, Issue, IssueParam, ShapeError};
use crate::operation::Operation;
use crate::options::ApplyOptions;
use crate::types::{Kind, TypeAtom};
use crate::value::Value;

use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};

/// A shape accepting instants in time.
#[derive(Clone, Debug, Default)]
pub struct DateShape {
    core: ShapeCore,
}

impl DateShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// The date must not be before `limit`.
    pub fn min(self, limit: DateTime<Utc>) -> Self {
        self.add_operation(bound(
            "min",
            codes::MIN_VALUE,
            limit,
            |d, limit| d >= limit,
            "must not be before",
        ))
    }

    /// The date must not be after `limit`.
    pub fn max(self, limit: DateTime<Utc>) -> Self {
        self.add_operation(bound(
            "max",
            codes::MAX_VALUE,
            limit,
            |d, limit| d <= limit,
            "must not be after",
        ))
    }
}

fn bound(
    key: &'static str,
    code: &'static str,
    limit: DateTime<Utc>,
    passes: fn(DateTime<Utc>, DateTime<Utc>) -> bool,
    relation: &str,
) -> Operation {
    let message = format!(
        "{} {}",
        relation,
        limit.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    Operation::check(move |value, _, _| match value {
        Value::Date(d) if !passes(*d, limit) => {
            Ok(vec![Issue::new(code, value.clone(), message.clone())
                .with_param(IssueParam::Value(Value::Date(limit)))])
        }
        _ => Ok(Vec::new()),
    })
    .with_key(key)
    .with_param(limit)
}

impl ShapeLike for DateShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        vec![TypeAtom::Kind(Kind::Date)]
    }

    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        coerce::date_inputs()
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        let coercing = self.is_coercing_for(options);
        Ok(
            match coerce::prepare(
                input,
                coercing,
                |v| matches!(v, Value::Date(_)),
                coerce::to_date,
            ) {
                Some(value) => Structure::accepted(value),
                None => Structure::rejected(self.core.type_issue(input, Kind::Date)),
            },
        )
    }
}
