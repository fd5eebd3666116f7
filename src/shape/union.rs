//! Union shape.
//!
//! A union tries its members in declaration order and returns the first
//! success. Members are bucketed by the value kinds their input types admit,
//! so a value is only offered to the members that could possibly accept it.

use std::sync::{Arc, OnceLock};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use indexmap::IndexMap;
use stillwater::Validation;
use tracing::trace;

use crate::error::{codes, Issue, IssueParam, ShapeError};
use crate::options::ApplyOptions;
use crate::types::{union_types, Kind, TypeAtom};
use crate::value::Value;

use super::core::ShapeCore;
use super::traits::{ShapeLike, Structure};
use super::AnyShape;

/// Member indices per value kind.
type Lookup = IndexMap<Kind, Vec<usize>>;

#[derive(Debug)]
struct Buckets {
    plain: Lookup,
    coerced: Lookup,
}

impl Buckets {
    fn new(members: &[AnyShape]) -> Self {
        let coercing = ApplyOptions::new().with_coerce(true);
        Self {
            plain: bucket(members, |member| member.input_types()),
            coerced: bucket(members, |member| member.input_types_for(&coercing)),
        }
    }
}

fn bucket<F>(members: &[AnyShape], types_of: F) -> Lookup
where
    F: Fn(&AnyShape) -> Arc<[TypeAtom]>,
{
    let types: Vec<_> = members.iter().map(types_of).collect();

    Kind::VALUE_KINDS
        .iter()
        .map(|&kind| {
            let indices = types
                .iter()
                .enumerate()
                .filter(|(_, atoms)| atoms.iter().any(|atom| atom.admits(kind)))
                .map(|(index, _)| index)
                .collect();
            (kind, indices)
        })
        .collect()
}

/// A shape accepting a value if any member accepts it.
///
/// Members that are unions without operations or overrides of their own are
/// flattened into this union. When no member accepts the value a single
/// `invalid_union` issue is raised. Its param lists the union's input types
/// and, if any member was tried, the issues each tried member raised.
///
/// If the union coerces, every member is applied with coercion enabled.
///
/// # Example
///
/// ```rust
/// use verdict::{IntoShape, IssueParam, Shape, ShapeLike, Value};
///
/// let id = Shape::union([
///     Shape::number().into_shape(),
///     Shape::string().min_len(1).into_shape(),
/// ]);
///
/// assert!(id.parse(&Value::from(7)).is_ok());
/// assert!(id.parse(&Value::from("a7")).is_ok());
///
/// let issues = id.parse(&Value::Bool(true)).unwrap_err();
/// let issue = issues.issues().unwrap().first();
/// assert_eq!(issue.code, "invalid_union");
/// assert!(matches!(
///     issue.param,
///     Some(IssueParam::Union { issue_groups: None, .. })
/// ));
/// ```
#[derive(Clone)]
pub struct UnionShape {
    core: ShapeCore,
    members: Vec<AnyShape>,
    buckets: OnceLock<Arc<Buckets>>,
}

impl UnionShape {
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = AnyShape>,
    {
        let mut flat = Vec::new();
        for member in members {
            let inlined = match member.as_union() {
                Some(inner) if is_transparent(member.as_ref()) => Some(inner.members.clone()),
                _ => None,
            };
            match inlined {
                Some(inner) => flat.extend(inner),
                None => flat.push(member),
            }
        }

        Self {
            core: ShapeCore::new(),
            members: flat,
            buckets: OnceLock::new(),
        }
    }

    pub fn members(&self) -> &[AnyShape] {
        &self.members
    }

    fn buckets(&self) -> &Buckets {
        self.buckets
            .get_or_init(|| Arc::new(Buckets::new(&self.members)))
            .as_ref()
    }

    /// Options handed to members.
    fn member_options(&self, options: &ApplyOptions) -> ApplyOptions {
        if self.core.is_coercing() {
            options.with_coerce(true)
        } else {
            *options
        }
    }

    /// Members that may accept `input`, in declaration order.
    fn candidates(&self, input: &Value, options: &ApplyOptions) -> &[usize] {
        let buckets = self.buckets();
        let lookup = if options.coerce {
            &buckets.coerced
        } else {
            &buckets.plain
        };
        lookup
            .get(&Kind::of(input))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn union_issue(&self, input: &Value, options: &ApplyOptions, groups: Vec<Vec<Issue>>) -> Issue {
        let message = match self.core.type_message() {
            Some(message) => message.to_string(),
            None => "must match one of the union members".to_string(),
        };
        let issue_groups = if groups.is_empty() {
            trace!(kind = %Kind::of(input), "no union member admits the input");
            None
        } else {
            Some(groups)
        };

        Issue::new(codes::INVALID_UNION, input.clone(), message).with_param(IssueParam::Union {
            inputs: self.input_types_for(options).to_vec(),
            issue_groups,
        })
    }
}

fn is_transparent(shape: &dyn ShapeLike) -> bool {
    shape.core().is_plain() && !shape.core().is_coercing()
}

impl ShapeLike for UnionShape {
    fn core(&self) -> &ShapeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShapeCore {
        &mut self.core
    }

    fn declared_input_types(&self) -> Vec<TypeAtom> {
        union_types(
            self.members
                .iter()
                .flat_map(|member| member.input_types().to_vec()),
        )
    }

    fn coerced_input_types(&self) -> Vec<TypeAtom> {
        let coercing = ApplyOptions::new().with_coerce(true);
        union_types(
            self.members
                .iter()
                .flat_map(|member| member.input_types_for(&coercing).to_vec()),
        )
    }

    fn has_async_children(&self) -> bool {
        self.members.iter().any(|member| member.is_async())
    }

    fn as_union(&self) -> Option<&UnionShape> {
        Some(self)
    }

    fn apply_structure<'a>(
        &self,
        input: &'a Value,
        options: &ApplyOptions,
    ) -> Result<Structure<'a>, ShapeError> {
        let member_options = self.member_options(options);
        let mut groups = Vec::new();

        for &index in self.candidates(input, &member_options) {
            match self.members[index].apply(input, &member_options)? {
                Validation::Success(value) => return Ok(Structure::accepted(value)),
                Validation::Failure(issues) => groups.push(issues.into_vec()),
            }
        }

        Ok(Structure::rejected(self.union_issue(
            input,
            &member_options,
            groups,
        )))
    }

    fn apply_structure_async<'a>(
        &'a self,
        input: &'a Value,
        options: ApplyOptions,
    ) -> BoxFuture<'a, Result<Structure<'a>, ShapeError>> {
        async move {
            let member_options = self.member_options(&options);
            let mut groups = Vec::new();

            for &index in self.candidates(input, &member_options) {
                match self.members[index]
                    .apply_async(input, member_options)
                    .await?
                {
                    Validation::Success(value) => return Ok(Structure::accepted(value)),
                    Validation::Failure(issues) => groups.push(issues.into_vec()),
                }
            }

            Ok(Structure::rejected(self.union_issue(
                input,
                &member_options,
                groups,
            )))
        }
        .boxed()
    }
}
