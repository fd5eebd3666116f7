//! Type tags, literals, and the set algebra over them.
//!
//! Every shape declares the set of inputs it can accept as a list of
//! [`TypeAtom`]s. Unions bucket their members by these sets, and
//! intersections compute theirs with [`distribute_types`] without running any
//! validator. [`intersect_values`] merges the outputs of intersection operands.

use std::fmt::{self, Display};

use crate::value::Value;

/// An extended runtime type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Unknown,
    Never,
    Undefined,
    Null,
    Boolean,
    Number,
    BigInt,
    String,
    Symbol,
    Date,
    Array,
    Object,
    Map,
    Set,
    Function,
    Promise,
}

impl Kind {
    /// Every tag a concrete value can be classified as.
    pub const VALUE_KINDS: [Kind; 14] = [
        Kind::Undefined,
        Kind::Null,
        Kind::Boolean,
        Kind::Number,
        Kind::BigInt,
        Kind::String,
        Kind::Symbol,
        Kind::Date,
        Kind::Array,
        Kind::Object,
        Kind::Map,
        Kind::Set,
        Kind::Function,
        Kind::Promise,
    ];

    /// Classifies a value. NaN is a number; boxed primitives are objects.
    pub fn of(value: &Value) -> Kind {
        match value {
            Value::Undefined => Kind::Undefined,
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::BigInt(_) => Kind::BigInt,
            Value::String(_) => Kind::String,
            Value::Symbol(_) => Kind::Symbol,
            Value::Date(_) => Kind::Date,
            Value::Array(_) => Kind::Array,
            Value::Object(_) | Value::Boxed(_) => Kind::Object,
            Value::Map(_) => Kind::Map,
            Value::Set(_) => Kind::Set,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Unknown => "unknown",
            Kind::Never => "never",
            Kind::Undefined => "undefined",
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::BigInt => "bigint",
            Kind::String => "string",
            Kind::Symbol => "symbol",
            Kind::Date => "date",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Map => "map",
            Kind::Set => "set",
            Kind::Function => "function",
            Kind::Promise => "promise",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An atom of a declared input set: either a whole type tag or one literal.
///
/// `null` and `undefined` are singleton types, so [`TypeAtom::literal`]
/// normalizes them to their tags.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAtom {
    Kind(Kind),
    Literal(Value),
}

impl TypeAtom {
    pub fn literal(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Undefined => TypeAtom::Kind(Kind::Undefined),
            Value::Null => TypeAtom::Kind(Kind::Null),
            value => TypeAtom::Literal(value),
        }
    }

    /// The tag this atom belongs to.
    pub fn kind(&self) -> Kind {
        match self {
            TypeAtom::Kind(kind) => *kind,
            TypeAtom::Literal(value) => Kind::of(value),
        }
    }

    /// Returns true if every value described by `self` is described by `other`.
    pub fn is_subsumed_by(&self, other: &TypeAtom) -> bool {
        match (self, other) {
            (_, TypeAtom::Kind(Kind::Unknown)) => true,
            (TypeAtom::Literal(value), TypeAtom::Kind(kind)) => Kind::of(value) == *kind,
            (a, b) => a == b,
        }
    }

    /// Returns true if a value of the given tag may belong to this atom.
    pub fn admits(&self, kind: Kind) -> bool {
        match self {
            TypeAtom::Kind(Kind::Unknown) => true,
            TypeAtom::Kind(Kind::Never) => false,
            atom => atom.kind() == kind,
        }
    }
}

impl From<Kind> for TypeAtom {
    fn from(kind: Kind) -> Self {
        TypeAtom::Kind(kind)
    }
}

impl Display for TypeAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAtom::Kind(kind) => write!(f, "{}", kind),
            TypeAtom::Literal(value) => write!(f, "{}", value),
        }
    }
}

/// Reduces a list of atoms to the minimal equivalent union.
///
/// Duplicates collapse to their first occurrence, `never` disappears,
/// literals covered by their tag are dropped, and `unknown` absorbs
/// everything. Order of the surviving atoms is preserved. An empty result
/// means the union describes no value at all.
pub fn union_types<I>(types: I) -> Vec<TypeAtom>
where
    I: IntoIterator<Item = TypeAtom>,
{
    let mut unique: Vec<TypeAtom> = Vec::new();

    for atom in types {
        if atom == TypeAtom::Kind(Kind::Never) || unique.contains(&atom) {
            continue;
        }
        if atom == TypeAtom::Kind(Kind::Unknown) {
            return vec![atom];
        }
        unique.push(atom);
    }

    let all = unique.clone();
    unique.retain(|atom| {
        !all
            .iter()
            .any(|other| other != atom && atom.is_subsumed_by(other))
    });
    unique
}

/// Computes the atoms that can satisfy every group at once.
///
/// Each group is one operand's declared union. The result follows the
/// distribution law, e.g. `(a | b) & (a | b | c) = a | b`. With no groups at
/// all the result is `unknown`, the identity of intersection.
pub fn distribute_types<I, G>(groups: I) -> Vec<TypeAtom>
where
    I: IntoIterator<Item = G>,
    G: IntoIterator<Item = TypeAtom>,
{
    let mut groups = groups.into_iter();

    let Some(first) = groups.next() else {
        return vec![TypeAtom::Kind(Kind::Unknown)];
    };

    groups.fold(union_types(first), |acc, group| {
        intersect_types(&acc, &union_types(group))
    })
}

fn intersect_types(left: &[TypeAtom], right: &[TypeAtom]) -> Vec<TypeAtom> {
    let mut common = Vec::new();

    for a in left {
        for b in right {
            if a.is_subsumed_by(b) {
                common.push(a.clone());
            } else if b.is_subsumed_by(a) {
                common.push(b.clone());
            }
        }
    }
    union_types(common)
}

/// Merges two outputs of intersection operands into one value.
///
/// Returns `None` when the values cannot be reconciled: unequal primitives or
/// dates, objects sharing a key whose values do not merge, arrays of
/// different lengths or with a mismatching element, or any other pair of
/// kinds that are not equal.
pub fn intersect_values(a: &Value, b: &Value) -> Option<Value> {
    if a == b {
        return Some(a.clone());
    }

    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            let mut merged = left.clone();

            for (key, value) in right {
                match merged.get_mut(key) {
                    Some(existing) => *existing = intersect_values(existing, value)?,
                    None => {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
            Some(Value::Object(merged))
        }
        (Value::Array(left), Value::Array(right)) if left.len() == right.len() => left
            .iter()
            .zip(right)
            .map(|(x, y)| intersect_values(x, y))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        _ => None,
    }
}
