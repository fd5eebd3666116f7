//! Integration tests for intersection shapes.

use verdict::{
    codes, distribute_types, intersect_values, ApplyOptions, IntoShape, Kind, Shape, ShapeLike,
    TypeAtom, Value,
};

#[test]
fn test_object_mixins() {
    let named = Shape::object().field("name", Shape::string());
    let aged = Shape::object().field("age", Shape::number());
    let person = Shape::intersection([named.into_shape(), aged.into_shape()]);

    let input = Value::object([("name", Value::from("Ada")), ("age", Value::from(36))]);
    assert_eq!(person.parse(&input).unwrap(), input);

    let error = person
        .parse_with(&Value::empty_object(), &ApplyOptions::verbose())
        .unwrap_err();
    let paths: Vec<_> = error
        .issues()
        .unwrap()
        .iter()
        .map(|i| i.path.to_string())
        .collect();
    assert_eq!(paths, vec!["name", "age"]);
}

#[test]
fn test_number_ranges_intersect() {
    let shape = Shape::intersection([
        Shape::number().min(0.0).into_shape(),
        Shape::number().max(10.0).into_shape(),
    ]);

    assert!(shape.parse(&Value::from(5)).is_ok());
    assert_eq!(
        shape.parse(&Value::from(11)).unwrap_err().issues().unwrap().first().code,
        codes::MAX_VALUE
    );
}

#[test]
fn test_disjoint_members_have_no_inputs() {
    let shape = Shape::intersection([Shape::number().into_shape(), Shape::string().into_shape()]);
    assert!(shape.input_types().is_empty());
    assert!(shape.parse(&Value::from(1)).is_err());
}

#[test]
fn test_literal_narrows_tag() {
    let shape = Shape::intersection([
        Shape::string().into_shape(),
        Shape::literal("on").into_shape(),
    ]);
    assert_eq!(&*shape.input_types(), &[TypeAtom::literal("on")]);
}

#[test]
fn test_incompatible_transforms_fail_as_a_whole() {
    let shape = Shape::intersection([
        Shape::object()
            .field("v", Shape::number().alter(|n| Value::Number(n.as_f64().unwrap_or(0.0) * 2.0)))
            .into_shape(),
        Shape::object().field("v", Shape::number()).into_shape(),
    ]);

    let error = shape.parse(&Value::object([("v", 1)])).unwrap_err();
    let issues = error.issues().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues.first().code, codes::INVALID_INTERSECTION);
    assert!(issues.first().path.is_root());
}

#[test]
fn test_distribution_law() {
    let a = TypeAtom::Kind(Kind::String);
    let b = TypeAtom::Kind(Kind::Number);
    let c = TypeAtom::Kind(Kind::Boolean);

    let result = distribute_types(vec![vec![a.clone(), b.clone()], vec![a.clone(), b.clone(), c]]);
    assert_eq!(result, vec![a, b]);
}

#[test]
fn test_intersect_values_laws() {
    let x = Value::object([
        ("list", Value::Array(vec![Value::from(1), Value::Number(f64::NAN)])),
        ("name", Value::from("a")),
    ]);
    assert_eq!(intersect_values(&x, &x), Some(x.clone()));

    let y = Value::object([("name", Value::from("b"))]);
    assert_eq!(intersect_values(&x, &y), None);
}
